// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod logging;
pub mod parsers;
pub mod results;
pub mod search;
pub mod sink;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{DateWindow, HarvestConfig};
pub use error::{HarvestError, Result};
pub use results::{CombinationDescriptor, ItineraryRecord, ResultSet};
pub use search::{SearchRequest, build_search_url};

use chrono::NaiveDate;
use crawlers::{Browser, DiscoveryJob, ExtractionJob, JobContext, PhaseReport, run_phase};
use parsers::{Fly540Page, PageModel};
use sink::CsvSink;
use std::sync::Arc;

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub searches: usize,
    pub combinations: usize,
    pub records_written: usize,
    pub discovery: PhaseReport,
    pub extraction: PhaseReport,
}

/// Records gathered by both phases, sorted, before persistence
#[derive(Debug, Clone)]
pub struct Collected {
    pub results: ResultSet,
    pub combinations: usize,
    pub discovery: PhaseReport,
    pub extraction: PhaseReport,
}

/// Main builder for a harvesting run
pub struct Harvest {
    config: HarvestConfig,
    page: Arc<dyn PageModel>,
}

impl Harvest {
    /// Create a new Harvest with the given configuration
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            config,
            page: Arc::new(Fly540Page::new()),
        }
    }

    /// Replace the page model, e.g. after a site redesign
    pub fn with_page_model(mut self, page: Arc<dyn PageModel>) -> Self {
        self.page = page;
        self
    }

    /// Set the maximum number of concurrent extraction jobs
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = Some(max_concurrency);
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    fn context(&self, browser: Arc<dyn Browser>) -> Arc<JobContext> {
        Arc::new(JobContext {
            browser,
            page: Arc::clone(&self.page),
            job_timeout: self.config.job_timeout(),
            step_timeout: self.config.step_timeout(),
            max_attempts: self.config.max_attempts,
        })
    }

    /// Runs discovery then extraction and returns the sorted result set
    pub async fn collect(&self, browser: Arc<dyn Browser>, today: NaiveDate) -> Result<Collected> {
        self.config.validate()?;
        let ctx = self.context(browser);
        let parallelism = utils::available_parallelism();

        let requests = self.config.search_requests(today);
        let discovery_jobs = requests
            .into_iter()
            .map(|request| DiscoveryJob::new(&self.config.base_url, request))
            .collect::<Vec<_>>();
        let discovery_limit = utils::discovery_workers(discovery_jobs.len(), parallelism);

        let mut combinations = Vec::new();
        let discovery = run_phase(
            "discovery",
            discovery_jobs,
            discovery_limit,
            Arc::clone(&ctx),
            |found: Vec<CombinationDescriptor>| combinations.extend(found),
        )
        .await;

        if combinations.is_empty() {
            if discovery.failures.is_empty() {
                ::log::warn!("No flight combinations were offered for any search");
            } else {
                ::log::error!(
                    "No flight combinations discovered; {} of {} searches failed",
                    discovery.failures.len(),
                    discovery.submitted
                );
            }
        } else {
            ::log::info!("Discovered {} flight combinations", combinations.len());
        }

        let combination_count = combinations.len();
        let extraction_limit = self.config.max_concurrency.unwrap_or(parallelism);
        let extraction_jobs = combinations
            .into_iter()
            .map(ExtractionJob::new)
            .collect::<Vec<_>>();

        let mut results = ResultSet::new();
        let extraction = run_phase(
            "extraction",
            extraction_jobs,
            extraction_limit,
            ctx,
            |record: ItineraryRecord| results.push(record),
        )
        .await;

        results.sort();
        Ok(Collected {
            results,
            combinations: combination_count,
            discovery,
            extraction,
        })
    }

    /// Collects and appends the results to the configured output file.
    /// A write failure ends the run with an error.
    pub async fn run(&self, browser: Arc<dyn Browser>, today: NaiveDate) -> Result<RunSummary> {
        let collected = self.collect(browser, today).await?;

        let sink = CsvSink::new(&self.config.output_path);
        let records_written = match sink.append(&collected.results) {
            Ok(written) => {
                ::log::info!("Data successfully wrote to {}", sink.path().display());
                written
            }
            Err(e) => {
                ::log::error!("Failed to write {} records: {}", collected.results.len(), e);
                return Err(e);
            }
        };

        Ok(RunSummary {
            searches: collected.discovery.submitted,
            combinations: collected.combinations,
            records_written,
            discovery: collected.discovery,
            extraction: collected.extraction,
        })
    }
}
