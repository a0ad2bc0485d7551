use clap::Parser;
use fare_harvest::{DateWindow, HarvestConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fare-harvest")]
#[command(about = "Collects round-trip fares for every outbound/inbound combination on fly540.com")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Departure airport IATA code
    #[arg(long)]
    pub origin: Option<String>,

    /// Arrival airport IATA code
    #[arg(long)]
    pub destination: Option<String>,

    /// Currency fares are quoted in
    #[arg(long)]
    pub currency: Option<String>,

    /// Date window as DAYS:STAY, e.g. 10:7 (repeatable)
    #[arg(short, long = "window")]
    pub windows: Vec<DateWindow>,

    /// File results are appended to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File log lines are appended to
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Maximum number of concurrent extraction jobs
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-job timeout in seconds
    #[arg(long)]
    pub job_timeout: Option<u64>,

    /// Attempts per job for transient failures
    #[arg(long)]
    pub attempts: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,
}

impl Args {
    /// Applies command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(destination) = &self.destination {
            config.destination = destination.clone();
        }
        if let Some(currency) = &self.currency {
            config.currency = currency.clone();
        }
        if !self.windows.is_empty() {
            config.windows = self.windows.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.log_path = log_file.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = Some(concurrency);
        }
        if let Some(job_timeout) = self.job_timeout {
            config.job_timeout_secs = job_timeout;
        }
        if let Some(attempts) = self.attempts {
            config.max_attempts = attempts;
        }
        if self.headful {
            config.headless = false;
        }
    }
}
