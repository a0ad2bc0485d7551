use clap::Parser;
use fare_harvest::crawlers::WebDriverBrowser;
use fare_harvest::{Harvest, HarvestConfig, RunSummary, logging};
use std::process::ExitCode;
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Defaults, then the config file, then the environment, then flags
    let mut config = match &args.config {
        Some(path) => match HarvestConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => HarvestConfig::default(),
    };
    config.apply_env();
    args.apply(&mut config);

    // Initialize logging
    if let Err(e) = logging::init(&config.log_path, "info") {
        eprintln!("Failed to open log file {}: {}", config.log_path.display(), e);
        return ExitCode::FAILURE;
    }

    println!("Note: a WebDriver server (e.g. ChromeDriver) must be reachable at {}", config.webdriver_url);
    ::log::info!(
        "Starting harvest {}-{} in {} for {} date windows",
        config.origin,
        config.destination,
        config.currency,
        config.windows.len()
    );

    let browser = Arc::new(WebDriverBrowser::from_config(&config));
    let today = chrono::Local::now().date_naive();
    let start_time = std::time::Instant::now();

    match Harvest::new(config).run(browser, today).await {
        Ok(summary) => {
            report(&summary);
            ::log::info!(
                "Harvest complete in {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            eprintln!("Harvest failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(summary: &RunSummary) {
    println!("Searches:      {}", summary.searches);
    println!("Combinations:  {}", summary.combinations);
    println!("Rows written:  {}", summary.records_written);

    for phase in [&summary.discovery, &summary.extraction] {
        if phase.failures.is_empty() {
            continue;
        }
        println!("{} failures: {}", phase.phase, phase.failures.len());
        for failure in &phase.failures {
            println!("  [{}] {}: {}", failure.kind, failure.job, failure.message);
        }
    }
}
