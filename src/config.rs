use crate::error::{HarvestError, Result};
use crate::search::SearchRequest;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// A departure offset from today and the length of stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Days from today until the outbound flight
    pub depart_in_days: i64,
    /// Days between outbound and inbound flights
    pub stay_days: i64,
}

impl DateWindow {
    pub fn new(depart_in_days: i64, stay_days: i64) -> Self {
        Self {
            depart_in_days,
            stay_days,
        }
    }

    /// Resolves the window into concrete (departure, return) dates
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let depart = today + Duration::days(self.depart_in_days);
        (depart, depart + Duration::days(self.stay_days))
    }
}

impl FromStr for DateWindow {
    type Err = String;

    /// Parses `DAYS:STAY`, e.g. `10:7`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (depart, stay) = s
            .split_once(':')
            .ok_or_else(|| format!("expected DAYS:STAY, got {:?}", s))?;
        let depart = depart
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("bad departure offset {:?}: {}", depart, e))?;
        let stay = stay
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("bad stay length {:?}: {}", stay, e))?;
        Ok(Self::new(depart, stay))
    }
}

/// Configuration for a harvesting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Departure airport IATA code
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Arrival airport IATA code
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Currency fares are quoted in
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Date windows to search, one search per window
    #[serde(default = "default_windows")]
    pub windows: Vec<DateWindow>,

    /// Search results page of the booking site
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Delimited file results are appended to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Log file lines are appended to
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Upper bound on concurrent extraction jobs; available parallelism when unset
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Deadline for a whole job, navigation and every UI step included
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,

    /// Deadline for a single wait on the page
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,

    /// How often a wait re-checks the page
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Attempts per job for transient failures
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_origin() -> String {
    "NBO".to_string()
}

fn default_destination() -> String {
    "MBA".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_windows() -> Vec<DateWindow> {
    vec![DateWindow::new(10, 7), DateWindow::new(20, 7)]
}

fn default_base_url() -> Url {
    Url::parse("https://www.fly540.com/flights/").expect("default base URL should be valid")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_output_path() -> PathBuf {
    PathBuf::from("result.csv")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("fly540.log")
}

fn default_job_timeout_secs() -> u64 {
    120
}

fn default_step_timeout_secs() -> u64 {
    20
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_max_attempts() -> usize {
    2
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            destination: default_destination(),
            currency: default_currency(),
            windows: default_windows(),
            base_url: default_base_url(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            output_path: default_output_path(),
            log_path: default_log_path(),
            max_concurrency: None,
            job_timeout_secs: default_job_timeout_secs(),
            step_timeout_secs: default_step_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
            .map_err(|e| HarvestError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HarvestError::Config(e.to_string()))
    }

    /// Applies environment overrides (`WEBDRIVER_URL`)
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    /// Rejects values the site or the worker pool cannot work with
    pub fn validate(&self) -> Result<()> {
        for (name, code) in [
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("currency", &self.currency),
        ] {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(HarvestError::Config(format!(
                    "{} must be a three letter code, got {:?}",
                    name, code
                )));
            }
        }
        if self.windows.is_empty() {
            return Err(HarvestError::Config("at least one date window is required".into()));
        }
        if let Some(w) = self
            .windows
            .iter()
            .find(|w| w.depart_in_days < 0 || w.stay_days < 0)
        {
            return Err(HarvestError::Config(format!(
                "date window offsets must not be negative: {:?}",
                w
            )));
        }
        if self.max_attempts == 0 {
            return Err(HarvestError::Config("max_attempts must be at least 1".into()));
        }
        if self.max_concurrency == Some(0) {
            return Err(HarvestError::Config("max_concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// One search request per date window, relative to `today`
    pub fn search_requests(&self, today: NaiveDate) -> Vec<SearchRequest> {
        self.windows
            .iter()
            .map(|w| {
                let (depart, return_date) = w.resolve(today);
                SearchRequest::new(
                    &self.origin.to_ascii_uppercase(),
                    &self.destination.to_ascii_uppercase(),
                    &self.currency.to_ascii_uppercase(),
                    depart,
                    return_date,
                )
            })
            .collect()
    }

    pub fn job_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.job_timeout_secs)
    }

    pub fn step_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.step_timeout_secs)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}
