use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Which half of the round trip an option card belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    Outbound,
    Inbound,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Outbound => f.write_str("outbound"),
            Leg::Inbound => f.write_str("inbound"),
        }
    }
}

/// Errors produced while discovering, extracting or persisting itineraries
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The page failed to load
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A wait or a whole job ran past its deadline
    #[error("timed out after {elapsed:?} waiting for {what}")]
    Timeout { what: String, elapsed: Duration },

    /// An element the page model expects is absent; the site layout changed
    #[error("page layout mismatch: {0}")]
    ParseMismatch(String),

    /// A discovery-time index no longer fits the live card list
    #[error("{leg} option {index} is out of range, only {available} rendered")]
    StaleIndex {
        leg: Leg,
        index: usize,
        available: usize,
    },

    /// The WebDriver session could not be created or was lost
    #[error("webdriver session error: {0}")]
    Session(String),

    /// Writing the results file failed
    #[error("failed to write results to {}: {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Stable label used in logs and job reports
    pub fn kind(&self) -> &'static str {
        match self {
            HarvestError::Navigation { .. } => "navigation",
            HarvestError::Timeout { .. } => "timeout",
            HarvestError::ParseMismatch(_) => "parse_mismatch",
            HarvestError::StaleIndex { .. } => "stale_index",
            HarvestError::Session(_) => "session",
            HarvestError::Sink { .. } => "sink",
            HarvestError::Config(_) => "config",
            HarvestError::Io(_) => "io",
        }
    }

    /// Transient failures worth another attempt with a fresh session.
    /// A layout mismatch or stale index needs a code fix, not a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HarvestError::Navigation { .. } | HarvestError::Timeout { .. } | HarvestError::Session(_)
        )
    }

    pub(crate) fn missing(what: impl Into<String>) -> Self {
        HarvestError::ParseMismatch(format!("no element matched {}", what.into()))
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy() {
        let nav = HarvestError::Navigation {
            url: "https://example.com".to_string(),
            reason: "connection reset".to_string(),
        };
        assert!(nav.is_retryable());

        let timeout = HarvestError::Timeout {
            what: "results".to_string(),
            elapsed: Duration::from_secs(5),
        };
        assert!(timeout.is_retryable());

        assert!(!HarvestError::ParseMismatch("price".to_string()).is_retryable());
        assert!(
            !HarvestError::StaleIndex {
                leg: Leg::Inbound,
                index: 4,
                available: 2
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_kinds_are_distinct() {
        let nav = HarvestError::Navigation {
            url: "u".to_string(),
            reason: "r".to_string(),
        };
        let mismatch = HarvestError::missing(".total > strong > span");
        assert_ne!(nav.kind(), mismatch.kind());
        assert_eq!(mismatch.kind(), "parse_mismatch");
        assert_eq!(
            mismatch.to_string(),
            "page layout mismatch: no element matched .total > strong > span"
        );
    }

    #[test]
    fn test_stale_index_message() {
        let err = HarvestError::StaleIndex {
            leg: Leg::Outbound,
            index: 3,
            available: 3,
        };
        assert_eq!(err.to_string(), "outbound option 3 is out of range, only 3 rendered");
    }
}
