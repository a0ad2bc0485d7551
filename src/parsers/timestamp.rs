use crate::error::{HarvestError, Result};
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// How the summary view renders a leg's date and time once the banner year is appended,
/// e.g. `Thu 29, Oct 6:30am 2026`
pub const SOURCE_FORMAT: &str = "%a %d, %b %I:%M%p %Y";

/// Output form of every timestamp, e.g. `Thu Oct 29 06:30:00 GMT 2026`.
/// The GMT tag is fixed; no zone conversion takes place.
pub const CANONICAL_FORMAT: &str = "%a %b %d %H:%M:%S GMT %Y";

/// A leg time as shown on the site, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parses a value previously rendered with [`CANONICAL_FORMAT`]
    pub fn parse_canonical(text: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(text.trim(), CANONICAL_FORMAT)
            .map(Self)
            .map_err(|e| HarvestError::ParseMismatch(format!("timestamp {:?}: {}", text, e)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Combines a card's date (which lacks the year), its time, and the year taken
/// from the search banner into a [`Timestamp`].
pub fn normalize_timestamp(date_without_year: &str, time: &str, year: &str) -> Result<Timestamp> {
    let joined = format!("{} {} {}", date_without_year, time, year);
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    NaiveDateTime::parse_from_str(&collapsed, SOURCE_FORMAT)
        .map(Timestamp)
        .map_err(|e| {
            HarvestError::ParseMismatch(format!("unexpected date text {:?}: {}", collapsed, e))
        })
}
