pub mod fly540;
pub mod html;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod tests;

use crate::error::{Leg, Result};

pub use fly540::Fly540Page;
pub use timestamp::{Timestamp, normalize_timestamp};

/// Number of option cards rendered for each leg of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardCounts {
    pub outbound: usize,
    pub inbound: usize,
}

/// Years shown in the "Departing" and "Returning" banners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerYears {
    pub departing: String,
    pub returning: String,
}

/// Raw, unnormalized fields of one leg in the summary view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegSummary {
    pub from: String,
    pub to: String,
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
}

/// Everything read off the summary view after both legs are selected
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFields {
    pub outbound: LegSummary,
    pub inbound: LegSummary,
    pub total_price: String,
    pub tax_lines: Vec<f64>,
}

impl SummaryFields {
    pub fn total_taxes(&self) -> f64 {
        self.tax_lines.iter().sum()
    }
}

/// Knows where things live on the booking site.
///
/// Every structural query goes through this trait, so a layout change is fixed
/// in one implementation and missing elements surface as
/// [`HarvestError::ParseMismatch`](crate::error::HarvestError::ParseMismatch) from one place.
pub trait PageModel: Send + Sync {
    /// Matches once the search results have rendered
    fn results_ready(&self) -> &str;

    /// Region holding both result lists and, later, the summary
    fn results_region(&self) -> &str;

    /// Every option card of a leg
    fn cards(&self, leg: Leg) -> &str;

    /// The option card at a zero-based position
    fn card(&self, leg: Leg, index: usize) -> String;

    /// The select button inside the option card at a zero-based position
    fn card_select_button(&self, leg: Leg, index: usize) -> String;

    /// Moves from the selection view to the summary
    fn continue_button(&self) -> &str;

    /// Matches once the summary view has rendered
    fn summary_ready(&self) -> &str;

    /// Counts the option cards in the results region markup
    fn count_cards(&self, html: &str) -> Result<CardCounts>;

    /// Reads the four-digit year of each leg from the page banners
    fn banner_years(&self, html: &str) -> Result<BannerYears>;

    /// Reads the summary view
    fn parse_summary(&self, html: &str) -> Result<SummaryFields>;
}
