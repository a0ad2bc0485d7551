use crate::parsers::Timestamp;
use serde::Serialize;

/// One outbound×inbound pairing, identified by positions in a search's rendered lists
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinationDescriptor {
    /// Search URL the indices refer to
    pub url: String,
    /// Zero-based position of the outbound card
    pub outbound_index: usize,
    /// Zero-based position of the inbound card
    pub inbound_index: usize,
}

impl CombinationDescriptor {
    pub fn new(url: &str, outbound_index: usize, inbound_index: usize) -> Self {
        Self {
            url: url.to_string(),
            outbound_index,
            inbound_index,
        }
    }
}

/// Column order of the output file
pub const COLUMNS: [&str; 10] = [
    "outbound_departure_airport",
    "outbound_arrival_airport",
    "outbound_departure_time",
    "outbound_arrival_time",
    "inbound_departure_airport",
    "inbound_arrival_airport",
    "inbound_departure_time",
    "inbound_arrival_time",
    "total_price",
    "taxes",
];

/// A fully extracted round-trip itinerary. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryRecord {
    pub outbound_departure_airport: String,
    pub outbound_arrival_airport: String,
    pub outbound_departure_time: Timestamp,
    pub outbound_arrival_time: Timestamp,
    pub inbound_departure_airport: String,
    pub inbound_arrival_airport: String,
    pub inbound_departure_time: Timestamp,
    pub inbound_arrival_time: Timestamp,
    /// Price text as shown, currency included, whitespace removed
    pub total_price: String,
    /// Sum of the itemized taxes, two decimals with thousands separators
    pub taxes: String,
}

/// Records collected during one run
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<ItineraryRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ItineraryRecord) {
        self.records.push(record);
    }

    /// Orders by outbound departure, then inbound departure. Ties keep arrival order.
    pub fn sort(&mut self) {
        self.records
            .sort_by_key(|r| (r.outbound_departure_time, r.inbound_departure_time));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ItineraryRecord] {
        &self.records
    }
}
