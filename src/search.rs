use chrono::NaiveDate;
use url::Url;

/// Format of the `date_from`/`date_to` values before form encoding
const SEARCH_DATE_FORMAT: &str = "%a, %-d %b %Y";

/// One round-trip search against the booking site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Departure airport IATA code
    pub origin: String,
    /// Arrival airport IATA code
    pub destination: String,
    /// Currency the fares are quoted in
    pub currency: String,
    /// Outbound travel date
    pub depart: NaiveDate,
    /// Inbound travel date
    pub return_date: NaiveDate,
}

impl SearchRequest {
    pub fn new(
        origin: &str,
        destination: &str,
        currency: &str,
        depart: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            currency: currency.to_string(),
            depart,
            return_date,
        }
    }
}

/// Builds the search results URL for a request.
///
/// Dates are rendered as `Thu, 29 Oct 2026` and form encoded, which yields
/// `Thu%2C+29+Oct+2026` on the wire.
pub fn build_search_url(base: &Url, request: &SearchRequest) -> String {
    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("isoneway", "0")
        .append_pair("depairportcode", &request.origin)
        .append_pair("arrvairportcode", &request.destination)
        .append_pair("date_from", &format_search_date(request.depart))
        .append_pair("date_to", &format_search_date(request.return_date))
        .append_pair("adult_no", "1")
        .append_pair("children_no", "0")
        .append_pair("infant_no", "0")
        .append_pair("currency", &request.currency)
        .append_pair("searchFlight", "");
    url.to_string()
}

/// Renders a date the way the search form submits it, before encoding
pub fn format_search_date(date: NaiveDate) -> String {
    date.format(SEARCH_DATE_FORMAT).to_string()
}

/// Decodes a (form-decoded) `date_from`/`date_to` value back into a date
pub fn parse_search_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%a, %d %b %Y").ok()
}
