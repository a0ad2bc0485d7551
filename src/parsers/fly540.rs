use crate::error::{HarvestError, Leg, Result};
use crate::parsers::html;
use crate::parsers::{BannerYears, CardCounts, LegSummary, PageModel, SummaryFields};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern should be valid"));

const OUTBOUND_LIST: &str = ".fly5-flights.fly5-depart";
const INBOUND_LIST: &str = ".fly5-flights.fly5-return";
const OUTBOUND_CARDS: &str = ".fly5-flights.fly5-depart > .fly5-results > div";
const INBOUND_CARDS: &str = ".fly5-flights.fly5-return > .fly5-results > div";

const OUTBOUND_DETAIL: &str = ".fly5-fldet.fly5-fout > div";
const INBOUND_DETAIL: &str = ".fly5-fldet.fly5-fin > div";
const TOTAL_PRICE: &str = ".total > strong > span";
const TAX_BREAKDOWN: &str = ".fly5-bkdown";
const TAX_LINES: &str = ".fly5-bkdown > div:nth-of-type(2) > span";

/// Layout of www.fly540.com search results and booking summary
#[derive(Debug, Clone, Default)]
pub struct Fly540Page;

impl Fly540Page {
    pub fn new() -> Self {
        Self
    }

    fn leg_summary(doc: &Html, detail: &str) -> Result<LegSummary> {
        let field = |suffix: &str| html::first_text(doc, &format!("{} > {}", detail, suffix));

        Ok(LegSummary {
            from: strip_spaces(&field("div.fly5-frshort")?),
            to: strip_spaces(&field("div.fly5-toshort")?),
            departure_date: field("div.fly5-timeout > span.fly5-fdate")?,
            departure_time: field("div.fly5-timeout > span.fly5-ftime")?,
            arrival_date: field("div.fly5-timein > span.fly5-fdate")?,
            arrival_time: field("div.fly5-timein > span.fly5-ftime")?,
        })
    }

    fn banner_year(doc: &Html, label: &str) -> Result<String> {
        let banner = html::parent_text_of_span(doc, label)
            .ok_or_else(|| HarvestError::missing(format!("a \"{}\" banner", label)))?;
        YEAR.find(&banner)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                HarvestError::ParseMismatch(format!("no year in {} banner {:?}", label, banner))
            })
    }
}

impl PageModel for Fly540Page {
    fn results_ready(&self) -> &str {
        "section .fly5-results"
    }

    fn results_region(&self) -> &str {
        "section"
    }

    fn cards(&self, leg: Leg) -> &str {
        match leg {
            Leg::Outbound => OUTBOUND_CARDS,
            Leg::Inbound => INBOUND_CARDS,
        }
    }

    fn card(&self, leg: Leg, index: usize) -> String {
        // nth-of-type is one-based
        format!("{}:nth-of-type({})", self.cards(leg), index + 1)
    }

    fn card_select_button(&self, leg: Leg, index: usize) -> String {
        format!("{} button", self.card(leg, index))
    }

    fn continue_button(&self) -> &str {
        "button#continue-btn"
    }

    fn summary_ready(&self) -> &str {
        ".fly5-fldet.fly5-fout"
    }

    fn count_cards(&self, markup: &str) -> Result<CardCounts> {
        let doc = Html::parse_fragment(markup);

        for list in [OUTBOUND_LIST, INBOUND_LIST] {
            if !html::exists(&doc, list)? {
                return Err(HarvestError::missing(list));
            }
        }

        Ok(CardCounts {
            outbound: html::count(&doc, OUTBOUND_CARDS)?,
            inbound: html::count(&doc, INBOUND_CARDS)?,
        })
    }

    fn banner_years(&self, markup: &str) -> Result<BannerYears> {
        let doc = Html::parse_document(markup);
        Ok(BannerYears {
            departing: Self::banner_year(&doc, "Departing")?,
            returning: Self::banner_year(&doc, "Returning")?,
        })
    }

    fn parse_summary(&self, markup: &str) -> Result<SummaryFields> {
        let doc = Html::parse_fragment(markup);

        let outbound = Self::leg_summary(&doc, OUTBOUND_DETAIL)?;
        let inbound = Self::leg_summary(&doc, INBOUND_DETAIL)?;
        let total_price = strip_spaces(&html::first_text(&doc, TOTAL_PRICE)?);

        if !html::exists(&doc, TAX_BREAKDOWN)? {
            return Err(HarvestError::missing(TAX_BREAKDOWN));
        }
        let tax_lines = html::texts(&doc, TAX_LINES)?
            .iter()
            .map(|line| parse_amount(line))
            .collect::<Result<Vec<_>>>()?;

        Ok(SummaryFields {
            outbound,
            inbound,
            total_price,
            tax_lines,
        })
    }
}

fn strip_spaces(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_amount(text: &str) -> Result<f64> {
    let cleaned = text.replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(HarvestError::ParseMismatch(format!(
            "tax line {:?} is not a number",
            text
        ))),
    }
}
