use crate::crawlers::{BrowserSession, JobContext, SessionJob};
use crate::error::{HarvestError, Leg, Result};
use crate::parsers::{BannerYears, PageModel, SummaryFields, Timestamp, normalize_timestamp};
use crate::results::{CombinationDescriptor, ItineraryRecord};
use crate::utils::format_amount;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Progress through the selection flow for one combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    OutboundChosen,
    OutboundSelected,
    InboundChosen,
    InboundSelected,
    Continued,
    Extracted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Replays the booking flow for one combination and reads the summary
pub struct ExtractionJob {
    pub descriptor: CombinationDescriptor,
}

impl ExtractionJob {
    pub fn new(descriptor: CombinationDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl SessionJob for ExtractionJob {
    type Output = ItineraryRecord;

    fn label(&self) -> String {
        format!(
            "combination {}x{} of {}",
            self.descriptor.outbound_index, self.descriptor.inbound_index, self.descriptor.url
        )
    }

    async fn run(&self, session: &mut dyn BrowserSession, ctx: &JobContext) -> Result<Self::Output> {
        let mut flow = SelectionFlow {
            session,
            page: ctx.page.as_ref(),
            step_timeout: ctx.step_timeout,
            descriptor: &self.descriptor,
            stage: None,
        };

        let result = flow.drive().await;
        if let Err(e) = &result {
            let reached = flow
                .stage
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string());
            ::log::debug!("{} stopped after stage {}: {}", self.label(), reached, e);
        }
        result
    }
}

struct SelectionFlow<'a> {
    session: &'a mut dyn BrowserSession,
    page: &'a dyn PageModel,
    step_timeout: Duration,
    descriptor: &'a CombinationDescriptor,
    stage: Option<Stage>,
}

impl SelectionFlow<'_> {
    fn advance(&mut self, stage: Stage) {
        ::log::trace!(
            "{}x{} -> {}",
            self.descriptor.outbound_index,
            self.descriptor.inbound_index,
            stage
        );
        self.stage = Some(stage);
    }

    async fn drive(&mut self) -> Result<ItineraryRecord> {
        let years = self.load().await?;
        self.advance(Stage::Loaded);

        self.choose(Leg::Outbound, self.descriptor.outbound_index)
            .await?;
        self.choose(Leg::Inbound, self.descriptor.inbound_index)
            .await?;

        self.session
            .click(self.page.continue_button(), self.step_timeout)
            .await?;
        self.session
            .wait_for(self.page.summary_ready(), self.step_timeout)
            .await?;
        self.advance(Stage::Continued);

        let markup = self.session.outer_html(self.page.results_region()).await?;
        let summary = self.page.parse_summary(&markup)?;
        let record = build_record(&summary, &years)?;
        self.advance(Stage::Extracted);
        Ok(record)
    }

    /// Fresh navigation; per-card dates lack the year so it is taken from the banners here
    async fn load(&mut self) -> Result<BannerYears> {
        self.session.goto(&self.descriptor.url).await?;
        self.session
            .wait_for(self.page.results_ready(), self.step_timeout)
            .await?;
        let source = self.session.source().await?;
        self.page.banner_years(&source)
    }

    /// Clicks the card at `index`, then its select button
    async fn choose(&mut self, leg: Leg, index: usize) -> Result<()> {
        self.ensure_rendered(leg, index).await?;

        self.session
            .click(&self.page.card(leg, index), self.step_timeout)
            .await?;
        self.advance(match leg {
            Leg::Outbound => Stage::OutboundChosen,
            Leg::Inbound => Stage::InboundChosen,
        });

        self.session
            .click(&self.page.card_select_button(leg, index), self.step_timeout)
            .await?;
        self.advance(match leg {
            Leg::Outbound => Stage::OutboundSelected,
            Leg::Inbound => Stage::InboundSelected,
        });
        Ok(())
    }

    /// Fails with a stale index when the live list is shorter than at discovery time
    async fn ensure_rendered(&mut self, leg: Leg, index: usize) -> Result<()> {
        if index < self.session.count(self.page.cards(leg)).await? {
            return Ok(());
        }
        // the list may still be rendering
        if self
            .session
            .wait_for(&self.page.card(leg, index), self.step_timeout)
            .await
            .is_ok()
        {
            return Ok(());
        }
        Err(HarvestError::StaleIndex {
            leg,
            index,
            available: self.session.count(self.page.cards(leg)).await?,
        })
    }
}

/// Normalizes the raw summary into a record. Outbound times take the departing
/// banner year, inbound times the returning one; an arrival may roll into the next year.
pub fn build_record(summary: &SummaryFields, years: &BannerYears) -> Result<ItineraryRecord> {
    let out = &summary.outbound;
    let inb = &summary.inbound;

    let outbound_departure =
        normalize_timestamp(&out.departure_date, &out.departure_time, &years.departing)?;
    let inbound_departure =
        normalize_timestamp(&inb.departure_date, &inb.departure_time, &years.returning)?;

    Ok(ItineraryRecord {
        outbound_departure_airport: out.from.clone(),
        outbound_arrival_airport: out.to.clone(),
        outbound_departure_time: outbound_departure,
        outbound_arrival_time: arrival_time(
            outbound_departure,
            &out.arrival_date,
            &out.arrival_time,
            &years.departing,
        )?,
        inbound_departure_airport: inb.from.clone(),
        inbound_arrival_airport: inb.to.clone(),
        inbound_departure_time: inbound_departure,
        inbound_arrival_time: arrival_time(
            inbound_departure,
            &inb.arrival_date,
            &inb.arrival_time,
            &years.returning,
        )?,
        total_price: summary.total_price.clone(),
        taxes: format_amount(summary.total_taxes()),
    })
}

/// Arrival in the departure's year, or the following one for a flight landing
/// after midnight on 31 December. Falls back to the first reading.
fn arrival_time(departure: Timestamp, date: &str, time: &str, year: &str) -> Result<Timestamp> {
    let same_year = normalize_timestamp(date, time, year);
    if matches!(&same_year, Ok(arrival) if *arrival >= departure) {
        return same_year;
    }

    let Ok(next) = year.trim().parse::<i32>().map(|y| (y + 1).to_string()) else {
        return same_year;
    };
    match normalize_timestamp(date, time, &next) {
        Ok(arrival) if arrival >= departure => Ok(arrival),
        _ => same_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::LegSummary;

    fn leg(from: &str, to: &str, date: &str, dep: &str, arr: &str) -> LegSummary {
        LegSummary {
            from: from.to_string(),
            to: to.to_string(),
            departure_date: date.to_string(),
            departure_time: dep.to_string(),
            arrival_date: date.to_string(),
            arrival_time: arr.to_string(),
        }
    }

    #[test]
    fn test_build_record_uses_leg_years() {
        let summary = SummaryFields {
            outbound: leg("NBO", "MBA", "Mon 28, Dec", "6:30am", "7:30am"),
            inbound: leg("MBA", "NBO", "Mon 04, Jan", "5:00pm", "6:05pm"),
            total_price: "USD250.00".to_string(),
            tax_lines: vec![12.5, 7.25],
        };
        let years = BannerYears {
            departing: "2026".to_string(),
            returning: "2027".to_string(),
        };

        let record = build_record(&summary, &years).unwrap();
        assert_eq!(record.outbound_departure_time.to_string(), "Mon Dec 28 06:30:00 GMT 2026");
        assert_eq!(record.outbound_arrival_time.to_string(), "Mon Dec 28 07:30:00 GMT 2026");
        assert_eq!(record.inbound_departure_time.to_string(), "Mon Jan 04 17:00:00 GMT 2027");
        assert_eq!(record.inbound_arrival_time.to_string(), "Mon Jan 04 18:05:00 GMT 2027");
        assert_eq!(record.taxes, "19.75");
        assert_eq!(record.total_price, "USD250.00");
    }

    #[test]
    fn test_build_record_bad_date_is_mismatch() {
        let summary = SummaryFields {
            outbound: leg("NBO", "MBA", "someday", "6:30am", "7:30am"),
            inbound: leg("MBA", "NBO", "Mon 04, Jan", "5:00pm", "6:05pm"),
            total_price: "USD250.00".to_string(),
            tax_lines: vec![],
        };
        let years = BannerYears {
            departing: "2026".to_string(),
            returning: "2027".to_string(),
        };
        assert_eq!(build_record(&summary, &years).unwrap_err().kind(), "parse_mismatch");
    }

    fn overnight(from: &str, to: &str, dep: (&str, &str), arr: (&str, &str)) -> LegSummary {
        LegSummary {
            from: from.to_string(),
            to: to.to_string(),
            departure_date: dep.0.to_string(),
            departure_time: dep.1.to_string(),
            arrival_date: arr.0.to_string(),
            arrival_time: arr.1.to_string(),
        }
    }

    #[test]
    fn test_arrival_after_new_year_takes_next_year() {
        let summary = SummaryFields {
            outbound: overnight("NBO", "MBA", ("Thu 31, Dec", "11:30pm"), ("Fri 01, Jan", "12:30am")),
            inbound: overnight("MBA", "NBO", ("Thu 31, Dec", "11:45pm"), ("Fri 01, Jan", "12:50am")),
            total_price: "USD250.00".to_string(),
            tax_lines: vec![],
        };
        let years = BannerYears {
            departing: "2026".to_string(),
            returning: "2026".to_string(),
        };

        let record = build_record(&summary, &years).unwrap();
        assert_eq!(record.outbound_departure_time.to_string(), "Thu Dec 31 23:30:00 GMT 2026");
        assert_eq!(record.outbound_arrival_time.to_string(), "Fri Jan 01 00:30:00 GMT 2027");
        assert_eq!(record.inbound_departure_time.to_string(), "Thu Dec 31 23:45:00 GMT 2026");
        assert_eq!(record.inbound_arrival_time.to_string(), "Fri Jan 01 00:50:00 GMT 2027");
        assert_eq!(record.taxes, "0.00");
    }

    #[test]
    fn test_unreadable_arrival_is_still_mismatch() {
        let summary = SummaryFields {
            outbound: overnight("NBO", "MBA", ("Thu 31, Dec", "11:30pm"), ("soon", "12:30am")),
            inbound: leg("MBA", "NBO", "Mon 04, Jan", "5:00pm", "6:05pm"),
            total_price: "USD250.00".to_string(),
            tax_lines: vec![],
        };
        let years = BannerYears {
            departing: "2026".to_string(),
            returning: "2027".to_string(),
        };
        assert_eq!(build_record(&summary, &years).unwrap_err().kind(), "parse_mismatch");
    }

    #[test]
    fn test_thousands_in_taxes() {
        let summary = SummaryFields {
            outbound: leg("NBO", "MBA", "Mon 28, Dec", "6:30am", "7:30am"),
            inbound: leg("MBA", "NBO", "Mon 04, Jan", "5:00pm", "6:05pm"),
            total_price: "KES30000".to_string(),
            tax_lines: vec![1000.0, 234.5],
        };
        let years = BannerYears {
            departing: "2026".to_string(),
            returning: "2027".to_string(),
        };
        assert_eq!(build_record(&summary, &years).unwrap().taxes, "1,234.50");
    }
}
