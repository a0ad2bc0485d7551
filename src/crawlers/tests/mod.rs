

use crate::crawlers::{Browser, JobContext};
use crate::parsers::Fly540Page;
use crate::parsers::tests::fixtures::{FixtureLeg, at, summary_page};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn depart() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 29).unwrap()
}

pub(crate) fn return_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 5).unwrap()
}

pub(crate) fn context(browser: Arc<dyn Browser>) -> Arc<JobContext> {
    Arc::new(JobContext {
        browser,
        page: Arc::new(Fly540Page::new()),
        job_timeout: Duration::from_secs(5),
        step_timeout: Duration::from_millis(200),
        max_attempts: 2,
    })
}

/// Summary for a combination: outbound cards depart two hours apart from 06:00,
/// inbound cards three hours apart counting back from 18:00
pub(crate) fn summary_for(
    depart: NaiveDate,
    return_date: NaiveDate,
) -> impl Fn(usize, usize) -> String + Send + Sync + 'static {
    move |outbound, inbound| {
        let out = FixtureLeg::new("NBO", "MBA", at(depart, 6 + 2 * outbound as u32, 0), 60);
        let inb = FixtureLeg::new("MBA", "NBO", at(return_date, 18 - 3 * inbound as u32, 15), 65);
        summary_page(
            &out,
            &inb,
            &format!("USD {}.00", 100 + 10 * outbound + inbound),
            &["12.50", "7.25"],
        )
    }
}
