use super::fixtures::{FixtureLeg, at, redesigned_results_page, results_page, summary_page};
use crate::parsers::{CardCounts, Fly540Page, PageModel, normalize_timestamp};
use chrono::NaiveDate;

fn depart() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 29).unwrap()
}

fn return_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 5).unwrap()
}

#[cfg(test)]
mod results_view {
    use super::*;

    #[test]
    fn test_counts_cards_per_leg() {
        let page = Fly540Page::new();
        let counts = page
            .count_cards(&results_page(depart(), return_date(), 3, 2))
            .unwrap();
        assert_eq!(
            counts,
            CardCounts {
                outbound: 3,
                inbound: 2
            }
        );
    }

    #[test]
    fn test_no_flights_is_zero_not_error() {
        let page = Fly540Page::new();
        let counts = page
            .count_cards(&results_page(depart(), return_date(), 0, 4))
            .unwrap();
        assert_eq!(counts.outbound, 0);
        assert_eq!(counts.inbound, 4);
    }

    #[test]
    fn test_changed_layout_is_mismatch() {
        let page = Fly540Page::new();
        let err = page
            .count_cards(&redesigned_results_page(depart(), return_date()))
            .unwrap_err();
        assert_eq!(err.kind(), "parse_mismatch");
    }

    #[test]
    fn test_banner_years() {
        let page = Fly540Page::new();
        let years = page
            .banner_years(&results_page(
                NaiveDate::from_ymd_opt(2026, 12, 28).unwrap(),
                NaiveDate::from_ymd_opt(2027, 1, 4).unwrap(),
                1,
                1,
            ))
            .unwrap();
        assert_eq!(years.departing, "2026");
        assert_eq!(years.returning, "2027");
    }

    #[test]
    fn test_missing_banner_is_mismatch() {
        let page = Fly540Page::new();
        let err = page
            .banner_years("<html><body><section></section></body></html>")
            .unwrap_err();
        assert_eq!(err.kind(), "parse_mismatch");
    }
}

#[cfg(test)]
mod summary_view {
    use super::*;

    fn legs() -> (FixtureLeg, FixtureLeg) {
        (
            FixtureLeg::new("NBO", "MBA", at(depart(), 6, 30), 60),
            FixtureLeg::new("MBA", "NBO", at(return_date(), 19, 45), 65),
        )
    }

    #[test]
    fn test_parse_summary_fields() {
        let (out, inb) = legs();
        let page = Fly540Page::new();
        let summary = page
            .parse_summary(&summary_page(&out, &inb, "USD 139.75", &["12.50", "7.25"]))
            .unwrap();

        assert_eq!(summary.outbound.from, "NBO");
        assert_eq!(summary.outbound.to, "MBA");
        assert_eq!(summary.outbound.departure_date, "Thu 29, Oct");
        assert_eq!(summary.outbound.departure_time, "6:30am");
        assert_eq!(summary.inbound.from, "MBA");
        assert_eq!(summary.inbound.arrival_time, "8:50pm");
        assert_eq!(summary.total_price, "USD139.75");
        assert_eq!(summary.tax_lines, vec![12.5, 7.25]);
        assert_eq!(summary.total_taxes(), 19.75);
    }

    #[test]
    fn test_summary_dates_normalize() {
        let (out, inb) = legs();
        let page = Fly540Page::new();
        let summary = page
            .parse_summary(&summary_page(&out, &inb, "USD 139.75", &["12.50"]))
            .unwrap();

        let departs = normalize_timestamp(
            &summary.inbound.departure_date,
            &summary.inbound.departure_time,
            "2026",
        )
        .unwrap();
        assert_eq!(departs.to_string(), "Thu Nov 05 19:45:00 GMT 2026");
    }

    #[test]
    fn test_empty_tax_breakdown_sums_to_zero() {
        let (out, inb) = legs();
        let page = Fly540Page::new();
        let summary = page
            .parse_summary(&summary_page(&out, &inb, "USD 120.00", &[]))
            .unwrap();
        assert!(summary.tax_lines.is_empty());
        assert_eq!(summary.total_taxes(), 0.0);
    }

    #[test]
    fn test_missing_price_is_mismatch() {
        let (out, inb) = legs();
        let page = Fly540Page::new();
        let markup = summary_page(&out, &inb, "USD 120.00", &["1.00"])
            .replace(r#"class="total""#, r#"class="grand-total""#);
        let err = page.parse_summary(&markup).unwrap_err();
        assert_eq!(err.kind(), "parse_mismatch");
        assert!(err.to_string().contains(".total > strong > span"));
    }

    #[test]
    fn test_non_numeric_tax_is_mismatch() {
        let (out, inb) = legs();
        let page = Fly540Page::new();
        let err = page
            .parse_summary(&summary_page(&out, &inb, "USD 120.00", &["n/a"]))
            .unwrap_err();
        assert_eq!(err.kind(), "parse_mismatch");
    }
}
