//! Period classification.
//!
//! A fact with both dates is classified by span: under
//! [`QUARTERLY_MAX_DAYS`] is quarterly, over [`ANNUAL_MIN_DAYS`] is annual,
//! anything between is a partial or transition period and stays
//! [`PeriodClass::Unclassified`]. A fact without a start date is classified
//! by the form it was filed on.

use xbrl_core::{Fact, PeriodClass};

/// Spans strictly below this many days are quarterly.
pub const QUARTERLY_MAX_DAYS: i64 = 120;

/// Spans strictly above this many days are annual.
pub const ANNUAL_MIN_DAYS: i64 = 300;

/// Annual report forms, including amendments and transition reports.
const ANNUAL_FORMS: &[&str] = &["10-K", "10-K/A", "10-KT", "10-KT/A", "20-F", "20-F/A", "40-F", "40-F/A"];

/// Quarterly report forms.
const QUARTERLY_FORMS: &[&str] = &["10-Q", "10-Q/A", "10-QT", "10-QT/A"];

/// Classifies one fact.
#[must_use]
pub fn classify(fact: &Fact) -> PeriodClass {
    match fact.duration_days() {
        Some(days) => classify_span(days),
        None => classify_form(fact.form.as_deref()),
    }
}

/// Classifies a period by its length in days.
///
/// A negative span (start after end) is malformed and stays unclassified.
#[must_use]
pub const fn classify_span(days: i64) -> PeriodClass {
    if days < 0 {
        PeriodClass::Unclassified
    } else if days < QUARTERLY_MAX_DAYS {
        PeriodClass::Quarterly
    } else if days > ANNUAL_MIN_DAYS {
        PeriodClass::Annual
    } else {
        PeriodClass::Unclassified
    }
}

/// Classifies a period by the form type it was reported on.
#[must_use]
pub fn classify_form(form: Option<&str>) -> PeriodClass {
    let Some(form) = form.map(|f| f.trim().to_ascii_uppercase()) else {
        return PeriodClass::Unclassified;
    };

    if ANNUAL_FORMS.contains(&form.as_str()) {
        PeriodClass::Annual
    } else if QUARTERLY_FORMS.contains(&form.as_str()) {
        PeriodClass::Quarterly
    } else {
        PeriodClass::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn spanning(days: i64) -> Fact {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        Fact::new("Revenues", "USD", start + Duration::days(days), 1.0)
            .with_start(start)
            .with_form("10-K")
    }

    #[test]
    fn test_span_boundaries() {
        assert_eq!(classify(&spanning(89)), PeriodClass::Quarterly);
        assert_eq!(classify(&spanning(366)), PeriodClass::Annual);
        assert_eq!(classify(&spanning(200)), PeriodClass::Unclassified);

        assert_eq!(classify_span(119), PeriodClass::Quarterly);
        assert_eq!(classify_span(120), PeriodClass::Unclassified);
        assert_eq!(classify_span(300), PeriodClass::Unclassified);
        assert_eq!(classify_span(301), PeriodClass::Annual);
    }

    #[test]
    fn test_inverted_span_unclassified() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let inverted = Fact::new("Revenues", "USD", end, 1.0)
            .with_start(start)
            .with_form("10-Q");

        assert_eq!(inverted.duration_days(), Some(-364));
        assert_eq!(classify(&inverted), PeriodClass::Unclassified);
        assert_eq!(classify_span(-1), PeriodClass::Unclassified);
        assert_eq!(classify_span(0), PeriodClass::Quarterly);
    }

    #[test]
    fn test_span_wins_over_form() {
        // A quarter reported inside a 10-K is still a quarter.
        assert_eq!(classify(&spanning(91)), PeriodClass::Quarterly);
    }

    #[test]
    fn test_form_fallback_without_start() {
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let instant = |form: &str| Fact::new("Assets", "USD", end, 1.0).with_form(form);

        assert_eq!(classify(&instant("10-K")), PeriodClass::Annual);
        assert_eq!(classify(&instant("40-F")), PeriodClass::Annual);
        assert_eq!(classify(&instant("10-k/a")), PeriodClass::Annual);
        assert_eq!(classify(&instant("10-Q")), PeriodClass::Quarterly);
        assert_eq!(classify(&instant("8-K")), PeriodClass::Unclassified);
        assert_eq!(
            classify(&Fact::new("Assets", "USD", end, 1.0)),
            PeriodClass::Unclassified
        );
    }
}
