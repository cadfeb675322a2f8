//! Concepts derived from other stitched series.

use std::collections::HashMap;

use crate::stitcher::{StitchedRow, StitchedSeries};

/// Concept key of the derived free cash flow series.
pub const FREE_CASH_FLOW: &str = "free_cash_flow";

/// Operating cash flow minus capital expenditure, joined on period end.
///
/// Capex is subtracted as an absolute value, whatever its reported sign.
/// Periods missing from either input are dropped. Metadata comes from
/// the operating cash flow row, and the tag records both sources.
#[must_use]
pub fn free_cash_flow(operating_cash_flow: &StitchedSeries, capex: &StitchedSeries) -> StitchedSeries {
    let capex_by_end: HashMap<_, _> = capex.iter().map(|row| (row.fact.end, row)).collect();

    let rows = operating_cash_flow
        .iter()
        .filter_map(|ocf| {
            let spend = capex_by_end.get(&ocf.fact.end)?;
            let mut fact = ocf.fact.clone();
            fact.value = ocf.fact.value - spend.fact.value.abs();
            fact.tag = format!("{} - {}", ocf.fact.tag, spend.fact.tag);
            Some(StitchedRow {
                fact,
                rank: ocf.rank.max(spend.rank),
                period: ocf.period,
            })
        })
        .collect();

    StitchedSeries::from_rows(FREE_CASH_FLOW, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stitcher::{StitchOptions, stitch};
    use chrono::NaiveDate;
    use xbrl_core::{Fact, FactSet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_free_cash_flow() {
        let q1 = date(2024, 3, 31);
        let q2 = date(2024, 6, 30);
        let facts = FactSet::new()
            .with_fact("us-gaap", Fact::new("NetCashProvidedByUsedInOperatingActivities", "USD", q1, 100.0))
            .with_fact("us-gaap", Fact::new("NetCashProvidedByUsedInOperatingActivities", "USD", q2, 120.0))
            .with_fact("us-gaap", Fact::new("PaymentsToAcquirePropertyPlantAndEquipment", "USD", q2, 20.0));

        let opts = StitchOptions::default();
        let ocf = stitch("operating_cash_flow", &facts, &["NetCashProvidedByUsedInOperatingActivities"], &opts);
        let capex = stitch("capex", &facts, &["PaymentsToAcquirePropertyPlantAndEquipment"], &opts);

        let fcf = free_cash_flow(&ocf, &capex);
        assert_eq!(fcf.concept, FREE_CASH_FLOW);
        assert_eq!(fcf.len(), 1);

        let row = fcf.latest().unwrap();
        assert_eq!(row.fact.end, q2);
        assert_eq!(row.fact.value, 100.0);
        assert_eq!(
            row.fact.tag,
            "NetCashProvidedByUsedInOperatingActivities - PaymentsToAcquirePropertyPlantAndEquipment"
        );
    }

    #[test]
    fn test_negative_capex_sign() {
        let end = date(2024, 3, 31);
        let facts = FactSet::new()
            .with_fact("us-gaap", Fact::new("Ocf", "USD", end, 50.0))
            .with_fact("us-gaap", Fact::new("Capex", "USD", end, -15.0));

        let opts = StitchOptions::default();
        let fcf = free_cash_flow(
            &stitch("ocf", &facts, &["Ocf"], &opts),
            &stitch("capex", &facts, &["Capex"], &opts),
        );
        assert_eq!(fcf.latest().unwrap().fact.value, 35.0);
    }
}
