//! DataFrame views and export.
//!
//! A single series becomes a long frame with one row per period. Several
//! series become a wide frame keyed on `period_end`, one column per concept,
//! most recent period first.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use xbrl_core::{Result, XbrlError};

use crate::stitcher::StitchedSeries;

/// Column holding the period end date.
pub const PERIOD_END: &str = "period_end";

impl StitchedSeries {
    /// Converts the series to a long DataFrame, most recent period first.
    ///
    /// Columns: `period_end`, `value`, `tag`, `form`, `filed`, `fiscal_year`,
    /// `fiscal_period`, `unit`, `period_class`.
    ///
    /// # Errors
    /// Returns [`XbrlError::Export`] if the frame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows();

        let ends: Vec<NaiveDate> = rows.iter().map(|r| r.fact.end).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.fact.value).collect();
        let tags: Vec<&str> = rows.iter().map(|r| r.fact.tag.as_str()).collect();
        let forms: Vec<Option<&str>> = rows.iter().map(|r| r.fact.form.as_deref()).collect();
        let filed: Vec<Option<NaiveDate>> = rows.iter().map(|r| r.fact.filed).collect();
        let fiscal_years: Vec<Option<i32>> = rows.iter().map(|r| r.fact.fiscal_year).collect();
        let fiscal_periods: Vec<Option<&str>> =
            rows.iter().map(|r| r.fact.fiscal_period.as_deref()).collect();
        let units: Vec<&str> = rows.iter().map(|r| r.fact.unit.as_str()).collect();
        let classes: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();

        DataFrame::new(vec![
            Column::new(PERIOD_END.into(), ends),
            Column::new("value".into(), values),
            Column::new("tag".into(), tags),
            Column::new("form".into(), forms),
            Column::new("filed".into(), filed),
            Column::new("fiscal_year".into(), fiscal_years),
            Column::new("fiscal_period".into(), fiscal_periods),
            Column::new("unit".into(), units),
            Column::new("period_class".into(), classes),
        ])
        .map_err(export_error)
    }
}

/// Combines stitched series into one wide DataFrame.
///
/// Rows are the union of all period ends, most recent first. Each series
/// contributes a column named after its map key; periods it lacks are null.
///
/// # Errors
/// Returns [`XbrlError::Export`] if the frame cannot be assembled.
pub fn financials_table(series: &BTreeMap<String, StitchedSeries>) -> Result<DataFrame> {
    let ends: Vec<NaiveDate> = series
        .values()
        .flat_map(|s| s.iter().map(|row| row.fact.end))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();

    let mut columns = Vec::with_capacity(series.len() + 1);
    columns.push(Column::new(PERIOD_END.into(), ends.clone()));

    for (concept, s) in series {
        let by_end: BTreeMap<NaiveDate, f64> = s.iter().map(|row| (row.fact.end, row.fact.value)).collect();
        let values: Vec<Option<f64>> = ends.iter().map(|end| by_end.get(end).copied()).collect();
        columns.push(Column::new(concept.as_str().into(), values));
    }

    DataFrame::new(columns).map_err(export_error)
}

/// Writes a DataFrame as CSV with a header row.
///
/// # Errors
/// Returns [`XbrlError::Export`] if writing fails.
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .finish(df)
        .map_err(export_error)
}

/// Writes any serializable value (a series, a map of series) as pretty JSON.
///
/// # Errors
/// Returns [`XbrlError::Export`] if serialization or writing fails.
pub fn write_json<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, value).map_err(|e| XbrlError::Export(e.to_string()))
}

fn export_error(e: PolarsError) -> XbrlError {
    XbrlError::Export(e.to_string())
}
