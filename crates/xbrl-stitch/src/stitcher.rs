//! Tag-priority stitching.
//!
//! Produces one [`StitchedSeries`] for a concept out of a [`FactSet`]:
//!
//! 1. For each tag in priority order, take its facts from the first taxonomy
//!    that carries it, under the first preferred unit with any facts. Units
//!    are never mixed within a tag.
//! 2. Concatenate, remembering each fact's tag rank.
//! 3. Classify every fact (see [`classify`](crate::classify)).
//! 4. Keep only the requested period type. An empty result falls back to the
//!    unfiltered set only when [`StitchOptions::fallback_to_unfiltered`] is set.
//! 5. Sort by (period end asc, rank asc, filed desc) and keep the first row
//!    per period end.
//! 6. Return rows most recent first.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};
use xbrl_core::{Fact, FactSet, PeriodClass, PeriodType, Result};

use crate::catalog::TagCatalog;
use crate::classify::classify;

/// Unit preference used when none is configured.
pub const DEFAULT_UNITS: &[&str] = &["USD", "USD/shares", "shares", "pure"];

/// Taxonomy preference used when none is configured.
pub const DEFAULT_TAXONOMIES: &[&str] = &["us-gaap", "ifrs-full", "dei"];

/// Options controlling a stitch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchOptions {
    /// Period type to keep; `None` keeps every row, including unclassified ones.
    pub period: Option<PeriodType>,
    /// Return the unfiltered rows when the period filter leaves nothing.
    pub fallback_to_unfiltered: bool,
    /// Unit preference, first match per tag wins.
    pub units: Vec<String>,
    /// Taxonomy preference, first taxonomy carrying a tag wins.
    pub taxonomies: Vec<String>,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            period: None,
            fallback_to_unfiltered: false,
            units: DEFAULT_UNITS.iter().map(|u| (*u).to_string()).collect(),
            taxonomies: DEFAULT_TAXONOMIES.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl StitchOptions {
    /// Options keeping quarterly rows only.
    #[must_use]
    pub fn quarterly() -> Self {
        Self::default().with_period(PeriodType::Quarterly)
    }

    /// Options keeping annual rows only.
    #[must_use]
    pub fn annual() -> Self {
        Self::default().with_period(PeriodType::Annual)
    }

    /// Sets the period filter.
    #[must_use]
    pub const fn with_period(mut self, period: PeriodType) -> Self {
        self.period = Some(period);
        self
    }

    /// Enables or disables the unfiltered fallback.
    #[must_use]
    pub const fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_unfiltered = enabled;
        self
    }

    /// Replaces the unit preference.
    #[must_use]
    pub fn with_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.units = units.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the taxonomy preference.
    #[must_use]
    pub fn with_taxonomies<I, S>(mut self, taxonomies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taxonomies = taxonomies.into_iter().map(Into::into).collect();
        self
    }
}

/// One row of a stitched series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StitchedRow {
    /// The selected fact; `fact.tag` is the source tag.
    #[serde(flatten)]
    pub fact: Fact,
    /// Position of the source tag in the priority list (0 is most authoritative).
    pub rank: usize,
    /// Period classification of the fact.
    pub period: PeriodClass,
}

/// One deduplicated time series for a concept, most recent period first.
///
/// Holds at most one row per period end. An empty series is a valid result:
/// the concept resolved but nothing was disclosed under any of its tags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StitchedSeries {
    /// Concept key the series was stitched for.
    pub concept: String,
    rows: Vec<StitchedRow>,
}

impl StitchedSeries {
    /// Wraps rows that are already deduplicated and sorted most recent first.
    pub(crate) fn from_rows(concept: impl Into<String>, rows: Vec<StitchedRow>) -> Self {
        Self {
            concept: concept.into(),
            rows,
        }
    }

    /// Returns the rows, most recent first.
    #[must_use]
    pub fn rows(&self) -> &[StitchedRow] {
        &self.rows
    }

    /// Iterates over the rows, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &StitchedRow> {
        self.rows.iter()
    }

    /// Returns the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the most recent row.
    #[must_use]
    pub fn latest(&self) -> Option<&StitchedRow> {
        self.rows.first()
    }

    /// Returns the row for a period end.
    #[must_use]
    pub fn get(&self, end: chrono::NaiveDate) -> Option<&StitchedRow> {
        self.rows.iter().find(|row| row.fact.end == end)
    }

    /// Returns the earliest and latest period ends.
    #[must_use]
    pub fn date_range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        Some((self.rows.last()?.fact.end, self.rows.first()?.fact.end))
    }

    /// Keeps only the `n` most recent periods.
    #[must_use]
    pub fn truncated(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }
}

impl<'a> IntoIterator for &'a StitchedSeries {
    type Item = &'a StitchedRow;
    type IntoIter = std::slice::Iter<'a, StitchedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Stitches one series out of `facts` using an explicit tag priority list.
///
/// A list with no populated tags yields an empty series.
pub fn stitch<S: AsRef<str>>(
    concept: &str,
    facts: &FactSet,
    tags: &[S],
    opts: &StitchOptions,
) -> StitchedSeries {
    let rows = collect_rows(facts, tags, opts);
    let total = rows.len();

    let mut rows = filter_period(rows, opts);
    sort_and_dedup(&mut rows);

    debug!(
        concept,
        candidates = total,
        periods = rows.len(),
        "Stitched series"
    );
    StitchedSeries::from_rows(concept, rows)
}

/// Stitches a catalog concept.
///
/// # Errors
/// Returns [`XbrlError::UnknownConcept`](xbrl_core::XbrlError::UnknownConcept)
/// if `key` is not in the catalog.
pub fn stitch_concept(
    catalog: &TagCatalog,
    facts: &FactSet,
    key: &str,
    opts: &StitchOptions,
) -> Result<StitchedSeries> {
    let mapping = catalog.get(key)?;
    Ok(stitch(&mapping.key, facts, &mapping.tags, opts))
}

/// Stitches several catalog concepts out of one fact set.
///
/// Every key is checked before any stitching happens.
///
/// # Errors
/// Returns [`XbrlError::UnknownConcept`](xbrl_core::XbrlError::UnknownConcept)
/// for the first unknown key.
pub fn stitch_many<S: AsRef<str>>(
    catalog: &TagCatalog,
    facts: &FactSet,
    keys: &[S],
    opts: &StitchOptions,
) -> Result<BTreeMap<String, StitchedSeries>> {
    let mappings = keys
        .iter()
        .map(|key| catalog.get(key.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(mappings
        .into_iter()
        .map(|mapping| {
            (
                mapping.key.clone(),
                stitch(&mapping.key, facts, &mapping.tags, opts),
            )
        })
        .collect())
}

/// Steps 1-3: gather and classify candidate rows, tag by tag.
fn collect_rows<S: AsRef<str>>(facts: &FactSet, tags: &[S], opts: &StitchOptions) -> Vec<StitchedRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    let ranked = tags
        .iter()
        .map(|tag| tag.as_ref())
        .filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .enumerate();

    for (rank, tag) in ranked {
        let Some(units) = opts
            .taxonomies
            .iter()
            .find_map(|taxonomy| facts.units(taxonomy, tag))
        else {
            trace!(tag, "Tag not reported");
            continue;
        };

        let Some(values) = opts
            .units
            .iter()
            .find_map(|unit| units.get(unit).filter(|values| !values.is_empty()))
        else {
            trace!(tag, "Tag has no facts in a preferred unit");
            continue;
        };

        trace!(tag, rank, count = values.len(), "Collected facts");
        rows.extend(values.iter().map(|fact| StitchedRow {
            period: classify(fact),
            fact: fact.clone(),
            rank,
        }));
    }

    rows
}

/// Step 4: period filter with the opt-in fallback.
fn filter_period(rows: Vec<StitchedRow>, opts: &StitchOptions) -> Vec<StitchedRow> {
    let Some(period) = opts.period else {
        return rows;
    };

    let (matching, rest): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|row| row.period.matches(period));

    if matching.is_empty() && opts.fallback_to_unfiltered && !rest.is_empty() {
        debug!(%period, rows = rest.len(), "No rows matched period filter, falling back to unfiltered");
        return rest;
    }

    matching
}

/// Steps 5-6: dedup on period end, then most recent first.
fn sort_and_dedup(rows: &mut Vec<StitchedRow>) {
    rows.sort_by(|a, b| {
        a.fact
            .end
            .cmp(&b.fact.end)
            .then(a.rank.cmp(&b.rank))
            // Missing filing dates sort as oldest
            .then(b.fact.filed.cmp(&a.fact.filed))
    });
    rows.dedup_by_key(|row| row.fact.end);
    rows.reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use xbrl_core::XbrlError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quarter(tag: &str, end: NaiveDate, value: f64, filed: NaiveDate) -> Fact {
        let start = end - chrono::Duration::days(90);
        Fact::new(tag, "USD", end, value)
            .with_start(start)
            .with_form("10-Q")
            .with_filed(filed)
    }

    fn year(tag: &str, end: NaiveDate, value: f64, filed: NaiveDate) -> Fact {
        let start = end - chrono::Duration::days(364);
        Fact::new(tag, "USD", end, value)
            .with_start(start)
            .with_form("10-K")
            .with_filed(filed)
    }

    fn revenue_tags() -> Vec<&'static str> {
        vec!["Revenues", "SalesRevenueNet"]
    }

    #[test]
    fn test_priority_example() {
        let facts = FactSet::new()
            .with_fact(
                "us-gaap",
                Fact::new("Revenues", "USD", date(2024, 3, 31), 100.0)
                    .with_start(date(2024, 1, 1))
                    .with_form("10-Q")
                    .with_filed(date(2024, 4, 20)),
            )
            .with_fact(
                "us-gaap",
                Fact::new("SalesRevenueNet", "USD", date(2024, 3, 31), 95.0)
                    .with_start(date(2024, 1, 1))
                    .with_form("10-Q")
                    .with_filed(date(2024, 4, 18)),
            );

        let series = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::default());

        assert_eq!(series.len(), 1);
        let row = series.get(date(2024, 3, 31)).unwrap();
        assert_eq!(row.fact.value, 100.0);
        assert_eq!(row.fact.tag, "Revenues");
        assert_eq!(row.rank, 0);
    }

    #[test]
    fn test_priority_beats_recency() {
        // The lower-priority tag was filed later; it must still lose.
        let end = date(2024, 3, 31);
        let facts = FactSet::new()
            .with_fact("us-gaap", quarter("Revenues", end, 100.0, date(2024, 4, 20)))
            .with_fact("us-gaap", quarter("SalesRevenueNet", end, 95.0, date(2024, 9, 1)));

        let series = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::quarterly());
        assert_eq!(series.len(), 1);
        assert_eq!(series.rows()[0].fact.value, 100.0);
    }

    #[test]
    fn test_recency_tie_break() {
        let end = date(2024, 3, 31);
        let facts = FactSet::new()
            .with_fact("us-gaap", quarter("Revenues", end, 98.0, date(2024, 4, 10)))
            .with_fact("us-gaap", quarter("Revenues", end, 100.0, date(2024, 4, 20)));

        let series = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series.rows()[0].fact.value, 100.0);
        assert_eq!(series.rows()[0].fact.filed, Some(date(2024, 4, 20)));
    }

    #[test]
    fn test_missing_filed_date_loses_tie() {
        let end = date(2024, 3, 31);
        let mut undated = quarter("Revenues", end, 1.0, date(2024, 4, 10));
        undated.filed = None;
        let facts = FactSet::new()
            .with_fact("us-gaap", undated)
            .with_fact("us-gaap", quarter("Revenues", end, 2.0, date(2024, 4, 10)));

        let series = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::default());
        assert_eq!(series.rows()[0].fact.value, 2.0);
    }

    #[test]
    fn test_one_row_per_period_end_sorted_descending() {
        let mut facts = FactSet::new();
        let ends = [date(2023, 3, 31), date(2023, 6, 30), date(2023, 9, 30), date(2023, 12, 31)];
        for (i, end) in ends.iter().enumerate() {
            // Restated in a later filing, and again under the older tag
            facts.insert("us-gaap", quarter("Revenues", *end, i as f64, date(2024, 1, 1)));
            facts.insert("us-gaap", quarter("Revenues", *end, i as f64 + 0.5, date(2024, 6, 1)));
            facts.insert("us-gaap", quarter("SalesRevenueNet", *end, -1.0, date(2025, 1, 1)));
        }

        let series = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::quarterly());

        assert_eq!(series.len(), ends.len());
        let mut seen = HashSet::new();
        for row in &series {
            assert!(seen.insert(row.fact.end), "duplicate period end {}", row.fact.end);
            assert_eq!(row.fact.tag, "Revenues");
            assert_eq!(row.fact.filed, Some(date(2024, 6, 1)));
        }
        let returned: Vec<_> = series.iter().map(|r| r.fact.end).collect();
        let mut expected = ends.to_vec();
        expected.reverse();
        assert_eq!(returned, expected);
        assert_eq!(series.date_range(), Some((date(2023, 3, 31), date(2023, 12, 31))));
    }

    #[test]
    fn test_stitches_across_tag_eras() {
        // Older periods only exist under the older tag.
        let facts = FactSet::new()
            .with_fact("us-gaap", year("SalesRevenueNet", date(2016, 12, 31), 10.0, date(2017, 2, 1)))
            .with_fact("us-gaap", year("SalesRevenueNet", date(2017, 12, 31), 20.0, date(2018, 2, 1)))
            .with_fact("us-gaap", year("Revenues", date(2018, 12, 31), 30.0, date(2019, 2, 1)));

        let series = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::annual());
        let tags: Vec<_> = series.iter().map(|r| r.fact.tag.as_str()).collect();
        assert_eq!(tags, vec!["Revenues", "SalesRevenueNet", "SalesRevenueNet"]);
    }

    #[test]
    fn test_period_filter_excludes_unclassified() {
        let end = date(2024, 6, 30);
        let half_year = Fact::new("Revenues", "USD", end, 50.0)
            .with_start(end - chrono::Duration::days(200))
            .with_form("10-Q");
        let facts = FactSet::new().with_fact("us-gaap", half_year);

        assert!(stitch("revenue", &facts, &revenue_tags(), &StitchOptions::quarterly()).is_empty());
        assert!(stitch("revenue", &facts, &revenue_tags(), &StitchOptions::annual()).is_empty());

        // Unfiltered view keeps it
        let all = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::default());
        assert_eq!(all.len(), 1);
        assert_eq!(all.rows()[0].period, PeriodClass::Unclassified);
    }

    #[test]
    fn test_fallback_is_opt_in() {
        let facts = FactSet::new()
            .with_fact("us-gaap", year("Revenues", date(2023, 12, 31), 400.0, date(2024, 2, 1)));

        let strict = stitch("revenue", &facts, &revenue_tags(), &StitchOptions::quarterly());
        assert!(strict.is_empty());

        let lenient = stitch(
            "revenue",
            &facts,
            &revenue_tags(),
            &StitchOptions::quarterly().with_fallback(true),
        );
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient.rows()[0].period, PeriodClass::Annual);
    }

    #[test]
    fn test_instant_facts_classified_by_form() {
        let facts = FactSet::new()
            .with_fact(
                "us-gaap",
                Fact::new("Assets", "USD", date(2023, 12, 31), 9.0).with_form("10-K"),
            )
            .with_fact(
                "us-gaap",
                Fact::new("Assets", "USD", date(2024, 3, 31), 10.0).with_form("10-Q"),
            );

        let annual = stitch("total_assets", &facts, &["Assets"], &StitchOptions::annual());
        assert_eq!(annual.len(), 1);
        assert_eq!(annual.rows()[0].fact.value, 9.0);

        let quarterly = stitch("total_assets", &facts, &["Assets"], &StitchOptions::quarterly());
        assert_eq!(quarterly.len(), 1);
        assert_eq!(quarterly.rows()[0].fact.value, 10.0);
    }

    #[test]
    fn test_units_never_merged() {
        let end = date(2024, 3, 31);
        let start = date(2024, 1, 1);
        let facts = FactSet::new()
            .with_fact(
                "us-gaap",
                Fact::new("EarningsPerShareBasic", "USD/shares", end, 0.5).with_start(start),
            )
            .with_fact(
                "us-gaap",
                Fact::new("EarningsPerShareBasic", "shares", date(2023, 12, 31), 1e9)
                    .with_start(date(2023, 10, 1)),
            );

        let series = stitch(
            "eps_basic",
            &facts,
            &["EarningsPerShareBasic"],
            &StitchOptions::default(),
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.rows()[0].fact.unit, "USD/shares");
    }

    #[test]
    fn test_unit_preference_is_configurable() {
        let end = date(2024, 3, 31);
        let facts = FactSet::new()
            .with_fact("us-gaap", Fact::new("Revenues", "CAD", end, 130.0))
            .with_fact("us-gaap", Fact::new("Revenues", "USD", end, 100.0));

        let usd = stitch("revenue", &facts, &["Revenues"], &StitchOptions::default());
        assert_eq!(usd.rows()[0].fact.value, 100.0);

        let cad = stitch(
            "revenue",
            &facts,
            &["Revenues"],
            &StitchOptions::default().with_units(["CAD"]),
        );
        assert_eq!(cad.rows()[0].fact.value, 130.0);
    }

    #[test]
    fn test_taxonomy_preference() {
        let end = date(2024, 3, 31);
        let facts = FactSet::new()
            .with_fact("ifrs-full", Fact::new("Revenue", "USD", end, 7.0));

        let series = stitch("revenue", &facts, &["Revenue"], &StitchOptions::default());
        assert_eq!(series.len(), 1);

        let gaap_only = StitchOptions::default().with_taxonomies(["us-gaap"]);
        assert!(stitch("revenue", &facts, &["Revenue"], &gaap_only).is_empty());
    }

    #[test]
    fn test_empty_is_not_error() {
        let catalog = TagCatalog::standard();
        let facts = FactSet::new()
            .with_fact("us-gaap", Fact::new("Assets", "USD", date(2024, 3, 31), 1.0));

        let series = stitch_concept(&catalog, &facts, "revenue", &StitchOptions::quarterly()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.concept, "revenue");
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn test_unknown_concept() {
        let catalog = TagCatalog::standard();
        let result = stitch_concept(&catalog, &FactSet::new(), "gmv", &StitchOptions::default());
        assert!(matches!(result, Err(XbrlError::UnknownConcept(_))));
    }

    #[test]
    fn test_stitch_many_checks_keys_first() {
        let catalog = TagCatalog::standard();
        let facts = FactSet::new()
            .with_fact("us-gaap", quarter("Revenues", date(2024, 3, 31), 1.0, date(2024, 5, 1)))
            .with_fact("us-gaap", quarter("NetIncomeLoss", date(2024, 3, 31), 0.1, date(2024, 5, 1)));

        let all = stitch_many(&catalog, &facts, &["revenue", "net_income", "capex"], &StitchOptions::quarterly())
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all["revenue"].len(), 1);
        assert_eq!(all["net_income"].len(), 1);
        assert!(all["capex"].is_empty());

        assert!(matches!(
            stitch_many(&catalog, &facts, &["revenue", "gmv"], &StitchOptions::quarterly()),
            Err(XbrlError::UnknownConcept(_))
        ));
    }

    #[test]
    fn test_duplicate_and_empty_tags_ignored() {
        let end = date(2024, 3, 31);
        let facts = FactSet::new()
            .with_fact("us-gaap", quarter("SalesRevenueNet", end, 95.0, date(2024, 4, 18)));

        let series = stitch(
            "revenue",
            &facts,
            &["", "Revenues", "Revenues", "SalesRevenueNet"],
            &StitchOptions::default(),
        );
        assert_eq!(series.rows()[0].rank, 1);
    }

    #[test]
    fn test_truncated() {
        let mut facts = FactSet::new();
        for m in [3, 6, 9, 12] {
            let end = NaiveDate::from_ymd_opt(2023, m, if m == 6 || m == 9 { 30 } else { 31 }).unwrap();
            facts.insert("us-gaap", quarter("Revenues", end, f64::from(m), date(2024, 1, 1)));
        }
        let series = stitch("revenue", &facts, &["Revenues"], &StitchOptions::default()).truncated(2);
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().fact.value, 12.0);
    }
}
