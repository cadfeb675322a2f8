//! Tag discovery.
//!
//! Lists which tags a company actually reported, so a missing concept can be
//! traced to a tag that is absent from the catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use xbrl_core::{FactSet, PeriodClass};

use crate::classify::classify;

/// Coverage of one tag under one unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCoverage {
    /// Taxonomy the tag lives in.
    pub taxonomy: String,
    /// XBRL tag name.
    pub tag: String,
    /// Unit of measure.
    pub unit: String,
    /// Number of facts.
    pub count: usize,
    /// Earliest period end.
    pub earliest: NaiveDate,
    /// Latest period end.
    pub latest: NaiveDate,
    /// Whether any fact spans a quarter.
    pub has_quarterly: bool,
    /// Whether any fact spans a year.
    pub has_annual: bool,
}

/// Finds tags whose name contains any of `terms`, case-insensitively.
///
/// An empty term list matches every tag. Results are ordered by earliest
/// period end, then taxonomy, tag and unit.
pub fn discover_tags<S: AsRef<str>>(facts: &FactSet, terms: &[S]) -> Vec<TagCoverage> {
    let terms: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut found = Vec::new();
    for taxonomy in facts.taxonomies() {
        for (tag, units) in facts.tags(taxonomy) {
            let lower = tag.to_ascii_lowercase();
            if !terms.is_empty() && !terms.iter().any(|term| lower.contains(term.as_str())) {
                continue;
            }

            for (unit, values) in units {
                let Some(earliest) = values.iter().map(|f| f.end).min() else {
                    continue;
                };
                let latest = values.iter().map(|f| f.end).max().unwrap_or(earliest);
                let classes: Vec<PeriodClass> = values.iter().map(classify).collect();

                found.push(TagCoverage {
                    taxonomy: taxonomy.to_string(),
                    tag: tag.to_string(),
                    unit: unit.clone(),
                    count: values.len(),
                    earliest,
                    latest,
                    has_quarterly: classes.contains(&PeriodClass::Quarterly),
                    has_annual: classes.contains(&PeriodClass::Annual),
                });
            }
        }
    }

    found.sort_by(|a, b| {
        a.earliest
            .cmp(&b.earliest)
            .then_with(|| a.taxonomy.cmp(&b.taxonomy))
            .then_with(|| a.tag.cmp(&b.tag))
            .then_with(|| a.unit.cmp(&b.unit))
    });
    found
}
