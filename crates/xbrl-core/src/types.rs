//! Core data types for XBRL facts.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Ticker`] - Trading symbol used to look up a company
//! - [`Cik`] - SEC Central Index Key, zero-padded to 10 digits
//! - [`StatementCategory`] - Financial statement a concept belongs to
//! - [`ConceptMapping`] - Concept key to ordered candidate tags
//! - [`Fact`] - One reported observation
//! - [`FactSet`] - All facts for one company, keyed taxonomy -> tag -> unit

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, XbrlError};

/// A trading symbol/ticker.
///
/// Tickers are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key, always 10 digits, zero-padded.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cik(String);

impl Cik {
    /// Length of a normalized CIK.
    pub const WIDTH: usize = 10;

    /// Normalizes a raw identifier into a 10-digit CIK.
    ///
    /// Accepts surrounding whitespace and an optional `CIK` prefix
    /// (`"CIK0001594805"`, `"1594805"`, `" 320193 "`).
    ///
    /// # Errors
    /// Returns [`XbrlError::InvalidParameter`] if the identifier is empty,
    /// contains non-digits, or is longer than 10 digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("CIK")
            .or_else(|| trimmed.strip_prefix("cik"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(XbrlError::InvalidParameter("Empty CIK".to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(XbrlError::InvalidParameter(format!(
                "CIK must be numeric: {raw}"
            )));
        }
        if digits.len() > Self::WIDTH {
            return Err(XbrlError::InvalidParameter(format!(
                "CIK longer than {} digits: {raw}",
                Self::WIDTH
            )));
        }

        Ok(Self(format!("{digits:0>10}")))
    }

    /// Builds a CIK from the integer form the SEC ticker directory uses.
    #[must_use]
    pub fn from_number(n: u64) -> Self {
        Self(format!("{n:010}"))
    }

    /// Returns the zero-padded CIK.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cik {
    type Err = XbrlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Financial statement a concept is reported on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementCategory {
    /// Income statement (flows over a period).
    IncomeStatement,
    /// Balance sheet (point-in-time positions).
    BalanceSheet,
    /// Cash flow statement.
    CashFlow,
}

impl fmt::Display for StatementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncomeStatement => f.write_str("income_statement"),
            Self::BalanceSheet => f.write_str("balance_sheet"),
            Self::CashFlow => f.write_str("cash_flow"),
        }
    }
}

/// Maps a human-meaningful concept to the XBRL tags filings have used for it.
///
/// Tags are ordered most-authoritative first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMapping {
    /// Catalog key (e.g., "revenue").
    pub key: String,
    /// Display name (e.g., "Revenue").
    pub display_name: String,
    /// What the concept means.
    pub description: String,
    /// Candidate tags in priority order.
    pub tags: Vec<String>,
    /// Statement the concept appears on.
    pub statement: StatementCategory,
}

impl ConceptMapping {
    /// Creates a new concept mapping.
    #[must_use]
    pub fn new<I, S>(
        key: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        statement: StatementCategory,
        tags: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            statement,
        }
    }

    /// Returns the most authoritative tag, if any.
    #[must_use]
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// One reported observation for a tag over a period, attached to a filing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// End date of the period.
    pub end: NaiveDate,
    /// Start date of the period (None for instant facts).
    pub start: Option<NaiveDate>,
    /// Reported value.
    pub value: f64,
    /// Filing form type (e.g., "10-Q").
    pub form: Option<String>,
    /// Date the filing was made.
    pub filed: Option<NaiveDate>,
    /// Fiscal year of the filing.
    pub fiscal_year: Option<i32>,
    /// Fiscal period label (e.g., "Q1", "FY").
    pub fiscal_period: Option<String>,
    /// XBRL tag the value was reported under.
    pub tag: String,
    /// Unit of measure (e.g., "USD").
    pub unit: String,
    /// Filing accession number.
    pub accession: Option<String>,
}

impl Fact {
    /// Creates a fact with only the required fields.
    #[must_use]
    pub fn new(tag: impl Into<String>, unit: impl Into<String>, end: NaiveDate, value: f64) -> Self {
        Self {
            end,
            start: None,
            value,
            form: None,
            filed: None,
            fiscal_year: None,
            fiscal_period: None,
            tag: tag.into(),
            unit: unit.into(),
            accession: None,
        }
    }

    /// Sets the period start date.
    #[must_use]
    pub const fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the form type.
    #[must_use]
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Sets the filing date.
    #[must_use]
    pub const fn with_filed(mut self, filed: NaiveDate) -> Self {
        self.filed = Some(filed);
        self
    }

    /// Sets the fiscal year and period label.
    #[must_use]
    pub fn with_fiscal(mut self, year: i32, period: impl Into<String>) -> Self {
        self.fiscal_year = Some(year);
        self.fiscal_period = Some(period.into());
        self
    }

    /// Sets the accession number.
    #[must_use]
    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = Some(accession.into());
        self
    }

    /// Returns the period length in days if this is a duration fact.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.start
            .map(|start| self.end.signed_duration_since(start).num_days())
    }
}

/// Units for one tag, each holding its observations.
pub type UnitFacts = BTreeMap<String, Vec<Fact>>;

/// Every fact reported by one company.
///
/// Keyed taxonomy (e.g., "us-gaap") -> tag -> unit -> facts. Built fresh per
/// fetch and never mutated after construction by the fetcher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    /// Company CIK, if known.
    pub cik: Option<Cik>,
    /// Registrant name, if known.
    pub entity_name: Option<String>,
    facts: BTreeMap<String, BTreeMap<String, UnitFacts>>,
}

impl FactSet {
    /// Creates an empty fact set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the company CIK.
    #[must_use]
    pub fn with_cik(mut self, cik: Cik) -> Self {
        self.cik = Some(cik);
        self
    }

    /// Sets the registrant name.
    #[must_use]
    pub fn with_entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Adds a fact under `taxonomy`, filed by its own tag and unit.
    pub fn insert(&mut self, taxonomy: impl Into<String>, fact: Fact) {
        self.facts
            .entry(taxonomy.into())
            .or_default()
            .entry(fact.tag.clone())
            .or_default()
            .entry(fact.unit.clone())
            .or_default()
            .push(fact);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_fact(mut self, taxonomy: impl Into<String>, fact: Fact) -> Self {
        self.insert(taxonomy, fact);
        self
    }

    /// Returns the units reported for a tag in a taxonomy.
    #[must_use]
    pub fn units(&self, taxonomy: &str, tag: &str) -> Option<&UnitFacts> {
        self.facts.get(taxonomy)?.get(tag)
    }

    /// Returns true if the taxonomy carries the tag.
    #[must_use]
    pub fn contains_tag(&self, taxonomy: &str, tag: &str) -> bool {
        self.units(taxonomy, tag).is_some()
    }

    /// Iterates over taxonomy names.
    pub fn taxonomies(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    /// Iterates over (tag, units) pairs in a taxonomy.
    pub fn tags<'a>(&'a self, taxonomy: &str) -> impl Iterator<Item = (&'a str, &'a UnitFacts)> {
        self.facts
            .get(taxonomy)
            .into_iter()
            .flat_map(|tags| tags.iter().map(|(tag, units)| (tag.as_str(), units)))
    }

    /// Returns the total number of facts across all taxonomies.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Returns true if no facts are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fact_count() == 0
    }
}
