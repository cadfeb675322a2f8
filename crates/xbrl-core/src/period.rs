//! Period type definitions.
//!
//! [`PeriodType`] is what a caller asks for; [`PeriodClass`] is what a single
//! fact turns out to be once classified, which may be neither.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting period requested by a caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    /// Quarterly reporting period.
    #[default]
    Quarterly,
    /// Annual reporting period.
    Annual,
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quarterly => f.write_str("quarterly"),
            Self::Annual => f.write_str("annual"),
        }
    }
}

/// Classification of a single fact's reporting period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodClass {
    /// Span under 120 days, or a quarterly-report form without a start date.
    Quarterly,
    /// Span over 300 days, or an annual-report form without a start date.
    Annual,
    /// Partial or transition period; excluded from period-filtered views.
    Unclassified,
}

impl PeriodClass {
    /// Returns true if this class satisfies the requested period type.
    #[must_use]
    pub const fn matches(&self, period: PeriodType) -> bool {
        matches!(
            (self, period),
            (Self::Quarterly, PeriodType::Quarterly) | (Self::Annual, PeriodType::Annual)
        )
    }

    /// Returns the class as a lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
            Self::Unclassified => "unclassified",
        }
    }
}

impl From<PeriodType> for PeriodClass {
    fn from(period: PeriodType) -> Self {
        match period {
            PeriodType::Quarterly => Self::Quarterly,
            PeriodType::Annual => Self::Annual,
        }
    }
}

impl fmt::Display for PeriodClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
