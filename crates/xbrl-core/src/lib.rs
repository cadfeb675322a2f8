#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for XBRL fact stitching.
//!
//! This crate provides the foundational abstractions shared by the fetcher,
//! the cache and the stitcher:
//!
//! - [`FactSource`](source::FactSource) - Retrieves raw company facts
//! - [`FactCache`](cache::FactCache) - Per-process caching abstraction
//! - [`FactSet`](types::FactSet) / [`Fact`](types::Fact) - Reported observations
//! - [`ConceptMapping`](types::ConceptMapping) - Concept to candidate tags
//! - [`XbrlError`](error::XbrlError) - Error taxonomy

/// Cache trait for fetched fact sets.
pub mod cache;
/// Error types for fetch and stitch operations.
pub mod error;
/// Period type and period classification definitions.
pub mod period;
/// Fact source trait.
pub mod source;
/// Core data types (Ticker, Cik, Fact, FactSet, ...).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::FactCache;
pub use error::{Result, XbrlError};
pub use period::{PeriodClass, PeriodType};
pub use source::FactSource;
pub use types::{Cik, ConceptMapping, Fact, FactSet, StatementCategory, Ticker, UnitFacts};
