#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Tag catalog, period classifier and tag-priority stitcher.
//!
//! Everything here is pure: it works on an already-fetched
//! [`FactSet`](xbrl_core::FactSet) and never touches the network.

/// Concept catalog and overrides.
pub mod catalog;
/// Period classification by span and form.
pub mod classify;
/// Concepts derived from stitched series.
pub mod derive;
/// Tag discovery.
pub mod discover;
/// Bundled company overrides.
pub mod overrides;
/// The stitcher.
pub mod stitcher;
/// DataFrame views and CSV/JSON export.
pub mod table;

pub use catalog::{CatalogOverride, TagCatalog};
pub use classify::{ANNUAL_MIN_DAYS, QUARTERLY_MAX_DAYS, classify};
pub use derive::free_cash_flow;
pub use discover::{TagCoverage, discover_tags};
pub use stitcher::{StitchOptions, StitchedRow, StitchedSeries, stitch, stitch_concept, stitch_many};
pub use table::{financials_table, write_csv, write_json};
