#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Stitched XBRL time series from SEC filings.
//!
//! This crate re-exports the core types, the cache implementations, the
//! stitcher and the EDGAR client, and provides a [`FactsPipeline`] that
//! resolves a ticker, fetches its facts once and stitches any number of
//! concepts from them.
//!
//! # Features
//!
//! - `edgar` (default) - SEC EDGAR fact source
//!
//! # Example
//!
//! ```rust,ignore
//! use xbrl::{FactsPipeline, StitchOptions, Ticker};
//!
//! #[tokio::main]
//! async fn main() -> xbrl::Result<()> {
//!     let pipeline = FactsPipeline::from_env()?;
//!
//!     let revenue = pipeline
//!         .fetch_series(&Ticker::new("SHOP"), "revenue", &StitchOptions::quarterly())
//!         .await?;
//!     println!("{:?}", revenue.to_dataframe()?);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use xbrl_core::*;

// Cache implementations
pub use xbrl_cache::{InMemoryCache, NoopCache};

// Stitching
pub use xbrl_stitch::{
    ANNUAL_MIN_DAYS, CatalogOverride, QUARTERLY_MAX_DAYS, StitchOptions, StitchedRow,
    StitchedSeries, TagCatalog, TagCoverage, classify, discover_tags, financials_table,
    free_cash_flow, overrides, stitch, stitch_concept, stitch_many, write_csv, write_json,
};

// Providers
#[cfg(feature = "edgar")]
pub use xbrl_edgar::{EdgarClient, EdgarConfig};

mod pipeline;
pub use pipeline::{BatchResult, FactsPipeline};

mod retry;
pub use retry::RetryPolicy;
