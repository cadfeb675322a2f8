#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Per-process caches for fetched XBRL fact sets.
//!
//! This crate provides implementations of the [`FactCache`] trait from `xbrl-core`:
//!
//! - [`InMemoryCache`] - Keeps fact sets for the lifetime of the process
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use xbrl_core::FactCache;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;
