//! Cache trait for fetched fact sets.
//!
//! This module defines the [`FactCache`] trait used to avoid fetching the same
//! company twice within one process run. Nothing is persisted across runs.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::Result,
    types::{Cik, FactSet, Ticker},
};

/// Trait for caching fetched fact sets and ticker resolutions.
#[async_trait]
pub trait FactCache: Send + Sync {
    /// Retrieves a cached fact set for a company.
    ///
    /// Returns `Ok(Some(facts))` if cached, `Ok(None)` if not cached.
    async fn get_facts(&self, source: &str, cik: &Cik) -> Result<Option<Arc<FactSet>>>;

    /// Stores a fact set in the cache.
    async fn put_facts(&self, source: &str, cik: &Cik, facts: Arc<FactSet>) -> Result<()>;

    /// Retrieves a cached ticker resolution.
    async fn get_cik(&self, source: &str, ticker: &Ticker) -> Result<Option<Cik>>;

    /// Stores a ticker resolution.
    async fn put_cik(&self, source: &str, ticker: &Ticker, cik: &Cik) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
