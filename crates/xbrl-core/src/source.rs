//! Fact source trait.
//!
//! [`FactSource`] is the seam between the stitching pipeline and whatever
//! retrieves raw company facts: the SEC EDGAR client in production, static
//! fixtures in tests.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Cik, FactSet, Ticker},
};

/// Source of raw XBRL company facts.
///
/// Implementations make no concurrency assumption and perform no retries;
/// retryable conditions are surfaced as
/// [`XbrlError::RateLimited`](crate::XbrlError::RateLimited) or
/// [`XbrlError::TransientNetwork`](crate::XbrlError::TransientNetwork).
#[async_trait]
pub trait FactSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Resolves a ticker to a company CIK.
    ///
    /// Matching is exact and case-insensitive. Fails with
    /// [`XbrlError::NotFound`](crate::XbrlError::NotFound) when the ticker is absent.
    async fn resolve_cik(&self, ticker: &Ticker) -> Result<Cik>;

    /// Fetches every reported fact for one company.
    ///
    /// Performs exactly one outbound request per call.
    async fn fetch_facts(&self, cik: &Cik) -> Result<FactSet>;
}
