//! Fetch-then-stitch pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, instrument, warn};

use xbrl_cache::InMemoryCache;
use xbrl_core::{Cik, FactCache, FactSet, FactSource, Result, Ticker, XbrlError};
use xbrl_stitch::{
    CatalogOverride, StitchOptions, StitchedSeries, TagCatalog, financials_table, stitch,
    stitch_many,
};

use crate::retry::RetryPolicy;

/// Outcome of a multi-company fetch.
///
/// Failed companies are logged and collected rather than aborting the batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Stitched series per ticker, in request order.
    pub series: Vec<(Ticker, StitchedSeries)>,
    /// Tickers that failed, with their error.
    pub failures: Vec<(Ticker, XbrlError)>,
}

impl BatchResult {
    /// Returns true if every ticker succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolves companies, fetches their facts once, and stitches concepts.
///
/// Unknown concept keys are rejected before any upstream call. Fact sets and
/// ticker resolutions go through the configured cache (in-memory by default),
/// so stitching several concepts for one company costs one fetch. Upstream
/// calls are wrapped in the [`RetryPolicy`].
///
/// # Example
///
/// ```rust,ignore
/// use xbrl::{FactsPipeline, StitchOptions, Ticker};
///
/// let pipeline = FactsPipeline::with_edgar("MyApp/1.0 (contact@example.com)")?;
/// let revenue = pipeline
///     .fetch_series(&Ticker::new("SHOP"), "revenue", &StitchOptions::quarterly())
///     .await?;
/// ```
pub struct FactsPipeline {
    source: Arc<dyn FactSource>,
    cache: Arc<dyn FactCache>,
    catalog: TagCatalog,
    retry: RetryPolicy,
}

impl std::fmt::Debug for FactsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactsPipeline")
            .field("source", &self.source.name())
            .field("concepts", &self.catalog.len())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl FactsPipeline {
    /// Create a pipeline over `source` with the standard catalog, an
    /// in-memory cache and the default retry policy.
    #[must_use]
    pub fn new(source: Arc<dyn FactSource>) -> Self {
        Self {
            source,
            cache: Arc::new(InMemoryCache::new()),
            catalog: TagCatalog::standard(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a pipeline backed by SEC EDGAR.
    ///
    /// # Errors
    /// Returns an error if the user agent is empty or the HTTP client cannot
    /// be built.
    #[cfg(feature = "edgar")]
    pub fn with_edgar(user_agent: &str) -> Result<Self> {
        let client = xbrl_edgar::EdgarClient::new(user_agent)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Create a pipeline backed by SEC EDGAR, with the user agent taken from
    /// `SEC_USER_AGENT`.
    ///
    /// # Errors
    /// Returns an error if the variable is unset or blank.
    #[cfg(feature = "edgar")]
    pub fn from_env() -> Result<Self> {
        let config = xbrl_edgar::EdgarConfig::from_env()?;
        let client = xbrl_edgar::EdgarClient::from_config(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Replace the cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn FactCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: TagCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Apply company-specific overrides on top of the current catalog.
    ///
    /// # Errors
    /// Returns [`XbrlError::UnknownConcept`] if an override targets a key the
    /// catalog does not have.
    pub fn with_overrides(mut self, overrides: &CatalogOverride) -> Result<Self> {
        self.catalog = self.catalog.with_overrides(overrides)?;
        Ok(self)
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the active catalog.
    #[must_use]
    pub const fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    /// Returns the upstream source name.
    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Resolve a ticker to its CIK, checking the cache first.
    #[instrument(skip(self), fields(source = self.source.name(), ticker = %ticker))]
    pub async fn resolve(&self, ticker: &Ticker) -> Result<Cik> {
        if ticker.as_str().is_empty() {
            return Err(XbrlError::InvalidParameter("Empty ticker".to_string()));
        }

        let source = self.source.name();
        match self.cache.get_cik(source, ticker).await {
            Ok(Some(cik)) => return Ok(cik),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read CIK from cache"),
        }

        let cik = self
            .retry
            .run("resolve_cik", || self.source.resolve_cik(ticker))
            .await?;

        if let Err(e) = self.cache.put_cik(source, ticker, &cik).await {
            warn!(error = %e, "Failed to cache CIK");
        }
        debug!(cik = %cik, "Resolved ticker");
        Ok(cik)
    }

    /// Fetch a company's facts by CIK, checking the cache first.
    #[instrument(skip(self), fields(source = self.source.name(), cik = %cik))]
    pub async fn facts(&self, cik: &Cik) -> Result<Arc<FactSet>> {
        let source = self.source.name();
        match self.cache.get_facts(source, cik).await {
            Ok(Some(facts)) => return Ok(facts),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read facts from cache"),
        }

        let facts = Arc::new(
            self.retry
                .run("fetch_facts", || self.source.fetch_facts(cik))
                .await?,
        );

        if let Err(e) = self.cache.put_facts(source, cik, Arc::clone(&facts)).await {
            warn!(error = %e, "Failed to cache facts");
        }
        debug!(count = facts.fact_count(), "Fetched company facts");
        Ok(facts)
    }

    /// Fetch a company's facts by ticker.
    pub async fn facts_for_ticker(&self, ticker: &Ticker) -> Result<Arc<FactSet>> {
        let cik = self.resolve(ticker).await?;
        self.facts(&cik).await
    }

    /// Stitch one catalog concept for a ticker.
    ///
    /// # Errors
    /// Fails with [`XbrlError::UnknownConcept`] before any upstream call if
    /// `key` is not in the catalog; otherwise propagates fetch errors.
    #[instrument(skip(self, opts), fields(ticker = %ticker, concept = key))]
    pub async fn fetch_series(
        &self,
        ticker: &Ticker,
        key: &str,
        opts: &StitchOptions,
    ) -> Result<StitchedSeries> {
        let mapping = self.catalog.get(key)?;
        let facts = self.facts_for_ticker(ticker).await?;
        Ok(stitch(&mapping.key, &facts, &mapping.tags, opts))
    }

    /// Stitch one catalog concept for a CIK.
    ///
    /// # Errors
    /// Same as [`fetch_series`](Self::fetch_series).
    pub async fn fetch_series_by_cik(
        &self,
        cik: &Cik,
        key: &str,
        opts: &StitchOptions,
    ) -> Result<StitchedSeries> {
        let mapping = self.catalog.get(key)?;
        let facts = self.facts(cik).await?;
        Ok(stitch(&mapping.key, &facts, &mapping.tags, opts))
    }

    /// Stitch an explicit tag list for a ticker, bypassing the catalog.
    pub async fn fetch_tags<S: AsRef<str>>(
        &self,
        ticker: &Ticker,
        concept: &str,
        tags: &[S],
        opts: &StitchOptions,
    ) -> Result<StitchedSeries> {
        let facts = self.facts_for_ticker(ticker).await?;
        Ok(stitch(concept, &facts, tags, opts))
    }

    /// Stitch several concepts for a ticker out of one fetch.
    ///
    /// # Errors
    /// Fails with [`XbrlError::UnknownConcept`] before any upstream call if
    /// any key is unknown.
    #[instrument(skip(self, keys, opts), fields(ticker = %ticker, concepts = keys.len()))]
    pub async fn fetch_many<S: AsRef<str> + Sync>(
        &self,
        ticker: &Ticker,
        keys: &[S],
        opts: &StitchOptions,
    ) -> Result<BTreeMap<String, StitchedSeries>> {
        for key in keys {
            self.catalog.get(key.as_ref())?;
        }
        let facts = self.facts_for_ticker(ticker).await?;
        stitch_many(&self.catalog, &facts, keys, opts)
    }

    /// Stitch several concepts for a ticker into one wide DataFrame.
    ///
    /// # Errors
    /// As [`fetch_many`](Self::fetch_many), plus [`XbrlError::Export`] if the
    /// frame cannot be assembled.
    pub async fn fetch_financials<S: AsRef<str> + Sync>(
        &self,
        ticker: &Ticker,
        keys: &[S],
        opts: &StitchOptions,
    ) -> Result<DataFrame> {
        let series = self.fetch_many(ticker, keys, opts).await?;
        financials_table(&series)
    }

    /// Stitch one concept for many tickers.
    ///
    /// Companies are fetched sequentially to respect upstream spacing. A
    /// failure is logged and recorded, and the batch moves on.
    ///
    /// # Errors
    /// Fails with [`XbrlError::UnknownConcept`] before any upstream call if
    /// `key` is unknown.
    pub async fn fetch_batch(
        &self,
        tickers: &[Ticker],
        key: &str,
        opts: &StitchOptions,
    ) -> Result<BatchResult> {
        self.catalog.get(key)?;

        let mut result = BatchResult::default();
        for ticker in tickers {
            match self.fetch_series(ticker, key, opts).await {
                Ok(series) => result.series.push((ticker.clone(), series)),
                Err(e) => {
                    warn!(ticker = %ticker, concept = key, error = %e, "Skipping company");
                    result.failures.push((ticker.clone(), e));
                }
            }
        }

        debug!(
            succeeded = result.series.len(),
            failed = result.failures.len(),
            "Batch complete"
        );
        Ok(result)
    }
}
