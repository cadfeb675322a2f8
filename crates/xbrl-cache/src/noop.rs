//! No-op cache implementation.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;
use xbrl_core::{Cik, FactCache, FactSet, Result, Ticker};

/// A no-op cache that doesn't store anything.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return `Ok(())`,
/// so every call re-fetches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FactCache for NoopCache {
    async fn get_facts(&self, _source: &str, _cik: &Cik) -> Result<Option<Arc<FactSet>>> {
        trace!("NoopCache: get_facts called, returning None");
        Ok(None)
    }

    async fn put_facts(&self, _source: &str, _cik: &Cik, _facts: Arc<FactSet>) -> Result<()> {
        trace!("NoopCache: put_facts called, doing nothing");
        Ok(())
    }

    async fn get_cik(&self, _source: &str, _ticker: &Ticker) -> Result<Option<Cik>> {
        trace!("NoopCache: get_cik called, returning None");
        Ok(None)
    }

    async fn put_cik(&self, _source: &str, _ticker: &Ticker, _cik: &Cik) -> Result<()> {
        trace!("NoopCache: put_cik called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();
        let cik = Cik::from_number(320193);

        cache
            .put_facts("test", &cik, Arc::new(FactSet::new()))
            .await
            .unwrap();
        assert!(cache.get_facts("test", &cik).await.unwrap().is_none());

        cache
            .put_cik("test", &Ticker::new("AAPL"), &cik)
            .await
            .unwrap();
        assert!(
            cache
                .get_cik("test", &Ticker::new("AAPL"))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 0);
    }
}
