//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use xbrl_core::{Cik, FactCache, FactSet, Result, Ticker};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for fact set entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactsKey {
    source: String,
    cik: Cik,
}

/// Key for ticker resolution entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TickerKey {
    source: String,
    ticker: Ticker,
}

/// In-memory cache that lives as long as the process.
///
/// Fact sets are shared through `Arc`, so a hit never copies the payload.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    facts: RwLock<HashMap<FactsKey, CacheEntry<Arc<FactSet>>>>,
    ciks: RwLock<HashMap<TickerKey, CacheEntry<Cik>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached fact sets.
    pub async fn fact_set_count(&self) -> usize {
        self.facts.read().await.len()
    }
}

#[async_trait]
impl FactCache for InMemoryCache {
    #[instrument(skip(self), fields(source = %source, cik = %cik))]
    async fn get_facts(&self, source: &str, cik: &Cik) -> Result<Option<Arc<FactSet>>> {
        let key = FactsKey {
            source: source.to_string(),
            cik: cik.clone(),
        };

        let cache = self.facts.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for company facts");
                Ok(Some(Arc::clone(&entry.data)))
            }
            None => {
                debug!("Cache miss for company facts");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, facts), fields(source = %source, cik = %cik, count = facts.fact_count()))]
    async fn put_facts(&self, source: &str, cik: &Cik, facts: Arc<FactSet>) -> Result<()> {
        let key = FactsKey {
            source: source.to_string(),
            cik: cik.clone(),
        };

        let mut cache = self.facts.write().await;
        cache.insert(key, CacheEntry::new(facts));
        debug!("Cached company facts");
        Ok(())
    }

    #[instrument(skip(self), fields(source = %source, ticker = %ticker))]
    async fn get_cik(&self, source: &str, ticker: &Ticker) -> Result<Option<Cik>> {
        let key = TickerKey {
            source: source.to_string(),
            ticker: ticker.clone(),
        };

        let cache = self.ciks.read().await;
        Ok(cache.get(&key).map(|entry| entry.data.clone()))
    }

    #[instrument(skip(self), fields(source = %source, ticker = %ticker, cik = %cik))]
    async fn put_cik(&self, source: &str, ticker: &Ticker, cik: &Cik) -> Result<()> {
        let key = TickerKey {
            source: source.to_string(),
            ticker: ticker.clone(),
        };

        self.ciks
            .write()
            .await
            .insert(key, CacheEntry::new(cik.clone()));
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.facts.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.ciks.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale cache entries", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.facts.write().await.clear();
        self.ciks.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use xbrl_core::Fact;

    fn sample_facts() -> Arc<FactSet> {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        Arc::new(FactSet::new().with_fact("us-gaap", Fact::new("Revenues", "USD", end, 100.0)))
    }

    #[tokio::test]
    async fn test_memory_cache_facts() {
        let cache = InMemoryCache::new();
        let cik = Cik::from_number(1594805);

        // Initially no data
        assert!(cache.get_facts("test", &cik).await.unwrap().is_none());

        cache.put_facts("test", &cik, sample_facts()).await.unwrap();

        let hit = cache.get_facts("test", &cik).await.unwrap().unwrap();
        assert_eq!(hit.fact_count(), 1);

        // Keyed by source as well as CIK
        assert!(cache.get_facts("other", &cik).await.unwrap().is_none());
        assert_eq!(cache.fact_set_count().await, 1);
    }

    #[tokio::test]
    async fn test_memory_cache_cik() {
        let cache = InMemoryCache::new();
        let ticker = Ticker::new("shop");
        let cik = Cik::from_number(1594805);

        assert!(cache.get_cik("test", &ticker).await.unwrap().is_none());
        cache.put_cik("test", &ticker, &cik).await.unwrap();
        assert_eq!(
            cache.get_cik("test", &Ticker::new("SHOP")).await.unwrap(),
            Some(cik)
        );
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_stale() {
        let cache = InMemoryCache::new();
        let cik = Cik::from_number(320193);
        cache.put_facts("test", &cik, sample_facts()).await.unwrap();
        cache
            .put_cik("test", &Ticker::new("AAPL"), &cik)
            .await
            .unwrap();

        // Nothing is older than an hour
        assert_eq!(
            cache.invalidate_stale(Duration::from_secs(3600)).await.unwrap(),
            0
        );

        // Everything is older than zero
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 2);
        assert!(cache.get_facts("test", &cik).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        let cik = Cik::from_number(320193);
        cache.put_facts("test", &cik, sample_facts()).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get_facts("test", &cik).await.unwrap().is_none());
    }
}
