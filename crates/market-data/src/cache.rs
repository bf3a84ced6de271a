use crate::error::MarketDataError;
use crate::provider::MarketDataProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceBar;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug)]
struct CacheEntry {
    bars: Arc<Vec<PriceBar>>,
    inserted_at: Instant,
}

/// A TTL-bounded cache of bar series, owned by the caller and shared by handle.
#[derive(Debug)]
pub struct BarCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl BarCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached bars if present and younger than the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<PriceBar>>> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Arc<Vec<PriceBar>>> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries
            .get(key)
            .filter(|entry| now.duration_since(entry.inserted_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.bars))
    }

    pub fn insert(&self, key: CacheKey, bars: Vec<PriceBar>) -> Arc<Vec<PriceBar>> {
        let bars = Arc::new(bars);
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.insert(
            key,
            CacheEntry {
                bars: Arc::clone(&bars),
                inserted_at: Instant::now(),
            },
        );
        bars
    }

    /// Drops every entry for `symbol`, whatever its range.
    pub fn invalidate_symbol(&self, symbol: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.retain(|key, _| key.symbol != symbol);
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wraps a provider so repeated requests for the same range hit the cache.
pub struct CachedProvider<P> {
    inner: P,
    cache: Arc<BarCache>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: Arc<BarCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<BarCache> {
        &self.cache
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let key = CacheKey {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            start,
            end,
        };
        if let Some(bars) = self.cache.get(&key) {
            tracing::trace!(%symbol, %timeframe, "bar cache hit");
            return Ok(bars.as_ref().clone());
        }

        // Failures are not cached; the next call retries the inner provider.
        let bars = self.inner.fetch_bars(symbol, timeframe, start, end).await?;
        self.cache.insert(key, bars.clone());
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        async fn fetch_bars(
            &self,
            symbol: &str,
            _timeframe: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<PriceBar>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "FAIL" {
                return Err(MarketDataError::fetch(symbol, "boom"));
            }
            Ok(Vec::new())
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn key(symbol: &str) -> CacheKey {
        CacheKey {
            symbol: symbol.to_string(),
            timeframe: "1d".to_string(),
            start: day(1),
            end: day(31),
        }
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let cache = Arc::new(BarCache::new(Duration::from_secs(60)));
        let provider = CachedProvider::new(CountingProvider { calls: AtomicUsize::new(0) }, Arc::clone(&cache));

        provider.fetch_bars("ACME", "1d", day(1), day(31)).await.unwrap();
        provider.fetch_bars("ACME", "1d", day(1), day(31)).await.unwrap();
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);

        // A different range is a different key.
        provider.fetch_bars("ACME", "1d", day(2), day(31)).await.unwrap();
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = Arc::new(BarCache::new(Duration::from_secs(60)));
        let provider = CachedProvider::new(CountingProvider { calls: AtomicUsize::new(0) }, cache);
        assert!(provider.fetch_bars("FAIL", "1d", day(1), day(2)).await.is_err());
        assert!(provider.fetch_bars("FAIL", "1d", day(1), day(2)).await.is_err());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert!(provider.cache().is_empty());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = BarCache::new(Duration::from_millis(50));
        cache.insert(key("ACME"), Vec::new());
        assert!(cache.get(&key("ACME")).is_some());
        let later = Instant::now() + Duration::from_millis(100);
        assert!(cache.get_at(&key("ACME"), later).is_none());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let cache = BarCache::new(Duration::ZERO);
        cache.insert(key("ACME"), Vec::new());
        assert!(cache.get(&key("ACME")).is_none());
        assert_eq!(cache.purge_expired(), 1);
    }

    #[test]
    fn invalidate_drops_all_ranges_for_symbol() {
        let cache = BarCache::new(Duration::from_secs(60));
        cache.insert(key("ACME"), Vec::new());
        cache.insert(key("OTHER"), Vec::new());
        cache.invalidate_symbol("ACME");
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("OTHER")).is_some());
    }
}
