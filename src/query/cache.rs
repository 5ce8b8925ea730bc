//! Query Result Cache Module
//!
//! Memoizes expensive analysis results on top of the bounded cache, with its
//! own TTL bookkeeping and prefix invalidation.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{
    duration_ms, hit_rate, BoundedCache, Clock, Counters, EvictionListener, NoopListener,
    QueryCacheEntry, QueryCacheStats, SystemClock,
};
use crate::error::Result;

// == Query Cache Options ==
/// Construction parameters for [`QueryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCacheOptions {
    /// Maximum number of cached results
    pub capacity: usize,
    /// Lifetime of a cached result, zero = never expires
    pub ttl: Duration,
    /// Extend the lifetime of a result every time it is read
    pub refresh_on_access: bool,
}

impl QueryCacheOptions {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ttl: Duration::ZERO,
            refresh_on_access: false,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_refresh_on_access(mut self, refresh_on_access: bool) -> Self {
        self.refresh_on_access = refresh_on_access;
        self
    }
}

// == Eviction Counter ==
/// Inner-cache listener that counts evictions and forwards the unwrapped value.
struct EvictionCounter<V> {
    evictions: Arc<AtomicU64>,
    downstream: Box<dyn EvictionListener<V>>,
}

impl<V> EvictionListener<QueryCacheEntry<V>> for EvictionCounter<V> {
    fn on_evict(&mut self, key: String, entry: QueryCacheEntry<V>) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.downstream.on_evict(key, entry.value);
    }
}

// == Query Cache ==
/// LRU cache of computed results with per-entry TTL.
///
/// Expired entries are dropped lazily by the read that finds them, or in bulk
/// by [`clean_expired`](Self::clean_expired). Nothing runs in the background.
pub struct QueryCache<V> {
    inner: BoundedCache<QueryCacheEntry<V>>,
    ttl_ms: u64,
    refresh_on_access: bool,
    counters: Counters,
    expirations: u64,
    /// Shared with the inner cache's eviction listener
    evictions: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
}

impl<V: 'static> QueryCache<V> {
    // == Constructor ==
    /// Creates a query cache from `options`.
    ///
    /// Fails with [`CacheError::InvalidCapacity`](crate::error::CacheError::InvalidCapacity)
    /// when the capacity is zero.
    pub fn new(options: QueryCacheOptions) -> Result<Self> {
        let evictions = Arc::new(AtomicU64::new(0));
        let inner = BoundedCache::new(options.capacity)?.with_listener(EvictionCounter {
            evictions: evictions.clone(),
            downstream: Box::new(NoopListener),
        });

        Ok(Self {
            inner,
            ttl_ms: duration_ms(options.ttl),
            refresh_on_access: options.refresh_on_access,
            counters: Counters::default(),
            expirations: 0,
            evictions,
            clock: Arc::new(SystemClock),
        })
    }

    /// Forwards capacity evictions (never expirations) to `listener`.
    pub fn with_listener(mut self, listener: impl EvictionListener<V> + 'static) -> Self {
        self.inner.set_listener(EvictionCounter {
            evictions: self.evictions.clone(),
            downstream: Box::new(listener),
        });
        self
    }
}

impl<V> QueryCache<V> {
    /// Replaces the time source used for TTL deadlines.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.inner.set_clock(clock.clone());
        self.clock = clock;
        self
    }

    // == Get ==
    /// Retrieves a cached result.
    ///
    /// A result past its deadline is removed, counted as an expiration and
    /// reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = self.clock.now_ms();

        let Some(entry) = self.inner.get_mut(key) else {
            self.counters.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            self.inner.delete(key);
            self.expirations += 1;
            self.counters.record_miss();
            debug!("Query result expired: {}", key);
            return None;
        }

        if self.refresh_on_access {
            entry.refresh(now, self.ttl_ms);
        }
        self.counters.record_hit();
        Some(entry.value.clone())
    }

    // == Set ==
    /// Stores a result, replacing any previous one under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let now = self.clock.now_ms();
        self.inner
            .set(key, QueryCacheEntry::new(value, now, self.ttl_ms));
    }

    // == Get Or Compute ==
    /// Returns the cached result, or awaits `compute` and caches its output.
    ///
    /// Only successful results are stored. An `Err` is handed back unchanged
    /// and the next call for the same key runs `compute` again.
    pub async fn get_or_compute<F, Fut, E>(&mut self, key: &str, compute: F) -> std::result::Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    // == Has ==
    /// Checks for a live result without promoting it or counting an access.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.inner
            .peek(key)
            .map_or(false, |entry| !entry.is_expired(now))
    }

    // == Delete ==
    pub fn delete(&mut self, key: &str) -> bool {
        self.inner.delete(key)
    }

    // == Invalidate By Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Runs to completion before returning, so no stale result under the
    /// prefix is readable afterwards. Returns the number of entries removed.
    pub fn invalidate_by_prefix(&mut self, prefix: &str) -> usize {
        let mut matching = Vec::new();
        self.inner.for_each(|_, key| {
            if key.starts_with(prefix) {
                matching.push(key.to_string());
            }
        });

        for key in &matching {
            self.inner.delete(key);
        }

        debug!(
            "Invalidated {} query results with prefix {:?}",
            matching.len(),
            prefix
        );
        matching.len()
    }

    // == Cleanup Expired ==
    /// Removes every result past its deadline, counting each as an expiration.
    pub fn clean_expired(&mut self) -> usize {
        if self.ttl_ms == 0 {
            return 0;
        }
        let now = self.clock.now_ms();

        let mut expired = Vec::new();
        self.inner.for_each(|entry, key| {
            if entry.is_expired(now) {
                expired.push(key.to_string());
            }
        });

        for key in &expired {
            self.inner.delete(key);
        }
        self.expirations += expired.len() as u64;
        expired.len()
    }

    // == Clear ==
    /// Drops every entry and resets all counters of this layer.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.counters.reset();
        self.expirations = 0;
        self.evictions.store(0, Ordering::Relaxed);
    }

    // == Stats ==
    pub fn stats(&self) -> QueryCacheStats {
        QueryCacheStats {
            hits: self.counters.hits,
            misses: self.counters.misses,
            size: self.inner.len(),
            hit_rate: hit_rate(self.counters.hits, self.counters.misses),
            expirations: self.expirations,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Configured lifetime, None when results never expire.
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_ms > 0).then(|| Duration::from_millis(self.ttl_ms))
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("inner", &self.inner)
            .field("ttl_ms", &self.ttl_ms)
            .field("refresh_on_access", &self.refresh_on_access)
            .field("stats", &self.stats())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{listener_fn, ManualClock};
    use crate::error::CacheError;
    use std::sync::Mutex;

    fn cache_with_clock(options: QueryCacheOptions) -> (QueryCache<String>, ManualClock) {
        let clock = ManualClock::new(1_000);
        let cache = QueryCache::new(options)
            .unwrap()
            .with_clock(Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_query_cache_zero_capacity_rejected() {
        let result: Result<QueryCache<String>> = QueryCache::new(QueryCacheOptions::new(0));
        assert_eq!(result.unwrap_err(), CacheError::InvalidCapacity(0));
    }

    #[test]
    fn test_query_cache_set_and_get() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(10));

        cache.set("k", "v".to_string());

        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.ttl(), None);
    }

    #[test]
    fn test_query_cache_ttl_expiry() {
        let (mut cache, clock) =
            cache_with_clock(QueryCacheOptions::new(10).with_ttl(Duration::from_millis(50)));

        cache.set("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));

        clock.advance(Duration::from_millis(100));

        assert!(!cache.has("k"));
        assert_eq!(cache.get("k"), None);

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_query_cache_zero_ttl_never_expires() {
        let (mut cache, clock) = cache_with_clock(QueryCacheOptions::new(10));

        cache.set("k", "v".to_string());
        clock.advance(Duration::from_secs(86_400));

        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert_eq!(cache.clean_expired(), 0);
    }

    #[test]
    fn test_query_cache_sub_millisecond_ttl_still_expires() {
        let (mut cache, clock) =
            cache_with_clock(QueryCacheOptions::new(4).with_ttl(Duration::from_micros(500)));

        assert_eq!(cache.ttl(), Some(Duration::from_millis(1)));

        cache.set("k", "v".to_string());
        clock.advance(Duration::from_millis(2));

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_query_cache_refresh_on_access() {
        let (mut cache, clock) = cache_with_clock(
            QueryCacheOptions::new(10)
                .with_ttl(Duration::from_millis(100))
                .with_refresh_on_access(true),
        );

        cache.set("k", "v".to_string());
        for _ in 0..5 {
            clock.advance(Duration::from_millis(60));
            assert_eq!(cache.get("k"), Some("v".to_string()));
        }

        clock.advance(Duration::from_millis(101));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_query_cache_without_refresh_expires_on_schedule() {
        let (mut cache, clock) =
            cache_with_clock(QueryCacheOptions::new(10).with_ttl(Duration::from_millis(100)));

        cache.set("k", "v".to_string());
        clock.advance(Duration::from_millis(60));
        assert!(cache.get("k").is_some());
        clock.advance(Duration::from_millis(60));

        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_query_cache_evictions_counted_separately() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        let (cache, _) = cache_with_clock(QueryCacheOptions::new(2));
        let mut cache = cache.with_listener(listener_fn(move |key: String, value: String| {
            sink.lock().unwrap().push((key, value));
        }));

        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.set("a", "1b".to_string());
        cache.set("c", "3".to_string());

        let stats = cache.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.size, 2);
        assert_eq!(
            *evicted.lock().unwrap(),
            vec![("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_query_cache_delete_is_not_eviction() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(2));

        cache.set("a", "1".to_string());
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));

        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_query_cache_invalidate_by_prefix() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(10));

        cache.set("p:/x:a", "1".to_string());
        cache.set("p:/x:b", "2".to_string());
        cache.set("p:/y:a", "3".to_string());

        let removed = cache.invalidate_by_prefix("p:/x");

        assert_eq!(removed, 2);
        assert!(!cache.has("p:/x:a"));
        assert!(!cache.has("p:/x:b"));
        assert_eq!(cache.get("p:/y:a"), Some("3".to_string()));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_query_cache_invalidate_unknown_prefix() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(10));

        cache.set("patterns:/a", "1".to_string());

        assert_eq!(cache.invalidate_by_prefix("similar:"), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_query_cache_clean_expired() {
        let (mut cache, clock) =
            cache_with_clock(QueryCacheOptions::new(10).with_ttl(Duration::from_millis(100)));

        cache.set("old1", "1".to_string());
        cache.set("old2", "2".to_string());
        clock.advance(Duration::from_millis(80));
        cache.set("fresh", "3".to_string());
        clock.advance(Duration::from_millis(80));

        assert_eq!(cache.clean_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expirations, 2);
        assert!(cache.has("fresh"));
    }

    #[test]
    fn test_query_cache_hit_rate() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(10));
        assert_eq!(cache.stats().hit_rate, 0.0);

        cache.set("k", "v".to_string());
        for _ in 0..4 {
            cache.get("k");
        }
        cache.get("missing");

        assert_eq!(cache.stats().hit_rate, 0.8);
    }

    #[test]
    fn test_query_cache_clear_resets_counters() {
        let (mut cache, clock) =
            cache_with_clock(QueryCacheOptions::new(1).with_ttl(Duration::from_millis(10)));

        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        clock.advance(Duration::from_millis(20));
        cache.get("b");
        cache.get("b");

        let stats = cache.stats();
        assert_eq!((stats.evictions, stats.expirations, stats.misses), (1, 1, 2));

        cache.clear();

        assert_eq!(cache.stats(), QueryCacheStats::default());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_compute_caches_success() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(10));
        let mut calls = 0;

        for _ in 0..3 {
            let value = cache
                .get_or_compute("k", || {
                    calls += 1;
                    async { Ok::<_, String>("computed".to_string()) }
                })
                .await
                .unwrap();
            assert_eq!(value, "computed");
        }

        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[tokio::test]
    async fn test_get_or_compute_does_not_cache_failure() {
        let (mut cache, _) = cache_with_clock(QueryCacheOptions::new(10));
        let mut calls = 0;

        let first = cache
            .get_or_compute("k", || {
                calls += 1;
                async { Err::<String, _>("engine unavailable") }
            })
            .await;
        assert_eq!(first, Err("engine unavailable"));
        assert!(!cache.has("k"));

        let second = cache
            .get_or_compute("k", || {
                calls += 1;
                async { Ok::<_, &str>("ok".to_string()) }
            })
            .await;

        assert_eq!(second, Ok("ok".to_string()));
        assert_eq!(calls, 2);
    }
}
