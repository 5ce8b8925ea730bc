//! Cache Statistics Module
//!
//! Tracks cache performance metrics reported to monitoring.

use serde::Serialize;

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Counters ==
/// Hit/miss bookkeeping shared by every cache layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
}

impl Counters {
    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Reset ==
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot of these counters together with the current entry count.
    pub fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats::new(self.hits, self.misses, size)
    }
}

// == Cache Stats ==
/// Point-in-time statistics for the bounded cache and the statement cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// hits / (hits + misses), 0.0 without any access
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    pub fn new(hits: u64, misses: u64, size: usize) -> Self {
        Self {
            hits,
            misses,
            size,
            hit_rate: hit_rate(hits, misses),
        }
    }
}

// == Query Cache Stats ==
/// Statistics for the query result cache.
///
/// Expirations (TTL) and evictions (capacity) are counted separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QueryCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub hit_rate: f64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Entries dropped to make room for new ones
    pub evictions: u64,
}
