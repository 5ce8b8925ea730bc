//! Cache Entry Module
//!
//! Defines the entry types stored by the bounded cache and the query cache.

// == Cache Entry ==
/// A value held by the bounded cache together with its age stamp.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insert or last update timestamp (milliseconds)
    pub touched_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped at `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            touched_at: now_ms,
        }
    }

    // == Age ==
    /// Milliseconds since the entry was inserted or last updated.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.touched_at)
    }

    /// Returns true once the age is strictly greater than `max_age_ms`.
    pub fn is_older_than(&self, max_age_ms: u64, now_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }
}

// == Query Cache Entry ==
/// A query result with its own TTL deadline.
///
/// The deadline is independent of the bounded cache's age stamp.
#[derive(Debug, Clone)]
pub struct QueryCacheEntry<V> {
    /// The cached result
    pub value: V,
    /// Expiration timestamp (milliseconds), None = never expires
    pub expires_at: Option<u64>,
}

impl<V> QueryCacheEntry<V> {
    // == Constructor ==
    /// Creates an entry expiring `ttl_ms` after `now_ms`. A TTL of zero never expires.
    pub fn new(value: V, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            expires_at: deadline(now_ms, ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once `now_ms` is strictly past its deadline;
    /// at the deadline itself it is still served.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms > expires,
            None => false,
        }
    }

    // == Refresh ==
    /// Pushes the deadline out to `now_ms + ttl_ms`.
    pub fn refresh(&mut self, now_ms: u64, ttl_ms: u64) {
        self.expires_at = deadline(now_ms, ttl_ms);
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now_ms))
    }
}

fn deadline(now_ms: u64, ttl_ms: u64) -> Option<u64> {
    (ttl_ms > 0).then(|| now_ms.saturating_add(ttl_ms))
}
