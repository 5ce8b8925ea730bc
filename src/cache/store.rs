//! Cache Store Module
//!
//! Bounded cache combining a HashMap index with the recency list and optional
//! max-age expiry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{
    duration_ms, CacheEntry, CacheStats, Clock, Counters, EvictionListener, NoopListener,
    RecencyList, SystemClock,
};
use crate::error::{CacheError, Result};

// == Bounded Cache ==
/// Fixed-capacity cache with strict least-recently-used eviction.
///
/// Not internally synchronized: a single owner drives each instance, and
/// callers sharing one across threads wrap it in a mutex.
pub struct BoundedCache<V> {
    /// Key to recency-list slot
    index: HashMap<String, usize>,
    /// Entries in recency order
    list: RecencyList<V>,
    /// Hit/miss counters
    counters: Counters,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Maximum entry age in milliseconds, None = entries never age out
    max_age_ms: Option<u64>,
    /// Notified on capacity evictions only
    listener: Box<dyn EvictionListener<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> BoundedCache<V> {
    // == Constructor ==
    /// Creates a new cache holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 1 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            index: HashMap::with_capacity(capacity),
            list: RecencyList::with_capacity(capacity),
            counters: Counters::default(),
            capacity,
            max_age_ms: None,
            listener: Box::new(NoopListener),
            clock: Arc::new(SystemClock),
        })
    }

    /// Drops entries older than `max_age` on access. `Duration::ZERO` disables ageing.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age_ms = Some(duration_ms(max_age)).filter(|ms| *ms > 0);
        self
    }

    /// Installs the listener notified on capacity evictions.
    pub fn with_listener(mut self, listener: impl EvictionListener<V> + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.set_clock(clock);
        self
    }

    pub(crate) fn set_listener(&mut self, listener: impl EvictionListener<V> + 'static) {
        self.listener = Box::new(listener);
    }

    pub(crate) fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// Aged-out entries are removed (without notifying the listener) and
    /// counted as misses.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = self.lookup(key)?;
        self.list.entry(idx).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get), but hands out a mutable reference.
    ///
    /// Mutating through it does not refresh the entry's age.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.lookup(key)?;
        self.list.entry_mut(idx).map(|entry| &mut entry.value)
    }

    // == Peek ==
    /// Reads a live value without promoting it or touching the counters.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let now = self.clock.now_ms();
        let entry = self.list.entry(*self.index.get(key)?)?;
        (!self.is_aged_out(entry, now)).then_some(&entry.value)
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// If the key already exists, the value is replaced, its age is reset and
    /// it becomes most recently used; this never evicts. If the key is new and
    /// the cache is full, the least recently used entry is evicted and handed
    /// to the listener first.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now_ms();

        // Overwrite case
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.list.entry_mut(idx) {
                *entry = CacheEntry::new(value, now);
            }
            self.list.touch(idx);
            return;
        }

        if self.list.len() >= self.capacity {
            self.evict_oldest();
        }

        let idx = self.list.push_front(key.clone(), CacheEntry::new(value, now));
        self.index.insert(key, idx);
    }

    // == Has ==
    /// Checks whether a live entry exists. Does not affect recency or counters.
    pub fn has(&self, key: &str) -> bool {
        self.peek(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    /// Removes an entry by key and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.list.remove(idx).map(|(_, entry)| entry.value)
    }

    // == Clear ==
    /// Removes every entry and resets the hit/miss counters.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        self.counters.reset();
    }

    // == Iteration ==
    /// Iterates live entries from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        let now = self.clock.now_ms();
        self.list
            .iter()
            .filter(move |(_, entry)| !self.is_aged_out(entry, now))
            .map(|(key, entry)| (key, &entry.value))
    }

    /// Visits live entries oldest-first without changing recency.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&V, &str),
    {
        for (key, value) in self.iter() {
            visitor(value, key);
        }
    }

    // == Cleanup Expired ==
    /// Removes all entries past the max age.
    ///
    /// Returns the number of entries removed, or 0 straight away when no max
    /// age is configured.
    pub fn clean_expired(&mut self) -> usize {
        let Some(max_age_ms) = self.max_age_ms else {
            return 0;
        };
        let now = self.clock.now_ms();

        let expired: Vec<String> = self
            .list
            .iter()
            .filter(|(_, entry)| entry.is_older_than(max_age_ms, now))
            .map(|(key, _)| key.to_string())
            .collect();

        for key in &expired {
            self.remove(key);
        }

        if !expired.is_empty() {
            debug!("Removed {} aged-out entries", expired.len());
        }
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_ms.map(Duration::from_millis)
    }

    /// The least recently used key, i.e. the next one to be evicted.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.list.peek_oldest()
    }

    /// Resolves a key to a live slot, updating counters and recency.
    fn lookup(&mut self, key: &str) -> Option<usize> {
        let now = self.clock.now_ms();

        let Some(&idx) = self.index.get(key) else {
            self.counters.record_miss();
            return None;
        };

        let aged_out = self
            .list
            .entry(idx)
            .map_or(true, |entry| self.is_aged_out(entry, now));
        if aged_out {
            self.remove(key);
            self.counters.record_miss();
            debug!("Entry aged out: {}", key);
            return None;
        }

        self.list.touch(idx);
        self.counters.record_hit();
        Some(idx)
    }

    fn evict_oldest(&mut self) {
        if let Some((key, entry)) = self.list.evict_oldest() {
            self.index.remove(&key);
            debug!("Evicted least recently used entry: {}", key);
            self.listener.on_evict(key, entry.value);
        }
    }

    fn is_aged_out(&self, entry: &CacheEntry<V>, now: u64) -> bool {
        self.max_age_ms
            .map_or(false, |max_age_ms| entry.is_older_than(max_age_ms, now))
    }
}

impl<V> fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("max_age_ms", &self.max_age_ms)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
