//! Cache Module
//!
//! Provides the bounded LRU container the query and statement caches are
//! built on, plus its entry, clock, listener and statistics types.

mod clock;
mod entry;
mod listener;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub(crate) use clock::duration_ms;
pub use entry::{CacheEntry, QueryCacheEntry};
pub use listener::{listener_fn, EvictionListener, FnListener, NoopListener};
pub use lru::{Iter, RecencyList};
pub use stats::{hit_rate, CacheStats, Counters, QueryCacheStats};
pub use store::BoundedCache;
