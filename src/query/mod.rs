//! Query Result Cache Module
//!
//! Memoization layer for analysis results: TTL-bounded query cache, canonical
//! key construction and a shared async handle.

mod cache;
mod key;
mod shared;

pub use cache::{QueryCache, QueryCacheOptions};
pub use key::{build_key, CacheKeyBuilder};
pub use shared::SharedQueryCache;
