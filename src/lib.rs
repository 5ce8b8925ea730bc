//! Codeintel Cache - caching and eviction engine for codebase analysis
//!
//! Provides a bounded LRU container, a TTL-aware query result cache built on
//! it, and a prepared-statement cache keyed by normalized statement text.
//!
//! Caches are single-owner structures; hosts that share one between tasks
//! wrap it (see [`SharedQueryCache`]).

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod statement;
pub mod tasks;

pub use cache::{BoundedCache, CacheStats, EvictionListener, QueryCacheStats};
pub use config::Config;
pub use error::{CacheError, Result};
pub use query::{build_key, CacheKeyBuilder, QueryCache, QueryCacheOptions, SharedQueryCache};
pub use statement::{normalize_sql, StatementCache, StatementCompiler};
pub use tasks::spawn_sweep_task;
