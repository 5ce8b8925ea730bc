//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::query::QueryCacheOptions;

/// Cache configuration parameters.
///
/// Read once when the caches are constructed; later changes to the
/// environment have no effect on live caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of query results held
    pub query_cache_capacity: usize,
    /// Query result lifetime in milliseconds, 0 = never expires
    pub query_cache_ttl_ms: u64,
    /// Extend a query result's lifetime on every read
    pub query_cache_refresh_on_access: bool,
    /// Maximum number of compiled statements held per connection
    pub statement_cache_capacity: usize,
    /// Interval between expiry sweeps in milliseconds
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QUERY_CACHE_CAPACITY` - Maximum query results (default: 1000)
    /// - `QUERY_CACHE_TTL_MS` - Query result TTL in ms (default: 300000)
    /// - `QUERY_CACHE_REFRESH_ON_ACCESS` - Refresh TTL on read (default: false)
    /// - `STATEMENT_CACHE_CAPACITY` - Maximum compiled statements (default: 100)
    /// - `SWEEP_INTERVAL_MS` - Expiry sweep frequency in ms (default: 60000)
    ///
    /// Unparseable values fall back to the default. A capacity of 0 is kept
    /// as-is and rejected when the cache is built.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            query_cache_capacity: env_or("QUERY_CACHE_CAPACITY", defaults.query_cache_capacity),
            query_cache_ttl_ms: env_or("QUERY_CACHE_TTL_MS", defaults.query_cache_ttl_ms),
            query_cache_refresh_on_access: env_or(
                "QUERY_CACHE_REFRESH_ON_ACCESS",
                defaults.query_cache_refresh_on_access,
            ),
            statement_cache_capacity: env_or(
                "STATEMENT_CACHE_CAPACITY",
                defaults.statement_cache_capacity,
            ),
            sweep_interval_ms: env_or("SWEEP_INTERVAL_MS", defaults.sweep_interval_ms),
        }
    }

    pub fn query_cache_options(&self) -> QueryCacheOptions {
        QueryCacheOptions::new(self.query_cache_capacity)
            .with_ttl(Duration::from_millis(self.query_cache_ttl_ms))
            .with_refresh_on_access(self.query_cache_refresh_on_access)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_cache_capacity: 1000,
            query_cache_ttl_ms: 300_000,
            query_cache_refresh_on_access: false,
            statement_cache_capacity: 100,
            sweep_interval_ms: 60_000,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
