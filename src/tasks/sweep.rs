//! Expiry Sweep Task
//!
//! Host-side helper that periodically asks a cache to drop expired entries.
//! The caches never schedule this themselves; a host opts in by spawning it
//! and aborts the returned handle on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::BoundedCache;
use crate::query::QueryCache;

// == Sweep Trait ==
/// A cache that can drop its expired entries on demand.
pub trait Sweep {
    /// Removes expired entries and returns how many were removed.
    fn clean_expired(&mut self) -> usize;
}

impl<V> Sweep for BoundedCache<V> {
    fn clean_expired(&mut self) -> usize {
        BoundedCache::clean_expired(self)
    }
}

impl<V> Sweep for QueryCache<V> {
    fn clean_expired(&mut self) -> usize {
        QueryCache::clean_expired(self)
    }
}

/// Spawns a background task that calls `clean_expired` every `interval`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = SharedQueryCache::new(QueryCache::new(options)?);
/// let sweep_handle = spawn_sweep_task(cache.handle(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<C>(cache: Arc<Mutex<C>>, interval: Duration) -> JoinHandle<()>
where
    C: Sweep + Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiry sweep task with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.lock().await.clean_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
