//! Shared Query Cache Module
//!
//! Caller-side synchronization for hosts that share one query cache between
//! tasks.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::QueryCacheStats;
use crate::query::QueryCache;

/// Cloneable handle to a [`QueryCache`] behind an async mutex.
///
/// The lock is never held while a computation runs, so other tasks keep
/// reading and writing the cache in the meantime. Concurrent misses for the
/// same key each run their computation and the last one to finish wins;
/// there is no single-flight de-duplication.
pub struct SharedQueryCache<V> {
    inner: Arc<Mutex<QueryCache<V>>>,
}

impl<V> Clone for SharedQueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone> SharedQueryCache<V> {
    pub fn new(cache: QueryCache<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// The underlying mutex, e.g. for [`spawn_sweep_task`](crate::tasks::spawn_sweep_task).
    pub fn handle(&self) -> Arc<Mutex<QueryCache<V>>> {
        self.inner.clone()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.inner.lock().await.set(key, value);
    }

    /// Returns the cached result, or runs `compute` with the lock released
    /// and stores its successful output.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.set(key, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        self.inner.lock().await.invalidate_by_prefix(prefix)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.lock().await.delete(key)
    }

    pub async fn clean_expired(&self) -> usize {
        self.inner.lock().await.clean_expired()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn stats(&self) -> QueryCacheStats {
        self.inner.lock().await.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryCacheOptions;

    fn shared(capacity: usize) -> SharedQueryCache<u32> {
        SharedQueryCache::new(QueryCache::new(QueryCacheOptions::new(capacity)).unwrap())
    }

    #[tokio::test]
    async fn test_shared_get_or_compute_memoizes() {
        let cache = shared(8);

        let first = cache
            .get_or_compute("k", || async { Ok::<_, ()>(7) })
            .await
            .unwrap();
        let second = cache
            .get_or_compute("k", || async { Ok::<_, ()>(99) })
            .await
            .unwrap();

        assert_eq!((first, second), (7, 7));
        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_shared_clones_see_same_entries() {
        let cache = shared(8);
        let other = cache.clone();

        cache.set("p:/x:a", 1).await;
        other.set("p:/x:b", 2).await;

        assert_eq!(other.get("p:/x:a").await, Some(1));
        assert_eq!(cache.invalidate_by_prefix("p:/x").await, 2);
        assert_eq!(other.get("p:/x:b").await, None);
    }

    #[tokio::test]
    async fn test_shared_cache_is_usable_while_computing() {
        let cache = shared(8);
        cache.set("other", 1).await;

        let reader = cache.clone();
        let value = cache
            .get_or_compute("slow", || async move {
                // The lock is free while the computation is suspended
                assert_eq!(reader.get("other").await, Some(1));
                Ok::<_, ()>(2)
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
    }
}
