//! Eviction Listener Module
//!
//! Hooks invoked when the bounded cache drops an entry to make room.

// == Eviction Listener ==
/// Receives entries removed by capacity-driven eviction.
///
/// Never called for explicit deletes, overwrites, or age/TTL expiry.
pub trait EvictionListener<V>: Send {
    /// Called synchronously with the evicted key and value, before the new
    /// entry is inserted.
    fn on_evict(&mut self, key: String, value: V);
}

// == No-op Listener ==
/// Default listener that ignores every eviction.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl<V> EvictionListener<V> for NoopListener {
    fn on_evict(&mut self, _key: String, _value: V) {}
}

// == Closure Listener ==
/// Adapts a closure into an [`EvictionListener`].
#[derive(Debug, Clone)]
pub struct FnListener<F>(F);

impl<V, F> EvictionListener<V> for FnListener<F>
where
    F: FnMut(String, V) + Send,
{
    fn on_evict(&mut self, key: String, value: V) {
        (self.0)(key, value)
    }
}

/// Wraps a closure so it can be passed where an eviction listener is expected.
pub fn listener_fn<F>(f: F) -> FnListener<F> {
    FnListener(f)
}
