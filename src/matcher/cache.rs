//! Bounded LRU cache for compiled pattern lookups

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// Fixed-capacity LRU cache, safe for concurrent use
///
/// A `get` promotes the entry to most recently used; a `put` at capacity
/// evicts the least recently used entry first. Both paths mutate the
/// recency list, so every access goes through one mutex. No time-based
/// expiry; eviction is purely capacity-driven.
pub struct BoundedCache<K: Hash + Eq, V: Clone> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Cache holding at most `capacity` entries (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        BoundedCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a value, promoting the entry on a hit
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Insert a value, evicting the least recently used entry at capacity
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
