//! Process-lifetime memoization keyed by argument tuples.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;

/// Whether a [`MemoCache`] lookup was served from memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The value was already cached.
    Hit,
    /// The value was computed by this call.
    Miss,
}

impl CacheStatus {
    /// `true` for [`CacheStatus::Hit`].
    #[must_use]
    pub fn is_hit(self) -> bool {
        self == CacheStatus::Hit
    }
}

/// Unbounded memoization cache.
///
/// Entries live until the cache is dropped; there is no eviction or
/// invalidation. A missing key is computed while the lock is held, so
/// concurrent lookups are serialized and each key is computed at most once.
/// Failed computations are not cached. The counters, [`MemoCache::len`]
/// included, never take the lock, so they answer during a computation.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    len: AtomicUsize,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + Serialize,
    V: Clone,
{
    /// Create an empty cache; `name` only appears in log events.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            len: AtomicUsize::new(0),
        }
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// # Errors
    ///
    /// Returns the error from `compute` unchanged; nothing is stored.
    pub fn get_or_try_insert_with<E, F>(&self, key: &K, compute: F) -> Result<(V, CacheStatus), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        // A panic inside `compute` leaves the map untouched, so a poisoned
        // lock is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, key = %self.key_repr(key), "cache hit");
            return Ok((value.clone(), CacheStatus::Hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, key = %self.key_repr(key), "cache miss");
        let value = compute()?;
        entries.insert(key.clone(), value.clone());
        self.len.store(entries.len(), Ordering::Release);
        Ok((value, CacheStatus::Miss))
    }

    /// Return the cached value for `key` without computing anything.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lookups served from memory.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that ran the computation.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// JSON rendering of `key` for log events.
    #[must_use]
    pub fn key_repr(&self, key: &K) -> String {
        serde_json::to_string(key).unwrap_or_else(|e| format!("<unserializable key: {e}>"))
    }
}
