//! In-memory TTL cache
//!
//! Key-value store with per-entry time-to-live, shared between the refresh
//! scheduler (writer) and the engines/presentation layer (readers).
//!
//! # Key Invariants
//!
//! - Expiration is lazy: an entry past its expiry instant is treated as a
//!   miss on `get` and removed then, never served.
//! - Writes are atomic per key with last-writer-wins semantics.
//! - There is no capacity bound and no eviction beyond TTL; cardinality is
//!   bounded by the fixed set of tracked categories and symbols.
//! - A miss never triggers a fetch; refresh is the scheduler's job.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached value together with the instant it was written.
///
/// `fetched_at` is the freshness timestamp consumers must propagate into
/// derived results: stale inputs produce stale outputs, never masked.
#[derive(Debug, Clone)]
pub struct Cached<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    fetched_at: DateTime<Utc>,
    expires_at: Instant,
}

/// Thread-safe key-value store with per-entry TTL and lazy expiration.
#[derive(Debug, Default)]
pub struct TtlCache<V> {
    store: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key` if present and not expired.
    ///
    /// An expired entry is removed on this call and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Cached<V>> {
        let now = Instant::now();
        {
            let store = self.store.read();
            match store.get(key) {
                None => {
                    debug!(key, "cache miss (not found)");
                    return None;
                }
                Some(entry) if now < entry.expires_at => {
                    debug!(key, "cache hit");
                    return Some(Cached {
                        value: entry.value.clone(),
                        fetched_at: entry.fetched_at,
                    });
                }
                Some(_) => {}
            }
        }

        // Lazy expiration: upgrade to a write lock and remove the stale
        // entry, re-checking in case a writer replaced it in between.
        let mut store = self.store.write();
        if let Some(entry) = store.get(key) {
            if now < entry.expires_at {
                return Some(Cached {
                    value: entry.value.clone(),
                    fetched_at: entry.fetched_at,
                });
            }
            store.remove(key);
        }
        debug!(key, "cache miss (expired)");
        None
    }

    /// Store `value` under `key`, overwriting any existing entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let entry = Entry {
            value,
            fetched_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        };
        debug!(key = %key, ttl_secs = ttl.as_secs_f64(), "cache set");
        self.store.write().insert(key, entry);
    }

    /// Remove `key` from the cache. A no-op if the key does not exist.
    pub fn remove(&self, key: &str) -> bool {
        self.store.write().remove(key).is_some()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut store = self.store.write();
        let count = store.len();
        store.clear();
        debug!(count, "cache cleared");
    }

    /// Number of stored entries, including not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_get_roundtrip() {
        let cache = TtlCache::new();
        cache.set("price:NVDA", 181.5_f64, Duration::from_secs(60));

        let hit = cache.get("price:NVDA").unwrap();
        assert!((hit.value - 181.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache: TtlCache<u32> = TtlCache::new();
        assert!(cache.get("nothing").is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = TtlCache::new();
        cache.set("k", 1_u32, Duration::from_millis(30));

        thread::sleep(Duration::from_millis(60));
        assert!(cache.get("k").is_none());
        // Lazy removal happened on the failed get.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_served_before_expiry() {
        let cache = TtlCache::new();
        cache.set("k", 1_u32, Duration::from_secs(5));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_overwrite_is_last_writer_wins() {
        let cache = TtlCache::new();
        cache.set("k", 1_u32, Duration::from_secs(5));
        cache.set("k", 2_u32, Duration::from_secs(5));
        assert_eq!(cache.get("k").unwrap().value, 2);
    }

    #[test]
    fn test_overwrite_refreshes_ttl() {
        let cache = TtlCache::new();
        cache.set("k", 1_u32, Duration::from_millis(20));
        thread::sleep(Duration::from_millis(10));
        cache.set("k", 2_u32, Duration::from_secs(5));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k").unwrap().value, 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = TtlCache::new();
        cache.set("a", 1_u32, Duration::from_secs(5));
        cache.set("b", 2_u32, Duration::from_secs(5));

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fetched_at_survives_reads() {
        let cache = TtlCache::new();
        cache.set("k", 1_u32, Duration::from_secs(5));

        let first = cache.get("k").unwrap().fetched_at;
        thread::sleep(Duration::from_millis(20));
        let second = cache.get("k").unwrap().fetched_at;
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(TtlCache::new());
        let mut handles = Vec::new();

        for i in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for n in 0..200_u32 {
                    cache.set(format!("key:{}", i), n, Duration::from_secs(5));
                    let _ = cache.get(&format!("key:{}", (i + 1) % 4));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        for i in 0..4 {
            assert_eq!(cache.get(&format!("key:{}", i)).unwrap().value, 199);
        }
    }
}
