//! In-memory TTL cache
//!
//! Explicitly constructed and injected into its consumers (rate limiter,
//! retrieval caches); there is no module-level singleton. Expiry is lazy:
//! entries are evicted when a read observes them expired. No capacity
//! eviction; callers own key cardinality.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe key/value store with per-entry time-to-live.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CachedEntry<V>>>,
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value that expires `ttl` from now.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CachedEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Returns the value if present and unexpired. An expired entry is
    /// evicted by the read and reported as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Read-modify-write under a single write lock.
    ///
    /// `f` receives the current unexpired value and returns the
    /// replacement (stored with `ttl`) plus a result passed back to the
    /// caller. Returning `None` leaves the entry untouched. This is what
    /// keeps concurrent rate-limit admissions from losing updates.
    pub async fn update<F, R>(&self, key: &str, ttl: Duration, f: F) -> R
    where
        F: FnOnce(Option<&V>) -> (Option<V>, R),
    {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let current = entries.get(key).filter(|entry| !entry.is_expired(now));
        let (replacement, result) = f(current.map(|entry| &entry.value));

        if let Some(value) = replacement {
            entries.insert(
                key.to_string(),
                CachedEntry {
                    value,
                    expires_at: now + ttl,
                },
            );
        }

        result
    }

    /// Removes an entry unconditionally; returns whether it existed.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of unexpired entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys of unexpired entries.
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Unexpired `(key, value)` pairs. Filters rather than evicts, so
    /// enumeration never mutates the cache.
    pub async fn entries(&self) -> Vec<(String, V)> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = TtlCache::new();
        cache.set("key1", "value1", Duration::from_secs(60)).await;

        assert_eq!(cache.get("key1").await, Some("value1"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_reported_absent() {
        let cache = TtlCache::new();
        cache.set("key1", "value1", Duration::from_millis(50)).await;

        assert!(cache.get("key1").await.is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get("key1").await.is_none());
        // The read evicted it.
        assert_eq!(cache.entries.read().await.len(), 0);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = TtlCache::new();
        cache.set("key1", 1u32, Duration::from_secs(60)).await;

        assert!(cache.remove("key1").await);
        assert!(!cache.remove("key1").await);
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_len_excludes_expired() {
        let cache = TtlCache::new();
        cache.set("short", 1u32, Duration::from_millis(50)).await;
        cache.set("long", 2u32, Duration::from_secs(60)).await;

        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_entries_filters_expired_without_evicting() {
        let cache = TtlCache::new();
        cache.set("short", 1u32, Duration::from_millis(50)).await;
        cache.set("long", 2u32, Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        let entries = cache.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "long");
        // Enumeration is a pure read; the expired entry is still stored.
        assert_eq!(cache.entries.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_update_inserts_when_absent() {
        let cache: TtlCache<Vec<i64>> = TtlCache::new();

        let count = cache
            .update("window", Duration::from_secs(60), |current| {
                assert!(current.is_none());
                (Some(vec![1]), 1usize)
            })
            .await;

        assert_eq!(count, 1);
        assert_eq!(cache.get("window").await, Some(vec![1]));
    }

    #[tokio::test]
    async fn test_update_none_leaves_entry_untouched() {
        let cache = TtlCache::new();
        cache.set("key1", 7u32, Duration::from_secs(60)).await;

        let seen = cache
            .update("key1", Duration::from_secs(60), |current| {
                (None, current.copied())
            })
            .await;

        assert_eq!(seen, Some(7));
        assert_eq!(cache.get("key1").await, Some(7));
    }

    #[tokio::test]
    async fn test_update_is_atomic_under_concurrency() {
        let cache: Arc<TtlCache<u64>> = Arc::new(TtlCache::new());
        let mut handles = Vec::new();

        for _ in 0..50 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache
                    .update("counter", Duration::from_secs(60), |current| {
                        let next = current.copied().unwrap_or(0) + 1;
                        (Some(next), ())
                    })
                    .await;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.get("counter").await, Some(50));
    }

    #[tokio::test]
    async fn test_keys_and_clear() {
        let cache = TtlCache::new();
        cache.set("a", 1u32, Duration::from_secs(60)).await;
        cache.set("b", 2u32, Duration::from_secs(60)).await;

        let mut keys = cache.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
