use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Keyed cache where entries expire after a fixed TTL.
///
/// Expired entries are dropped lazily on lookup.
pub struct TtlCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl_secs: i64,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    pub fn insert(&self, key: impl Into<String>, data: T) {
        self.insert_at(key, data, Utc::now());
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        if let Some(entry) = self.entries.get(key) {
            let age = (now - entry.cached_at).num_seconds();
            if age < self.ttl_secs {
                return Some(entry.data.clone());
            }
        }
        // Stale or missing
        self.entries.remove(key);
        None
    }

    fn insert_at(&self, key: impl Into<String>, data: T, now: DateTime<Utc>) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                data,
                cached_at: now,
            },
        );
    }
}
