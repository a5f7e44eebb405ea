// Query cache with staleness
//
// Values are stored as JSON so one cache serves every response type. An entry
// older than `stale_time` is never returned.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use web_time::Instant;

struct CacheEntry {
    value: serde_json::Value,
    fetched_at: Instant,
}

pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_time,
        }
    }

    /// Cached value for `key` if it is still fresh.
    pub fn get_fresh(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() < self.stale_time {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: serde_json::Value) {
        self.entries.write().insert(
            key.into(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop every key starting with `prefix`. Returns how many were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_hit() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert("builds", json!([1]));
        assert_eq!(cache.get_fresh("builds"), Some(json!([1])));
        assert_eq!(cache.get_fresh("other"), None);
    }

    #[test]
    fn test_zero_stale_time_never_hits() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert("builds", json!([1]));
        assert_eq!(cache.get_fresh("builds"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_prefix() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert("builds", json!(1));
        cache.insert("builds:42", json!(2));
        cache.insert("session", json!(3));

        assert_eq!(cache.invalidate_prefix("builds"), 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
