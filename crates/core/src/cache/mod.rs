pub mod clock;

use chrono::{DateTime, Duration, Utc};
use clock::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// String-keyed store whose entries expire independently.
///
/// `get` hands out a clone of the stored snapshot; an entry is never returned at or after its
/// expiry instant. Invalidation is whole-entry only.
pub struct TtlCache<V> {
    name: &'static str,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: &'static str, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            default_ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                tracing::debug!(cache = self.name, key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                tracing::debug!(cache = self.name, key, "cache entry expired");
                None
            }
            None => {
                tracing::debug!(cache = self.name, key, "cache miss");
                None
            }
        }
    }

    /// Stores `value` and drops every entry already expired, so keys that are never read
    /// again do not accumulate.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now < e.expires_at);
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!(cache = self.name, swept, "expired cache entries dropped");
        }
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    pub fn invalidate(&self, key: &str) {
        if self.lock().remove(key).is_some() {
            tracing::debug!(cache = self.name, key, "cache entry invalidated");
        }
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        let n = entries.len();
        entries.clear();
        tracing::debug!(cache = self.name, dropped = n, "cache flushed");
    }

    /// Live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.lock().values().filter(|e| now < e.expires_at).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn stored(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        // Entries are plain data; a panic elsewhere cannot leave one half-written.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clock::ManualClock;

    fn setup(ttl_secs: i64) -> (Arc<ManualClock>, TtlCache<String>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap(),
        ));
        let cache = TtlCache::new("test", Duration::seconds(ttl_secs), clock.clone());
        (clock, cache)
    }

    #[test]
    fn serves_until_ttl_then_misses() {
        let (clock, cache) = setup(300);
        cache.insert("$TSLA", "snapshot".to_string());

        clock.advance(Duration::seconds(299));
        assert_eq!(cache.get("$TSLA").as_deref(), Some("snapshot"));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get("$TSLA"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_expire_independently() {
        let (clock, cache) = setup(300);
        cache.insert("a", "1".to_string());
        clock.advance(Duration::seconds(200));
        cache.insert("b", "2".to_string());
        clock.advance(Duration::seconds(150));

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn explicit_ttl_overrides_default() {
        let (clock, cache) = setup(300);
        cache.set("short", "x".to_string(), Duration::seconds(5));
        clock.advance(Duration::seconds(5));
        assert_eq!(cache.get("short"), None);
    }

    #[test]
    fn invalidation_is_whole_entry() {
        let (_clock, cache) = setup(300);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());

        cache.invalidate("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);

        cache.invalidate_all();
        assert_eq!(cache.get("b"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_drops_expired_keys_that_are_never_read() {
        let (clock, cache) = setup(300);
        for i in 0..1_000 {
            cache.insert(format!("$K{i}"), "v".to_string());
            clock.advance(Duration::seconds(1));
        }
        // Only keys inserted in the last 300 s survive the rolling sweep.
        assert_eq!(cache.stored(), 300);

        clock.advance(Duration::seconds(1_000));
        cache.insert("$LAST", "v".to_string());
        assert_eq!(cache.stored(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_keeps_live_entries() {
        let (clock, cache) = setup(300);
        cache.insert("old", "1".to_string());
        clock.advance(Duration::seconds(200));
        cache.insert("young", "2".to_string());
        clock.advance(Duration::seconds(150));
        cache.insert("new", "3".to_string());

        assert_eq!(cache.stored(), 2);
        assert_eq!(cache.get("young").as_deref(), Some("2"));
    }

    #[test]
    fn overwrite_refreshes_expiry() {
        let (clock, cache) = setup(10);
        cache.insert("k", "old".to_string());
        clock.advance(Duration::seconds(8));
        cache.insert("k", "new".to_string());
        clock.advance(Duration::seconds(8));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }
}
