use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::Serialize;

/// What is known about a key's resource in the authoritative store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// The resource exists.
    Present,
    /// The last attempt to find or create the resource failed.
    Absent,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    state: Presence,
    expires_at: Instant,
}

/// Expires each entry at its own deadline, so Present and Absent entries can
/// share one cache with different lifetimes.
struct EntryExpiry;

fn remaining(now: Instant, deadline: Instant) -> Option<Duration> {
    Some(deadline.checked_duration_since(now).unwrap_or_default())
}

impl<K> moka::Expiry<K, CacheEntry> for EntryExpiry {
    fn expire_after_create(&self, _key: &K, value: &CacheEntry, now: Instant) -> Option<Duration> {
        remaining(now, value.expires_at)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        value: &CacheEntry,
        now: Instant,
        _current: Option<Duration>,
    ) -> Option<Duration> {
        remaining(now, value.expires_at)
    }
}

/// Short-lived record of keys confirmed present, or recently failed.
///
/// A miss (`None`) means unknown. Absent entries double as a retry timer: while
/// one is live, callers should not hit the store again for that key.
#[derive(Clone)]
pub struct PresenceCache<K> {
    entries: moka::sync::Cache<K, CacheEntry>,
    present_ttl: Duration,
    absent_ttl: Duration,
}

impl<K> PresenceCache<K>
where
    K: Hash + Eq + Send + Sync + 'static,
{
    pub fn new(present_ttl: Duration, absent_ttl: Duration, max_entries: u64) -> Self {
        let entries = moka::sync::Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();

        Self {
            entries,
            present_ttl,
            absent_ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<Presence> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.state)
    }

    pub fn mark_present(&self, key: K) {
        self.insert(key, Presence::Present, self.present_ttl);
    }

    pub fn mark_absent(&self, key: K) {
        self.insert(key, Presence::Absent, self.absent_ttl);
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.invalidate(key);
    }

    fn insert(&self, key: K, state: Presence, ttl: Duration) {
        let entry = CacheEntry {
            state,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn cache(present: u64, absent: u64) -> PresenceCache<String> {
        PresenceCache::new(
            Duration::from_millis(present),
            Duration::from_millis(absent),
            100,
        )
    }

    #[test]
    fn unknown_keys_miss() {
        let cache = cache(1_000, 1_000);
        assert_eq!(cache.get(&"nobody".to_string()), None);
    }

    #[test]
    fn present_and_absent_are_distinguished() {
        let cache = cache(10_000, 10_000);
        cache.mark_present("a".to_string());
        cache.mark_absent("b".to_string());

        assert_eq!(cache.get(&"a".to_string()), Some(Presence::Present));
        assert_eq!(cache.get(&"b".to_string()), Some(Presence::Absent));
    }

    #[test]
    fn absent_entries_expire_before_present_ones() {
        let cache = cache(10_000, 50);
        cache.mark_present("a".to_string());
        cache.mark_absent("b".to_string());

        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.get(&"a".to_string()), Some(Presence::Present));
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn success_overrides_earlier_failure() {
        let cache = cache(10_000, 10_000);
        cache.mark_absent("a".to_string());
        cache.mark_present("a".to_string());
        assert_eq!(cache.get(&"a".to_string()), Some(Presence::Present));

        cache.invalidate(&"a".to_string());
        assert_eq!(cache.get(&"a".to_string()), None);
    }
}
