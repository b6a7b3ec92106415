//! Match cache: an explicit, injectable store for match lookups.
//!
//! Entries are keyed by `(entity id, limit)`, expire after a fixed TTL, and are
//! held in a bounded LRU map so a long-running process cannot grow without limit.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;

/// Source of the current time. Injected so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub entity_id: String,
    pub limit: u32,
}

impl MatchKey {
    pub fn new(entity_id: &str, limit: u32) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: MatchKey,
    pub payload: V,
    pub fetched_at: DateTime<Utc>,
}

/// Storage seam for match lookups. Swap the implementation to back it with a real store.
pub trait MatchCache<V>: Send + Sync {
    /// Returns the payload if a fresh entry exists.
    fn get(&self, key: &MatchKey) -> Option<V>;

    fn put(&self, key: MatchKey, payload: V);

    fn invalidate(&self, key: &MatchKey);
}

/// Bounded in-memory cache with a fixed time-to-live.
pub struct TtlCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<LruCache<MatchKey, CacheEntry<V>>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            clock,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<MatchKey, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V: Clone + Send> MatchCache<V> for TtlCache<V> {
    fn get(&self, key: &MatchKey) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let fresh = match entries.get(key) {
            Some(entry) => now - entry.fetched_at < self.ttl,
            None => return None,
        };
        if fresh {
            entries.get(key).map(|entry| entry.payload.clone())
        } else {
            entries.pop(key);
            None
        }
    }

    fn put(&self, key: MatchKey, payload: V) {
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            fetched_at: self.clock.now(),
        };
        self.lock().put(key, entry);
    }

    fn invalidate(&self, key: &MatchKey) {
        self.lock().pop(key);
    }
}

/// Clock advanced by hand in tests.
#[cfg(test)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        use chrono::TimeZone;
        Self(Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
