//! In-process fallback cache with bounded size and entry TTL.
//!
//! Entries live in insertion order inside a mutex-guarded vector. Lookups are
//! linear scans; the cache is small by construction. Expired entries are
//! purged on every access, and inserting beyond capacity evicts the oldest
//! entry.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::FallbackCache;

struct Entry<K, V> {
    key: K,
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Bounded, expiring [`FallbackCache`] implementation.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use mockable::DefaultClock;
/// use pawprint::domain::ports::FallbackCache;
/// use pawprint::outbound::cache::TtlCache;
///
/// let cache = TtlCache::new(
///     NonZeroUsize::new(2).unwrap(),
///     Duration::from_secs(60),
///     Arc::new(DefaultClock),
/// );
/// cache.insert("a", 1);
/// assert_eq!(cache.get(&"a"), Some(1));
/// ```
pub struct TtlCache<K, V> {
    entries: Mutex<Vec<Entry<K, V>>>,
    capacity: NonZeroUsize,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V> {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: NonZeroUsize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
            ttl,
            clock,
        }
    }

    /// Lock the entries and drop anything past its TTL.
    fn live(&self) -> MutexGuard<'_, Vec<Entry<K, V>>> {
        // A poisoned lock only means another handler panicked mid-update;
        // the vector itself is still structurally valid.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = self.clock.utc();
        let before = entries.len();
        entries.retain(|entry| now.signed_duration_since(entry.inserted_at) < self.ttl);
        let expired = before - entries.len();
        if expired > 0 {
            debug!(expired, "purged expired fallback cache entries");
        }
        entries
    }
}

impl<K, V> FallbackCache<K, V> for TtlCache<K, V>
where
    K: PartialEq + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.live()
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| entry.value.clone())
    }

    fn insert(&self, key: K, value: V) {
        let now = self.clock.utc();
        let mut entries = self.live();
        entries.retain(|entry| entry.key != key);
        while entries.len() >= self.capacity.get() {
            entries.remove(0);
            debug!(capacity = self.capacity.get(), "evicted oldest fallback cache entry");
        }
        entries.push(Entry {
            key,
            value,
            inserted_at: now,
        });
    }

    fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.live();
        let index = entries.iter().position(|entry| &entry.key == key)?;
        Some(entries.remove(index).value)
    }

    fn snapshot(&self) -> Vec<V> {
        self.live().iter().map(|entry| entry.value.clone()).collect()
    }
}
