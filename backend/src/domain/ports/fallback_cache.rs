//! Port for the process-memory fallback cache.
//!
//! The cache masks replica lag and total store outages for reads that
//! immediately follow a write. It is best-effort: entries expire, the
//! number of entries is bounded, and nothing survives a restart.

/// Bounded, expiring key-value cache owned by a service.
///
/// Implementations must be safe to share across request handlers. Reads
/// never observe expired entries.
pub trait FallbackCache<K, V>: Send + Sync {
    /// Live value for `key`.
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace `key`. Replacing moves the entry to the newest
    /// position.
    fn insert(&self, key: K, value: V);

    /// Remove `key`, returning the live value if there was one.
    fn remove(&self, key: &K) -> Option<V>;

    /// Live values, oldest first.
    fn snapshot(&self) -> Vec<V>;
}
