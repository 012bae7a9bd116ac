use crate::types::Interval;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Cache key for a fetched series.
///
/// Two requests with the same provider, symbol, interval and lookback are
/// interchangeable within the TTL.
pub fn series_fingerprint(provider: &str, symbol: &str, interval: Interval, lookback: &str) -> String {
    format!("{}:{}:{}:{}", provider, symbol, interval.code(), lookback)
}

/// A thread-safe, caller-owned cache with TTL expiry.
pub struct Cache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> Cache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`; an expired entry is evicted on read.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.expires_at > Instant::now() {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.evict_expired(key);
        None
    }

    /// Remove `key` only if it is still expired, so a refresh that landed
    /// after the read survives.
    fn evict_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, e| e.expires_at <= now);
    }

    pub fn insert(&self, key: String, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, e)| e.value)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.expires_at > now);
    }

    /// Entry count, expired entries included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
