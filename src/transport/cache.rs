use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

#[derive(Debug)]
struct CacheEntry {
    data: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < self.ttl
    }
}

/// TTL cache for unwrapped GET payloads.
///
/// Unbounded by design: entries leave only through TTL expiry (lazily, on
/// the next lookup) or an explicit clear. Never written on failure.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the cached payload while it is still within its TTL. An
    /// expired entry is evicted on this lookup.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_valid(Instant::now()) => {
                debug!("cache hit for {key}");
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!("cache entry expired for {key}");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn store(&self, key: String, data: Value, ttl: Option<Duration>) {
        debug!("cache store for {key}");
        self.lock().insert(
            key,
            CacheEntry {
                data,
                stored_at: Instant::now(),
                ttl: ttl.unwrap_or(self.default_ttl),
            },
        );
    }

    /// Evicts one entry, or every entry when no key is given.
    pub fn clear(&self, key: Option<&str>) {
        let mut entries = self.lock();
        match key {
            Some(key) => {
                entries.remove(key);
            }
            None => entries.clear(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}
