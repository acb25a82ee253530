//! In-memory cache manager with per-entry expiry
//!
//! Provides a `CacheManager` that stores serializable data as JSON values
//! together with an expiry timestamp. Each client constructs its own
//! manager, so there is no sharing between resource families.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Wrapper struct for cached data held in memory
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached data, stored as JSON so one cache can hold several shapes
    data: Value,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is usable only while `now < expires_at`
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Manages reading and writing time-boxed cache entries
///
/// Cloning a `CacheManager` shares the underlying map, so a cloned client
/// keeps hitting the same cache. There is no capacity bound and no sweeping:
/// entries live until they are overwritten, or until a lookup finds them
/// expired and drops them.
#[derive(Debug, Clone, Default)]
pub struct CacheManager {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl CacheManager {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the entry map, recovering from a poisoned lock since the map
    /// holds no invariants a panicking writer could break
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Writes data to the cache with the given time-to-live
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the entry (e.g., "rates:{...}")
    /// * `data` - The data to cache (must implement Serialize)
    /// * `ttl` - How long the entry should be considered fresh
    ///
    /// Data that cannot be represented as JSON is simply not cached.
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("cache: skipping write for {}: {}", key, e);
                return;
            }
        };

        let entry = CacheEntry {
            data,
            expires_at: Utc::now() + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Reads fresh data from the cache
    ///
    /// Returns `None` if the entry is missing, expired, or no longer parses as
    /// `T`. Expired entries are removed as a side effect.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        let now = Utc::now();

        let data = match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => entry.data.clone(),
            Some(_) => {
                entries.remove(key);
                log::debug!("cache: expired {}", key);
                return None;
            }
            None => return None,
        };
        drop(entries);

        serde_json::from_value(data).ok()
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a cache key from an operation name and its serialized parameters
pub fn cache_key<P: Serialize>(operation: &str, params: &P) -> String {
    let params = serde_json::to_string(params).unwrap_or_default();
    format!("{}:{}", operation, params)
}
