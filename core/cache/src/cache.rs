//! FILENAME: core/cache/src/cache.rs
//! PURPOSE: The cache object handed to dataset and catalogue loaders.
//! CONTEXT: Entries never expire on their own. Callers flush by key or
//! wholesale, and decide staleness from `CacheEntry::fetched_at`. Store
//! faults are logged and read as misses so a broken cache only costs a
//! fetch.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use cube::log_warn;

use crate::key::CacheKey;
use crate::store::{CacheEntry, CacheStore, CachedPayload, MemoryStore};

/// Size and hit statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Hits over lookups, 0 when nothing was looked up.
    pub hit_rate: f64,
}

pub struct PayloadCache {
    store: Box<dyn CacheStore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl fmt::Debug for PayloadCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadCache")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for PayloadCache {
    fn default() -> Self {
        PayloadCache::in_memory()
    }
}

impl PayloadCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        PayloadCache {
            store: Box::new(store),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn in_memory() -> Self {
        PayloadCache::new(MemoryStore::new())
    }

    /// The entry for `key`, or `None` on a miss or store fault.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = match self.store.get(key) {
            Ok(entry) => entry,
            Err(e) => {
                log_warn!("CACHE", "get {} failed, treating as miss: {}", key, e);
                None
            }
        };
        let counter = if entry.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        entry
    }

    /// Stores `payload` stamped with the current time.
    pub fn put(&self, key: CacheKey, payload: impl Into<CachedPayload>) {
        self.put_entry(key, CacheEntry::new(payload, Utc::now()));
    }

    pub fn put_entry(&self, key: CacheKey, entry: CacheEntry) {
        let label = key.to_string();
        if let Err(e) = self.store.put(key, entry) {
            log_warn!("CACHE", "put {} failed, entry not cached: {}", label, e);
        }
    }

    /// Removes one entry, or every entry when `key` is `None`.
    pub fn flush(&self, key: Option<&CacheKey>) {
        let result = match key {
            Some(key) => self.store.remove(key).map(|_| ()),
            None => self.store.clear(),
        };
        if let Err(e) = result {
            log_warn!("CACHE", "flush failed: {}", e);
        }
    }

    pub fn info(&self) -> CacheInfo {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheInfo {
            size: self.store.len().unwrap_or_else(|e| {
                log_warn!("CACHE", "size unavailable: {}", e);
                0
            }),
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}
