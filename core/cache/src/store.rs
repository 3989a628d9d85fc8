//! FILENAME: core/cache/src/store.rs
//! PURPOSE: Cached payloads and the storage seam behind the cache.
//! CONTEXT: The persistence medium is injected. `MemoryStore` keeps
//! entries behind one lock, which serialises get/put/flush on every key so
//! a flush cannot race a put and resurrect stale data.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde_json::Value;

use pivot_engine::Table;

use crate::error::{CacheError, Result};
use crate::key::CacheKey;

// ============================================================================
// ENTRIES
// ============================================================================

/// What the cache holds: the raw parsed payload, or a finished table.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    Raw(Arc<Value>),
    Table(Arc<Table>),
}

impl CachedPayload {
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            CachedPayload::Raw(value) => Some(value),
            CachedPayload::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            CachedPayload::Table(table) => Some(table),
            CachedPayload::Raw(_) => None,
        }
    }
}

impl From<Value> for CachedPayload {
    fn from(value: Value) -> Self {
        CachedPayload::Raw(Arc::new(value))
    }
}

impl From<Table> for CachedPayload {
    fn from(table: Table) -> Self {
        CachedPayload::Table(Arc::new(table))
    }
}

/// A payload and the moment it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: CachedPayload,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: impl Into<CachedPayload>, fetched_at: DateTime<Utc>) -> Self {
        CacheEntry {
            payload: payload.into(),
            fetched_at,
        }
    }

    /// True when the source reports an update after this entry was fetched.
    pub fn is_stale(&self, last_updated: DateTime<Utc>) -> bool {
        last_updated > self.fetched_at
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Storage behind a `PayloadCache`.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<()>;

    /// Removes one entry, returning whether it existed.
    fn remove(&self, key: &CacheKey) -> Result<bool>;

    fn clear(&self) -> Result<()>;

    fn len(&self) -> Result<usize>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<CacheKey, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, FxHashMap<CacheKey, CacheEntry>>> {
        self.entries.lock().map_err(|_| CacheError::Poisoned)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<()> {
        self.lock()?.insert(key, entry);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cube::FilterSpec;
    use pivot_engine::PivotFormat;
    use serde_json::json;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let key = CacheKey::dataset("FY003A", &FilterSpec::new(), PivotFormat::Long);
        let entry = CacheEntry::new(json!({"id": []}), Utc::now());

        store.put(key.clone(), entry.clone()).unwrap();
        assert_eq!(store.get(&key).unwrap(), Some(entry));
        assert!(store.remove(&key).unwrap());
        assert!(!store.remove(&key).unwrap());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn staleness_compares_to_fetch_time() {
        let fetched = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry::new(json!(null), fetched);
        assert!(entry.is_stale(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()));
        assert!(!entry.is_stale(fetched));
    }
}
