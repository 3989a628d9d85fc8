//! FILENAME: tests/test_cache.rs
//! Integration tests for the payload cache.

use std::sync::Arc;
use std::thread;

use chrono::Utc;
use cube::FilterSpec;
use payload_cache::{CacheEntry, CacheError, CacheKey, CacheStore, PayloadCache};
use pivot_engine::PivotFormat;
use serde_json::json;

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<PayloadCache>;
};

fn key(table: &str) -> CacheKey {
    CacheKey::dataset(table, &FilterSpec::new(), PivotFormat::Long)
}

/// A store whose every operation fails.
struct BrokenStore;

impl CacheStore for BrokenStore {
    fn get(&self, _key: &CacheKey) -> payload_cache::Result<Option<CacheEntry>> {
        Err(CacheError::Poisoned)
    }

    fn put(&self, _key: CacheKey, _entry: CacheEntry) -> payload_cache::Result<()> {
        Err(CacheError::Store("disk full".to_string()))
    }

    fn remove(&self, _key: &CacheKey) -> payload_cache::Result<bool> {
        Err(CacheError::Poisoned)
    }

    fn clear(&self) -> payload_cache::Result<()> {
        Err(CacheError::Poisoned)
    }

    fn len(&self) -> payload_cache::Result<usize> {
        Err(CacheError::Poisoned)
    }
}

#[test]
fn test_flush_by_key_removes_only_that_entry() {
    let cache = PayloadCache::in_memory();
    cache.put(key("FY003A"), json!({"a": 1}));
    cache.put(key("MUM01"), json!({"b": 2}));

    cache.flush(Some(&key("FY003A")));
    assert!(cache.get(&key("FY003A")).is_none());
    assert!(cache.get(&key("MUM01")).is_some());
}

#[test]
fn test_concurrent_put_then_flush_leaves_nothing() {
    let cache = Arc::new(PayloadCache::in_memory());
    thread::scope(|scope| {
        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for round in 0..50 {
                    cache.put(key("FY003A"), json!({"worker": worker, "round": round}));
                    let _ = cache.get(&key("FY003A"));
                    cache.flush(Some(&key("FY003A")));
                }
            });
        }
    });

    assert!(cache.get(&key("FY003A")).is_none());
    assert_eq!(cache.info().size, 0);
}

#[test]
fn test_flush_all_clears_every_entry() {
    let cache = PayloadCache::in_memory();
    cache.put(key("FY003A"), json!({"a": 1}));
    cache.put(CacheKey::collection(None), json!({"link": {"item": []}}));

    cache.flush(None);
    assert!(cache.get(&key("FY003A")).is_none());
    assert!(cache.get(&CacheKey::collection(None)).is_none());
    assert_eq!(cache.info().size, 0);
}

#[test]
fn test_equivalent_filters_hit_the_same_entry() {
    let cache = PayloadCache::in_memory();
    let written = FilterSpec::new().with("County", ["Dublin", "Cork"]);
    let reordered = FilterSpec::new().with("County", ["Cork", "Dublin"]);

    cache.put(CacheKey::dataset("fy003a", &written, PivotFormat::Wide), json!(1));
    let entry = cache
        .get(&CacheKey::dataset("FY003A", &reordered, PivotFormat::Wide))
        .unwrap();
    assert_eq!(entry.payload.as_raw(), Some(&json!(1)));
}

#[test]
fn test_info_counts_hits_and_misses() {
    let cache = PayloadCache::in_memory();
    cache.put(key("FY003A"), json!({}));
    cache.get(&key("FY003A"));
    cache.get(&key("FY003A"));
    cache.get(&key("MUM01"));

    let info = cache.info();
    assert_eq!(info.size, 1);
    assert_eq!(info.hits, 2);
    assert_eq!(info.misses, 1);
    assert!((info.hit_rate - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_fetch_time_is_recorded() {
    let cache = PayloadCache::in_memory();
    let before = Utc::now();
    cache.put(key("FY003A"), json!({}));
    let entry = cache.get(&key("FY003A")).unwrap();
    assert!(entry.fetched_at >= before);
    assert!(entry.is_stale(entry.fetched_at + chrono::Duration::hours(1)));
}

#[test]
fn test_store_faults_degrade_to_misses() {
    let cache = PayloadCache::new(BrokenStore);
    cache.put(key("FY003A"), json!({}));
    assert!(cache.get(&key("FY003A")).is_none());
    cache.flush(None);

    let info = cache.info();
    assert_eq!(info.size, 0);
    assert_eq!(info.misses, 1);
}
