//! Integration Tests for durability and shared access
//!
//! Exercises the cache across close/reopen cycles and from several threads.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use disk_lru::{CacheError, DiskCache};
use tempfile::TempDir;

#[test]
fn test_eviction_then_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db");

    let cache = DiskCache::open(128, &path).unwrap();
    for i in 0..256 {
        let kv = i.to_string();
        cache.add(&kv, &kv).unwrap();
    }
    assert_eq!(cache.len(), 128);

    for i in 0..128 {
        let result = cache.get(i.to_string());
        assert!(
            matches!(result, Err(CacheError::NotFound(_))),
            "key {i} should be evicted"
        );
    }
    for i in 128..256 {
        let k = i.to_string();
        assert_eq!(cache.get(&k).unwrap(), k.as_bytes(), "key {i} should be cached");
    }
    cache.close();

    let cache = DiskCache::open(128, &path).unwrap();
    assert_eq!(cache.len(), 128);
    for i in 128..256 {
        let k = i.to_string();
        assert_eq!(cache.get(&k).unwrap(), k.as_bytes(), "key {i} lost on restart");
    }
}

#[test]
fn test_durability_below_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db");

    let expected: HashMap<Vec<u8>, Vec<u8>> = (0u32..50)
        .map(|i| (format!("key-{i}").into_bytes(), i.to_be_bytes().to_vec()))
        .collect();

    {
        let cache = DiskCache::open(64, &path).unwrap();
        cache.add_batch(expected.clone()).unwrap();
    }

    let cache = DiskCache::open(64, &path).unwrap();
    assert_eq!(cache.len(), expected.len());
    let found = cache.multi_get(expected.keys()).unwrap();
    assert_eq!(found, expected);
}

#[test]
fn test_reads_do_not_change_len() {
    let dir = TempDir::new().unwrap();
    let cache = DiskCache::open(4, dir.path().join("db")).unwrap();

    cache.add("k", "v").unwrap();
    for _ in 0..10 {
        assert_eq!(cache.get("k").unwrap(), b"v");
        assert!(cache.get("other").is_err());
        assert_eq!(cache.len(), 1);
    }
}

#[test]
fn test_concurrent_writers_respect_capacity() {
    let dir = TempDir::new().unwrap();
    let capacity = 32;
    let cache = Arc::new(DiskCache::open(capacity, dir.path().join("db")).unwrap());

    thread::scope(|scope| {
        for t in 0..4 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..100 {
                    let key = format!("t{t}-{i}");
                    cache.add(&key, &key).unwrap();
                    let _ = cache.multi_get([key.as_str(), "t0-0"]).unwrap();
                    assert!(cache.len() <= capacity);
                }
            });
        }
    });

    assert_eq!(cache.len(), capacity);
    assert_eq!(cache.stats().evictions, 400 - capacity as u64);

    // Whatever survived must carry its own value
    let keys: Vec<String> = (0..4)
        .flat_map(|t| (0..100).map(move |i| format!("t{t}-{i}")))
        .collect();
    for (key, value) in cache.multi_get(&keys).unwrap() {
        assert_eq!(key, value);
    }
}

#[test]
fn test_open_with_zero_capacity() {
    let dir = TempDir::new().unwrap();
    let result = DiskCache::open(0, dir.path().join("db"));
    assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
}

#[test]
fn test_reopen_after_drop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db");

    {
        let cache = DiskCache::open(8, &path).unwrap();
        cache.add("persisted", "yes").unwrap();
    }

    let cache = DiskCache::open(8, &path).unwrap();
    assert_eq!(cache.get("persisted").unwrap(), b"yes");
}
