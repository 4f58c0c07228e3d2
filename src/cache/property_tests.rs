//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the disk cache against a simple reference LRU.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use tempfile::TempDir;

use crate::cache::{DiskCache, RecencyIndex};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_CAPACITY: usize = 8;

// == Reference Model ==
/// Linear-time LRU used as an oracle. Front = most recent.
#[derive(Debug, Default)]
struct ModelLru {
    order: VecDeque<Vec<u8>>,
    values: HashMap<Vec<u8>, Vec<u8>>,
    capacity: usize,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    fn touch(&mut self, key: &[u8]) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_vec());
    }

    fn add(&mut self, key: &[u8], value: &[u8]) {
        self.touch(key);
        self.values.insert(key.to_vec(), value.to_vec());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_back() {
                self.values.remove(&oldest);
            }
        }
    }

    fn get(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        let value = self.values.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }
}

// == Strategies ==
/// Small key space so that gets and overwrites hit existing keys often.
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    "[a-p]{1,2}".prop_map(String::into_bytes)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: Vec<u8>, value: Vec<u8> },
    Get { key: Vec<u8> },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

fn open_cache(capacity: usize) -> (TempDir, DiskCache) {
    let dir = TempDir::new().unwrap();
    let cache = DiskCache::open(capacity, dir.path().join("db")).unwrap();
    (dir, cache)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // The disk cache evicts exactly the keys a reference LRU evicts, and
    // returns the same values for every lookup.
    #[test]
    fn prop_matches_reference_lru(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (_dir, cache) = open_cache(TEST_CAPACITY);
        let mut model = ModelLru::new(TEST_CAPACITY);

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    cache.add(&key, &value).unwrap();
                    model.add(&key, &value);
                }
                CacheOp::Get { key } => {
                    match (cache.get(&key), model.get(&key)) {
                        (Ok(actual), Some(expected)) => {
                            prop_assert_eq!(actual, expected);
                        }
                        (Err(CacheError::NotFound(_)), None) => {}
                        (actual, expected) => {
                            prop_assert!(false, "get mismatch: {:?} vs {:?}", actual, expected);
                        }
                    }
                }
            }
            prop_assert_eq!(cache.len(), model.order.len());
        }
    }

    // Capacity is never exceeded, whatever the batch shapes.
    #[test]
    fn prop_capacity_enforcement(
        batches in prop::collection::vec(
            prop::collection::vec((key_strategy(), value_strategy()), 1..20),
            1..10
        )
    ) {
        let capacity = 5;
        let (_dir, cache) = open_cache(capacity);

        for batch in batches {
            cache.add_batch(batch).unwrap();
            prop_assert!(
                cache.len() <= capacity,
                "Cache size {} exceeds capacity {}",
                cache.len(),
                capacity
            );
        }
    }

    // After every committed batch the store holds exactly the tracked keys,
    // each with the last value written for it.
    #[test]
    fn prop_store_mirrors_index(
        batches in prop::collection::vec(
            prop::collection::vec(("[a-f]", value_strategy()), 1..12),
            1..10
        ),
        capacity in 1usize..5
    ) {
        let (_dir, cache) = open_cache(capacity);
        let mut last_written: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();

        for batch in batches {
            let batch: Vec<(Vec<u8>, Vec<u8>)> = batch
                .into_iter()
                .map(|(key, value)| (key.into_bytes(), value))
                .collect();
            for (key, value) in &batch {
                last_written.insert(key.clone(), value.clone());
            }
            cache.add_batch(batch).unwrap();

            let (tracked, stored) = cache.snapshot();
            prop_assert!(tracked.len() <= capacity);
            prop_assert_eq!(tracked.len(), stored.len());
            for key in &tracked {
                prop_assert_eq!(stored.get(key), last_written.get(key));
            }
        }
    }

    // Storing a pair and reading it back returns the exact bytes stored.
    #[test]
    fn prop_roundtrip_storage(
        key in prop::collection::vec(any::<u8>(), 1..64),
        value in prop::collection::vec(any::<u8>(), 0..1024)
    ) {
        let (_dir, cache) = open_cache(TEST_CAPACITY);

        cache.add(&key, &value).unwrap();
        prop_assert_eq!(cache.get(&key).unwrap(), value);
    }

    // Repeated reads return the same value and never change the size.
    #[test]
    fn prop_reads_are_idempotent(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..TEST_CAPACITY),
        reads in 1usize..5
    ) {
        let (_dir, cache) = open_cache(TEST_CAPACITY);
        cache.add_batch(entries.clone()).unwrap();
        let len = cache.len();

        for (key, value) in &entries {
            for _ in 0..reads {
                prop_assert_eq!(&cache.get(key).unwrap(), value);
                prop_assert_eq!(cache.len(), len);
            }
        }
    }

    // MultiGet returns exactly the stored subset of the requested keys.
    #[test]
    fn prop_multi_get_omits_absent_keys(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..TEST_CAPACITY),
        requested in prop::collection::vec(key_strategy(), 0..20)
    ) {
        let (_dir, cache) = open_cache(TEST_CAPACITY);
        cache.add_batch(entries.clone()).unwrap();

        let found = cache.multi_get(&requested).unwrap();

        for key in &requested {
            prop_assert_eq!(found.get(key), entries.get(key));
        }
        prop_assert!(found.keys().all(|key| requested.contains(key)));
    }

    // The recency index alone agrees with the reference ordering.
    #[test]
    fn prop_index_eviction_order(touches in prop::collection::vec(key_strategy(), 1..100)) {
        let mut index = RecencyIndex::new();
        let mut model = ModelLru::new(usize::MAX);

        for key in &touches {
            index.touch(key);
            model.touch(key);
        }

        let actual: Vec<Vec<u8>> = index.iter().map(<[u8]>::to_vec).collect();
        prop_assert_eq!(actual, Vec::from(model.order));
    }
}
