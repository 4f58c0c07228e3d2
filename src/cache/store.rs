//! Disk Cache Module
//!
//! Main cache engine: an in-memory recency index guarding which keys live in
//! the LMDB backing store, with LRU eviction once capacity is exceeded.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, info, warn};

use crate::cache::{BackingStore, CacheStats, RecencyIndex, MAX_KEY_LENGTH};
use crate::config::{Config, DEFAULT_MAP_SIZE};
use crate::error::{CacheError, Result};

/// Recency bookkeeping guarded by the cache's single index lock.
#[derive(Debug)]
struct IndexState {
    index: RecencyIndex,
    stats: CacheStats,
}

// == Disk Cache ==
/// Bounded LRU cache whose entries persist on disk.
///
/// Index mutations happen under one mutex per logical operation. The durable
/// transaction runs after that lock is released, so concurrent callers may
/// commit in a different order than their index updates landed.
pub struct DiskCache {
    /// Maximum number of keys retained
    capacity: usize,
    /// Store directory
    path: PathBuf,
    state: Mutex<IndexState>,
    /// `None` once the cache is closed
    store: RwLock<Option<BackingStore>>,
}

impl DiskCache {
    // == Constructor ==
    /// Opens a cache holding at most `capacity` keys, persisted at `path`.
    ///
    /// The recency index is rebuilt from the keys already on disk, in the
    /// store's key order: after a restart the lexicographically smallest key
    /// is the first to be evicted.
    pub fn open(capacity: usize, path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_map_size(capacity, path, DEFAULT_MAP_SIZE)
    }

    /// Opens a cache using every field of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open_with_map_size(config.capacity, &config.path, config.map_size)
    }

    /// Opens a cache whose store may grow up to `map_size` bytes on disk.
    pub fn open_with_map_size(
        capacity: usize,
        path: impl AsRef<Path>,
        map_size: usize,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "Capacity must be positive".to_string(),
            ));
        }

        let path = path.as_ref().to_path_buf();
        let store = BackingStore::open(&path, map_size)?;

        let mut index = RecencyIndex::with_capacity(capacity);
        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                store.close();
                return Err(e);
            }
        };
        for key in &keys {
            index.touch(key);
        }

        let mut stats = CacheStats::new();
        stats.set_total_entries(index.len());

        info!(
            "Opened disk cache at {:?}: capacity={}, rebuilt {} keys",
            path,
            capacity,
            index.len()
        );

        Ok(Self {
            capacity,
            path,
            state: Mutex::new(IndexState { index, stats }),
            store: RwLock::new(Some(store)),
        })
    }

    // == Add ==
    /// Stores a single key-value pair. See [`DiskCache::add_batch`].
    pub fn add(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        self.add_batch([(key, value)])
    }

    // == Add Batch ==
    /// Stores every pair in `entries`, evicting least recently used keys as
    /// needed, in a single durable transaction.
    ///
    /// Keys are validated before anything changes. If the transaction fails
    /// the recency index keeps its new state and the error is returned as
    /// [`CacheError::PersistenceFailure`].
    pub fn add_batch<K, V, I>(&self, entries: I) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        for (key, _) in &entries {
            validate_key(key.as_ref())?;
        }

        let guard = self.backing()?;
        let store = guard.as_ref().ok_or(CacheError::Closed)?;
        if entries.is_empty() {
            return Ok(());
        }

        let (evicted, writes) = {
            let mut state = self.lock_state();
            let mut evicted = Vec::new();

            for (key, _) in &entries {
                if !state.index.touch(key.as_ref()) {
                    continue;
                }
                while state.index.len() > self.capacity {
                    match state.index.evict_oldest() {
                        Some(oldest) => {
                            state.stats.record_eviction();
                            evicted.push(oldest);
                        }
                        None => break,
                    }
                }
            }

            // The transaction mirrors the index's final key set: keys evicted
            // and re-inserted within the batch stay, keys evicted for good
            // are never written.
            evicted.retain(|key| !state.index.contains(key));
            let writes: Vec<(&[u8], &[u8])> = entries
                .iter()
                .map(|(key, value)| (key.as_ref(), value.as_ref()))
                .filter(|(key, _)| state.index.contains(key))
                .collect();

            let len = state.index.len();
            state.stats.set_total_entries(len);
            (evicted, writes)
        };

        debug!(
            "Committing batch: {} writes, {} evictions",
            writes.len(),
            evicted.len()
        );

        store.commit(&evicted, &writes).map_err(|e| {
            warn!("Batch not persisted, recency index now ahead of the store: {e}");
            e
        })
    }

    // == Get ==
    /// Retrieves the value stored under `key`, marking it most recently used.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let key = key.as_ref();
        self.multi_get([key])?
            .remove(key)
            .ok_or_else(|| CacheError::not_found(key))
    }

    // == Multi Get ==
    /// Retrieves the values of every tracked key in `keys`.
    ///
    /// Each tracked key is promoted to most recently used; untracked keys are
    /// omitted from the result rather than reported as errors.
    pub fn multi_get<K, I>(&self, keys: I) -> Result<HashMap<Vec<u8>, Vec<u8>>>
    where
        K: AsRef<[u8]>,
        I: IntoIterator<Item = K>,
    {
        let guard = self.backing()?;
        let store = guard.as_ref().ok_or(CacheError::Closed)?;

        let present: Vec<Vec<u8>> = {
            let mut state = self.lock_state();
            let mut seen = HashSet::new();
            let mut present = Vec::new();

            for key in keys {
                let key = key.as_ref();
                if state.index.promote(key) {
                    state.stats.record_hit();
                    if seen.insert(key.to_vec()) {
                        present.push(key.to_vec());
                    }
                } else {
                    state.stats.record_miss();
                }
            }
            present
        };

        if present.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(store.fetch(&present)?.into_iter().collect())
    }

    // == Length ==
    /// Returns the number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.lock_state().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock_state();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.index.len());
        stats
    }

    // == Close ==
    /// Releases the backing store. Later reads and writes fail with
    /// [`CacheError::Closed`]. Closing twice is a no-op.
    pub fn close(&self) {
        let mut guard = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = guard.take() {
            store.close();
            info!("Closed disk cache at {:?}", self.path);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.backing().map(|guard| guard.is_none()).unwrap_or(true)
    }

    /// Tracked keys in recency order and every pair on disk, without
    /// promoting anything.
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> (Vec<Vec<u8>>, HashMap<Vec<u8>, Vec<u8>>) {
        let tracked = self.lock_state().index.iter().map(<[u8]>::to_vec).collect();
        let guard = self.backing().unwrap();
        let store = guard.as_ref().unwrap();
        let stored = store.fetch(&store.keys().unwrap()).unwrap();
        (tracked, stored.into_iter().collect())
    }

    fn backing(&self) -> Result<RwLockReadGuard<'_, Option<BackingStore>>> {
        self.store
            .read()
            .map_err(|_| CacheError::Internal("Store lock poisoned".to_string()))
    }

    fn lock_state(&self) -> MutexGuard<'_, IndexState> {
        // Index updates never unwind midway.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DiskCache {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DiskCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCache")
            .field("capacity", &self.capacity)
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

// == Key Validation ==
fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
