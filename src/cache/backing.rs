//! Backing Store Module
//!
//! Thin adapter over an LMDB environment holding the single `cache` database.
//! Every live cache entry is persisted here; recency is not.

use std::path::Path;

use heed::types::ByteSlice;
use heed::{Database, Env, EnvOpenOptions};
use tracing::warn;

use crate::error::{CacheError, Result};

/// Name of the LMDB database holding the cached pairs.
const DATABASE_NAME: &str = "cache";

// == Backing Store ==
/// Durable key/value storage for cache entries.
pub struct BackingStore {
    env: Env,
    db: Database<ByteSlice, ByteSlice>,
}

impl BackingStore {
    // == Open ==
    /// Opens (or creates) the store directory at `path` and its `cache` database.
    pub fn open(path: &Path, map_size: usize) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            CacheError::StorageUnavailable(format!("Cannot create store at {path:?}: {e}"))
        })?;

        let env = EnvOpenOptions::new()
            .map_size(map_size)
            .max_dbs(1)
            .open(path)
            .map_err(|e| {
                CacheError::StorageUnavailable(format!("Error opening store at {path:?}: {e}"))
            })?;

        let db = env
            .create_database(Some(DATABASE_NAME))
            .map_err(|e| {
                CacheError::StorageUnavailable(format!("Error creating database {DATABASE_NAME}: {e}"))
            })?;

        Ok(Self { env, db })
    }

    // == Keys ==
    /// Lists every stored key in LMDB order (lexicographic by bytes).
    pub fn keys(&self) -> Result<Vec<Vec<u8>>> {
        let rtxn = self.env.read_txn().map_err(storage_unavailable)?;
        let keys = self
            .db
            .iter(&rtxn)
            .map_err(storage_unavailable)?
            .map(|item| item.map(|(key, _)| key.to_vec()))
            .collect::<heed::Result<Vec<_>>>()
            .map_err(storage_unavailable)?;
        Ok(keys)
    }

    // == Fetch ==
    /// Reads the values of `keys` in one read transaction.
    ///
    /// Keys missing from the store are skipped.
    pub fn fetch(&self, keys: &[Vec<u8>]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let rtxn = self.env.read_txn().map_err(persistence_failure)?;

        let mut found = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.db.get(&rtxn, key.as_slice()).map_err(persistence_failure)? {
                found.push((key.clone(), value.to_vec()));
            }
        }
        Ok(found)
    }

    // == Commit ==
    /// Deletes `evicted` then writes `entries`, all in one write transaction.
    ///
    /// Nothing is applied unless the whole transaction commits.
    pub fn commit(&self, evicted: &[Vec<u8>], entries: &[(&[u8], &[u8])]) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(persistence_failure)?;

        for key in evicted {
            self.db
                .delete(&mut wtxn, key.as_slice())
                .map_err(persistence_failure)?;
        }
        for &(key, value) in entries {
            self.db.put(&mut wtxn, key, value).map_err(persistence_failure)?;
        }

        wtxn.commit().map_err(persistence_failure)
    }

    // == Close ==
    /// Closes the environment and waits until LMDB has released it, so the
    /// same path can be reopened by this process.
    pub fn close(self) {
        let closing_event = self.env.prepare_for_closing();
        closing_event.wait();
    }
}

fn storage_unavailable(e: heed::Error) -> CacheError {
    CacheError::StorageUnavailable(format!("Cache database error: {e}"))
}

fn persistence_failure(e: heed::Error) -> CacheError {
    let msg = format!("Cache database error: {e}");
    warn!("{msg}");
    CacheError::PersistenceFailure(msg)
}
