//! Cache Module
//!
//! Provides a bounded LRU cache whose entries are persisted in LMDB.

mod backing;
mod recency;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Only the facade and its stats are public; the index and store stay internal.
pub(crate) use backing::BackingStore;
pub(crate) use recency::RecencyIndex;
pub use stats::CacheStats;
pub use store::DiskCache;

// == Public Constants ==
/// Maximum allowed key length in bytes (LMDB's default key size limit)
pub const MAX_KEY_LENGTH: usize = 511;
