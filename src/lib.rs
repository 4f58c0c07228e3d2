//! Disk LRU - A bounded LRU cache backed by LMDB
//!
//! Keeps recency bookkeeping in memory and every live entry on disk, so the
//! cache contents survive process restarts.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::DiskCache;
pub use config::Config;
pub use error::{CacheError, Result};
