//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default LMDB map size (64 MiB). Must stay a multiple of the OS page size.
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of keys the cache retains
    pub capacity: usize,
    /// Directory holding the LMDB environment
    pub path: PathBuf,
    /// Upper bound on the on-disk size of the store, in bytes
    pub map_size: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cached keys (default: 1000)
    /// - `CACHE_PATH` - Store directory (default: ./disk_lru.db)
    /// - `CACHE_MAP_SIZE` - LMDB map size in bytes (default: 64 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            path: env::var("CACHE_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            map_size: env::var("CACHE_MAP_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.map_size),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            path: PathBuf::from("./disk_lru.db"),
            map_size: DEFAULT_MAP_SIZE,
            server_port: 3000,
        }
    }
}
