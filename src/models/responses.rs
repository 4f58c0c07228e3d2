//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse; fails if the stored bytes are not UTF-8
    pub fn new(key: impl Into<String>, value: &[u8]) -> Result<Self> {
        let key = key.into();
        let value = decode_value(&key, value.to_vec())?;
        Ok(Self { key, value })
    }
}

/// Response body for the batch GET operation (POST /mget)
#[derive(Debug, Clone, Serialize)]
pub struct MultiGetResponse {
    /// Found keys and their values; absent keys are omitted
    pub entries: HashMap<String, String>,
}

impl MultiGetResponse {
    /// Fails on the first key or value that is not UTF-8.
    pub fn new(found: HashMap<Vec<u8>, Vec<u8>>) -> Result<Self> {
        let entries = found
            .into_iter()
            .map(|(key, value)| {
                let key = String::from_utf8(key).map_err(|e| {
                    CacheError::InvalidEncoding(
                        String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    )
                })?;
                let value = decode_value(&key, value)?;
                Ok((key, value))
            })
            .collect::<Result<_>>()?;
        Ok(Self { entries })
    }
}

// The JSON API carries values as strings; bytes that are not UTF-8 are
// refused instead of being rewritten.
fn decode_value(key: &str, value: Vec<u8>) -> Result<String> {
    String::from_utf8(value).map_err(|_| CacheError::InvalidEncoding(key.to_string()))
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the batch SET operation (PUT /mset)
#[derive(Debug, Clone, Serialize)]
pub struct BatchSetResponse {
    /// Success message
    pub message: String,
    /// Number of pairs written
    pub count: usize,
}

impl BatchSetResponse {
    pub fn new(count: usize) -> Self {
        Self {
            message: format!("{} keys set successfully", count),
            count,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of keys found by lookups
    pub hits: u64,
    /// Number of keys requested but not cached
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of keys in cache
    pub total_entries: usize,
    /// Maximum number of keys retained
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, capacity: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            capacity,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy" or "closed")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self::with_status("healthy")
    }

    pub fn closed() -> Self {
        Self::with_status("closed")
    }

    fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
