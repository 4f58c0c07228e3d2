//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for the batch SET operation (PUT /mset)
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSetRequest {
    /// Key/value pairs written in one transaction
    pub entries: HashMap<String, String>,
}

impl BatchSetRequest {
    pub fn validate(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("Entries cannot be empty".to_string());
        }
        self.entries.keys().find_map(|key| validate_key(key))
    }
}

/// Request body for the batch GET operation (POST /mget)
#[derive(Debug, Clone, Deserialize)]
pub struct MultiGetRequest {
    /// Keys to look up; unknown keys are omitted from the response
    pub keys: Vec<String>,
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
