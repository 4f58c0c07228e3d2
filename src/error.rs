//! Error types for the disk-backed cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its HTTP front-end.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Capacity was zero or otherwise unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The backing store could not be opened or initialized
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Key is not tracked by the cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A durable transaction failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Key cannot be stored (empty or too long)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Stored bytes cannot be sent over the UTF-8 JSON API
    #[error("Value is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The cache has been closed
    #[error("Cache is closed")]
    Closed,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Builds a `NotFound` error, rendering the key lossily for display.
    pub(crate) fn not_found(key: &[u8]) -> Self {
        CacheError::NotFound(String::from_utf8_lossy(key).into_owned())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKey(_) | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidEncoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::StorageUnavailable(_) | CacheError::Closed => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::InvalidConfiguration(_)
            | CacheError::PersistenceFailure(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
