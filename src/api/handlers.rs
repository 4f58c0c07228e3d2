//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::DiskCache;
use crate::error::{CacheError, Result};
use crate::models::{
    BatchSetRequest, BatchSetResponse, GetResponse, HealthResponse, MultiGetRequest,
    MultiGetResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache synchronizes internally, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DiskCache>,
}

impl AppState {
    /// Creates a new AppState around an open cache.
    pub fn new(cache: DiskCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the cache described by the Config.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::new(DiskCache::from_config(config)?))
    }
}

/// Runs a cache operation on the blocking pool; LMDB transactions do disk I/O.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&DiskCache) -> Result<T> + Send + 'static,
{
    let cache = state.cache.clone();
    tokio::task::spawn_blocking(move || op(&cache))
        .await
        .map_err(|e| CacheError::Internal(format!("Cache task failed: {e}")))?
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = req.key.clone();
    run_blocking(&state, move |cache| cache.add(&req.key, &req.value)).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for PUT /mset
///
/// Stores every pair of the request in one transaction.
pub async fn batch_set_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchSetRequest>,
) -> Result<Json<BatchSetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let count = req.entries.len();
    run_blocking(&state, move |cache| cache.add_batch(req.entries)).await?;

    Ok(Json(BatchSetResponse::new(count)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = run_blocking(&state, move |cache| cache.get(&lookup)).await?;

    Ok(Json(GetResponse::new(key, &value)?))
}

/// Handler for POST /mget
///
/// Retrieves every cached key of the request; unknown keys are left out.
pub async fn multi_get_handler(
    State(state): State<AppState>,
    Json(req): Json<MultiGetRequest>,
) -> Result<Json<MultiGetResponse>> {
    let found = run_blocking(&state, move |cache| cache.multi_get(&req.keys)).await?;

    Ok(Json(MultiGetResponse::new(found)?))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(&stats, state.cache.capacity()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    if state.cache.is_closed() {
        Json(HealthResponse::closed())
    } else {
        Json(HealthResponse::healthy())
    }
}
