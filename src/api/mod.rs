//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `PUT /mset` - Store several pairs in one transaction
//! - `GET /get/:key` - Retrieve a value by key
//! - `POST /mget` - Retrieve several values; unknown keys are omitted
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint
//!
//! Keys and values travel as UTF-8 JSON strings. Reading a value that is not
//! valid UTF-8 fails with 422 rather than altering its bytes.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
