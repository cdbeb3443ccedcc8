//! API Module
//!
//! HTTP handlers and routing for the catalog cache.
//!
//! # Endpoints
//! - `GET /pokemon/:key` - Entity by name or id
//! - `GET /image/:name` - Display image URL
//! - `GET /featured` - Today's featured entries
//! - `DELETE /cache` - Clear all caches
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
