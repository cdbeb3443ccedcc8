//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, entity_handler, featured_handler, health_handler, image_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /pokemon/:key` - Entity by name or id
/// - `GET /image/:name?id=&override=` - Display image URL
/// - `GET /featured?count=` - Today's featured entries
/// - `DELETE /cache` - Clear all caches
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pokemon/:key", get(entity_handler))
        .route("/image/:name", get(image_handler))
        .route("/featured", get(featured_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
