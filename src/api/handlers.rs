//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    ClearResponse, Entity, FeaturedQuery, FeaturedResponse, HealthResponse, ImageQuery,
    ImageResponse, NamespaceStats, StatsResponse,
};
use crate::service::Pokedex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pokedex: Arc<Pokedex>,
    /// Featured size used when the request does not give one
    pub featured_count: usize,
}

impl AppState {
    pub fn new(pokedex: Pokedex, featured_count: usize) -> Self {
        Self {
            pokedex: Arc::new(pokedex),
            featured_count,
        }
    }

    pub fn from_config(pokedex: Pokedex, config: &Config) -> Self {
        Self::new(pokedex, config.featured_count)
    }
}

/// Handler for GET /pokemon/:key
pub async fn entity_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Entity>, ApiError> {
    state
        .pokedex
        .get_entity(&key)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(key))
}

/// Handler for GET /image/:name
pub async fn image_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Json<ImageResponse> {
    let url = state
        .pokedex
        .get_image(&name, query.id.as_deref(), query.override_url.as_deref())
        .await;

    Json(ImageResponse { name, url })
}

/// Handler for GET /featured
pub async fn featured_handler(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<FeaturedResponse>, ApiError> {
    if let Some(error_msg) = query.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let count = query.count.unwrap_or(state.featured_count);
    let featured = state.pokedex.get_featured_set(count).await;

    Ok(Json(FeaturedResponse {
        date_key: featured.date_key,
        members: featured.members,
    }))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.pokedex.clear_cache();
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.pokedex.stats();

    Json(StatsResponse {
        entities: NamespaceStats::from(&stats.entities),
        images: NamespaceStats::from(&stats.images),
        negative_entries: stats.negative_entries,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
