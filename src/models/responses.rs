//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::EntityRef;

/// Response body for `GET /image/:name`
#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub name: String,
    pub url: String,
}

/// Response body for `GET /featured`
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedResponse {
    /// Reference-timezone date the rotation belongs to
    pub date_key: String,
    pub members: Vec<EntityRef>,
}

/// Response body for `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub entities: NamespaceStats,
    pub images: NamespaceStats,
    /// Keys currently registered as missing
    pub negative_entries: usize,
}

/// Counters for one cache namespace.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceStats {
    pub hits: u64,
    pub mirror_hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<&CacheStats> for NamespaceStats {
    fn from(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            mirror_hits: stats.mirror_hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
