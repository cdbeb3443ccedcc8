//! Catalog models and HTTP DTOs

pub mod entity;
pub mod requests;
pub mod responses;

pub use entity::{Entity, EntityRef, FeaturedSet};
pub use requests::{FeaturedQuery, ImageQuery, MAX_FEATURED_COUNT};
pub use responses::{
    ClearResponse, FeaturedResponse, HealthResponse, ImageResponse, NamespaceStats, StatsResponse,
};
