//! Pokedex Cache - caching and deduplication layer for a Pokédex catalog
//!
//! Resolves catalog entities and images through an expiring FIFO cache with
//! negative caching and a session mirror, and serves a deterministic daily
//! featured rotation.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod featured;
pub mod format;
pub mod models;
pub mod resolver;
pub mod service;
pub mod source;
pub mod tasks;

pub use api::AppState;
pub use cache::{normalize, CacheContext, SessionStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use models::{Entity, EntityRef};
pub use service::{Pokedex, PokedexBuilder};
pub use source::{CatalogSource, ImageProbe, PokeApiClient};
pub use tasks::spawn_cleanup_task;
