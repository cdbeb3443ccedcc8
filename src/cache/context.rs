//! Cache Context
//!
//! All mutable cache state of one session, built once and handed to the
//! resolvers. Locks are never held across an await point.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::{CacheStats, DurableMirror, ExpiringCache, NegativeRegistry};
use crate::clock::Clock;
use crate::config::Config;
use crate::models::Entity;

/// Mirror namespace of the entity cache.
pub const ENTITY_NAMESPACE: &str = "pokemon";

/// Mirror namespace of the image URL cache.
pub const IMAGE_NAMESPACE: &str = "image";

/// Snapshot of every cache's counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextStats {
    pub entities: CacheStats,
    pub images: CacheStats,
    pub negative_entries: usize,
}

/// Entity cache, image cache and negative registry of one session.
pub struct CacheContext {
    entities: Mutex<ExpiringCache<Entity>>,
    images: Mutex<ExpiringCache<String>>,
    negatives: Mutex<NegativeRegistry>,
    clock: Arc<dyn Clock>,
}

impl CacheContext {
    /// Builds the caches from `config`, optionally backed by `mirror`.
    pub fn new(
        config: &Config,
        clock: Arc<dyn Clock>,
        mirror: Option<Arc<dyn DurableMirror>>,
    ) -> Self {
        let mut entities = ExpiringCache::new(
            ENTITY_NAMESPACE,
            config.max_entries,
            config.entity_ttl(),
            clock.clone(),
        );
        let mut images = ExpiringCache::new(
            IMAGE_NAMESPACE,
            config.max_entries,
            config.image_ttl(),
            clock.clone(),
        );

        if let Some(mirror) = mirror {
            entities = entities.with_mirror(mirror.clone());
            images = images.with_mirror(mirror);
        }

        Self {
            entities: Mutex::new(entities),
            images: Mutex::new(images),
            negatives: Mutex::new(NegativeRegistry::new(config.catalog_max_id)),
            clock,
        }
    }

    pub fn entities(&self) -> MutexGuard<'_, ExpiringCache<Entity>> {
        self.entities.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn images(&self) -> MutexGuard<'_, ExpiringCache<String>> {
        self.images.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn negatives(&self) -> MutexGuard<'_, NegativeRegistry> {
        self.negatives.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Forgets every cached entity, image and negative entry.
    pub fn clear_all(&self) {
        self.entities().clear();
        self.images().clear();
        self.negatives().clear();
    }

    /// Purges expired entries from both caches, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.entities().cleanup_expired() + self.images().cleanup_expired()
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            entities: self.entities().stats(),
            images: self.images().stats(),
            negative_entries: self.negatives().len(),
        }
    }
}

impl std::fmt::Debug for CacheContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheContext")
            .field("entities", &*self.entities())
            .field("images", &*self.images())
            .field("negatives", &self.negatives().len())
            .finish()
    }
}
