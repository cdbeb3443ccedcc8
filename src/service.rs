//! Pokedex Service
//!
//! The caller-facing facade: entities, images, the featured rotation and
//! cache control. Nothing here returns an error.

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheContext, ContextStats, DurableMirror};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::featured::FeaturedSelector;
use crate::models::{Entity, EntityRef, FeaturedSet};
use crate::resolver::{EntityResolver, ImageResolver, ImageSources};
use crate::source::{CatalogSource, ImageProbe};

/// Builds a [`Pokedex`] with optional clock, mirror and image sources.
pub struct PokedexBuilder {
    config: Config,
    clock: Arc<dyn Clock>,
    mirror: Option<Arc<dyn DurableMirror>>,
    image_sources: ImageSources,
}

impl PokedexBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            mirror: None,
            image_sources: ImageSources::default(),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Backs both caches with a session-scoped mirror.
    pub fn mirror(mut self, mirror: Arc<dyn DurableMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn image_sources(mut self, sources: ImageSources) -> Self {
        self.image_sources = sources;
        self
    }

    pub fn build(self, source: Arc<dyn CatalogSource>, probe: Arc<dyn ImageProbe>) -> Pokedex {
        let context = Arc::new(CacheContext::new(
            &self.config,
            self.clock.clone(),
            self.mirror,
        ));

        let entities = Arc::new(
            EntityResolver::new(context.clone(), source.clone())
                .with_in_flight_dedup(self.config.dedupe_in_flight),
        );
        let images = ImageResolver::new(context.clone(), entities.clone(), probe)
            .with_sources(self.image_sources);
        let featured = FeaturedSelector::new(
            source,
            self.clock,
            self.config.reference_timezone,
            self.config.catalog_max_id,
        );

        Pokedex {
            context,
            entities,
            images,
            featured,
        }
    }
}

/// Cached access to the catalog.
pub struct Pokedex {
    context: Arc<CacheContext>,
    entities: Arc<EntityResolver>,
    images: ImageResolver,
    featured: FeaturedSelector,
}

impl Pokedex {
    pub fn builder(config: Config) -> PokedexBuilder {
        PokedexBuilder::new(config)
    }

    /// Formatted entity for a name or id, `None` if unknown or unreachable.
    pub async fn get_entity(&self, key: &str) -> Option<Entity> {
        self.entities.resolve(key).await
    }

    /// Display image URL. Always returns a URL.
    pub async fn get_image(
        &self,
        name: &str,
        id: Option<&str>,
        explicit_override: Option<&str>,
    ) -> String {
        self.images.resolve_image(name, id, explicit_override).await
    }

    /// Today's featured entries, at most `count`.
    pub async fn get_featured(&self, count: usize) -> Vec<EntityRef> {
        self.featured.get_featured(count).await
    }

    /// Today's featured entries together with the date they belong to.
    pub async fn get_featured_set(&self, count: usize) -> FeaturedSet {
        self.featured.get_featured_set(count).await
    }

    /// Reference-timezone date of the current rotation.
    pub fn featured_date_key(&self) -> String {
        self.featured.date_key()
    }

    /// Forgets cached entities, images and negative entries.
    pub fn clear_cache(&self) {
        self.context.clear_all();
        info!("catalog cache cleared");
    }

    pub fn stats(&self) -> ContextStats {
        self.context.stats()
    }

    pub fn context(&self) -> &Arc<CacheContext> {
        &self.context
    }
}
