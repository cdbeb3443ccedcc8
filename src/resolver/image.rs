//! Image Resolver
//!
//! Picks the display image for an entity: caller override, cache, then a
//! probed chain of upstream sprite sources ending at a local sentinel.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{normalize, CacheContext};
use crate::format::parse_id;
use crate::models::Entity;
use crate::resolver::EntityResolver;
use crate::source::ImageProbe;

/// Local asset served when no real image can be found.
pub const SENTINEL_IMAGE: &str = "/images/unknown-pokemon.png";

const SPRITE_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Where image URLs are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSources {
    /// High quality artwork, `{base}/{id}.png`
    pub primary_base: String,
    /// Lower quality but broadly available sprite, `{base}/{id}.png`
    pub secondary_base: String,
    /// Always-available fallback
    pub sentinel: String,
}

impl Default for ImageSources {
    fn default() -> Self {
        Self {
            primary_base: format!("{}/other/official-artwork", SPRITE_BASE),
            secondary_base: SPRITE_BASE.to_string(),
            sentinel: SENTINEL_IMAGE.to_string(),
        }
    }
}

impl ImageSources {
    pub fn primary(&self, id: u32) -> String {
        format!("{}/{}.png", self.primary_base, id)
    }

    pub fn secondary(&self, id: u32) -> String {
        format!("{}/{}.png", self.secondary_base, id)
    }
}

/// Outcome of walking the source chain.
enum Probed {
    /// Every probe answered; the URL may be cached.
    Settled(String),
    /// A probe errored before the chain settled; the URL is for this call only.
    Unsettled(String),
}

/// Resolves display image URLs. Always returns a URL.
pub struct ImageResolver {
    context: Arc<CacheContext>,
    entities: Arc<EntityResolver>,
    probe: Arc<dyn ImageProbe>,
    sources: ImageSources,
}

impl ImageResolver {
    pub fn new(
        context: Arc<CacheContext>,
        entities: Arc<EntityResolver>,
        probe: Arc<dyn ImageProbe>,
    ) -> Self {
        Self {
            context,
            entities,
            probe,
            sources: ImageSources::default(),
        }
    }

    pub fn with_sources(mut self, sources: ImageSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn sources(&self) -> &ImageSources {
        &self.sources
    }

    /// Image for an already resolved entity.
    pub async fn resolve_for(&self, entity: &Entity, explicit_override: Option<&str>) -> String {
        self.resolve_image(&entity.name, Some(&entity.id), explicit_override)
            .await
    }

    /// Image for `name`, optionally with its catalog `id`.
    ///
    /// 1. A non-empty override is returned verbatim and never cached.
    /// 2. A cached URL for the name is returned.
    /// 3. Out-of-range or known-missing identities get the sentinel.
    /// 4. Otherwise the primary then secondary source is probed, then the sentinel.
    ///
    /// The URL from steps 3 and 4 is cached under the name only when it rests
    /// on definite answers. A failed entity fetch or an unreachable probe
    /// yields the sentinel for this call alone.
    pub async fn resolve_image(
        &self,
        name: &str,
        id: Option<&str>,
        explicit_override: Option<&str>,
    ) -> String {
        if let Some(url) = explicit_override.filter(|url| !url.trim().is_empty()) {
            return url.to_string();
        }

        let id = id.map(normalize).filter(|id| !id.is_empty());
        let cache_key = match (normalize(name), &id) {
            (name, _) if !name.is_empty() => name,
            (_, Some(id)) => id.clone(),
            _ => return self.sources.sentinel.clone(),
        };

        if let Some(url) = self.context.images().get(&cache_key) {
            debug!(key = %cache_key, "image cache hit");
            return url;
        }

        if self.is_unresolvable(&cache_key, id.as_deref()) {
            return self.remember(&cache_key, self.sources.sentinel.clone());
        }

        let numeric_id = match id.as_deref().and_then(parse_id) {
            Some(n) => n,
            None => match self.lookup_id(&cache_key).await {
                Some(n) => n,
                None if self.context.negatives().is_known_missing(&cache_key) => {
                    return self.remember(&cache_key, self.sources.sentinel.clone());
                }
                None => {
                    debug!(key = %cache_key, "identity unresolved, sentinel not cached");
                    return self.sources.sentinel.clone();
                }
            },
        };

        match self.probe_sources(numeric_id).await {
            Probed::Settled(url) => self.remember(&cache_key, url),
            Probed::Unsettled(url) => url,
        }
    }

    async fn lookup_id(&self, key: &str) -> Option<u32> {
        let entity = self.entities.resolve(key).await?;
        parse_id(&entity.id)
    }

    fn is_unresolvable(&self, name: &str, id: Option<&str>) -> bool {
        let negatives = self.context.negatives();
        id.is_some_and(|id| negatives.is_out_of_range_id(id))
            || negatives.is_out_of_range_id(name)
            || negatives.is_known_missing(name)
    }

    async fn probe_sources(&self, id: u32) -> Probed {
        let mut unreachable = false;
        for url in [self.sources.primary(id), self.sources.secondary(id)] {
            match self.probe.is_available(&url).await {
                Ok(true) if unreachable => return Probed::Unsettled(url),
                Ok(true) => return Probed::Settled(url),
                Ok(false) => debug!(%url, "image source unavailable"),
                Err(e) => {
                    warn!(%url, error = %e, "image probe failed");
                    unreachable = true;
                }
            }
        }

        let sentinel = self.sources.sentinel.clone();
        if unreachable {
            Probed::Unsettled(sentinel)
        } else {
            Probed::Settled(sentinel)
        }
    }

    fn remember(&self, key: &str, url: String) -> String {
        self.context.images().set(key, url.clone(), None);
        url
    }
}
