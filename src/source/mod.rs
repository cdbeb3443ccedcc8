//! Upstream Source Module
//!
//! The collaborators the cache layer consumes: a catalog that fetches single
//! records and bulk listings, and a probe that checks image availability.
//! Raw records are decoded strictly at this boundary.

mod pokeapi;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchResult;
use crate::format::id_from_resource_url;

pub use pokeapi::PokeApiClient;

// == Collaborator Traits ==
/// Upstream catalog.
///
/// `Ok(None)` means the catalog confirmed the record does not exist. `Err`
/// means the answer is unknown (network, status, decode) and must not be
/// negative-cached.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches one record by normalized key (name or id).
    async fn fetch_raw(&self, key: &str) -> FetchResult<Option<RawRecord>>;

    /// Fetches one page of the bulk listing.
    async fn fetch_listing(&self, limit: u32, offset: u32) -> FetchResult<Vec<RawSummary>>;
}

/// Checks whether an image URL can be served.
///
/// `Ok(false)` is a definite "not there". `Err` means the check itself could
/// not be made and says nothing about the image.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn is_available(&self, url: &str) -> FetchResult<bool>;
}

// == Raw Records ==
/// A catalog record exactly as the upstream returns it.
///
/// Weight is in hectograms, height in decimetres.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    pub id: u32,
    pub name: String,
    pub weight: u32,
    pub height: u32,
    #[serde(default)]
    pub types: Vec<RawTypeSlot>,
    #[serde(default)]
    pub sprites: RawSprites,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<RawOtherSprites>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<RawArtwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawArtwork {
    pub front_default: Option<String>,
}

impl RawSprites {
    /// Best available sprite: official artwork, then the default sprite.
    pub fn best(&self) -> Option<&str> {
        self.other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.as_deref())
            .or(self.front_default.as_deref())
    }
}

/// `{ name, url }` pair used throughout the upstream API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One entry of the bulk listing.
pub type RawSummary = NamedResource;

impl NamedResource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Numeric id taken from the trailing URL segment.
    pub fn id(&self) -> Option<u32> {
        id_from_resource_url(&self.url)
    }
}

/// A page of the bulk listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPage {
    pub count: u32,
    pub results: Vec<RawSummary>,
}
