//! Request DTOs for the catalog API
//!
//! Query strings accepted by the HTTP endpoints.

use serde::Deserialize;

/// Largest featured set the API hands out in one call.
pub const MAX_FEATURED_COUNT: usize = 50;

/// Query for `GET /image/:name`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageQuery {
    /// Optional catalog id, skips the entity lookup when present
    #[serde(default)]
    pub id: Option<String>,
    /// Caller-supplied image URL, returned verbatim
    #[serde(default, rename = "override")]
    pub override_url: Option<String>,
}

/// Query for `GET /featured`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeaturedQuery {
    /// Number of featured entries, defaults to the configured count
    #[serde(default)]
    pub count: Option<usize>,
}

impl FeaturedQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.count {
            Some(0) => Some("count must be at least 1".to_string()),
            Some(n) if n > MAX_FEATURED_COUNT => Some(format!(
                "count exceeds maximum of {}",
                MAX_FEATURED_COUNT
            )),
            _ => None,
        }
    }
}
