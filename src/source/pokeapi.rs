//! PokeAPI client
//!
//! reqwest-backed implementation of the upstream collaborators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{CatalogSource, ImageProbe, ListingPage, RawRecord, RawSummary};
use crate::config::Config;
use crate::error::{FetchError, FetchResult};

/// HTTP client for the upstream catalog API.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    /// Builds a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> FetchResult<Self> {
        Self::new(
            config.upstream_base_url.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }

    fn record_url(&self, key: &str) -> String {
        format!("{}/pokemon/{}", self.base_url, key)
    }

    fn listing_url(&self) -> String {
        format!("{}/pokemon", self.base_url)
    }
}

#[async_trait]
impl CatalogSource for PokeApiClient {
    async fn fetch_raw(&self, key: &str) -> FetchResult<Option<RawRecord>> {
        let url = self.record_url(key);
        debug!(%url, "fetching catalog record");

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record = response
                    .json::<RawRecord>()
                    .await
                    .map_err(|e| FetchError::Decode(e.to_string()))?;
                Ok(Some(record))
            }
            status => Err(FetchError::Status(status.as_u16())),
        }
    }

    async fn fetch_listing(&self, limit: u32, offset: u32) -> FetchResult<Vec<RawSummary>> {
        debug!(limit, offset, "fetching catalog listing");

        let response = self
            .client
            .get(self.listing_url())
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let page = response
            .json::<ListingPage>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(page.results)
    }
}

#[async_trait]
impl ImageProbe for PokeApiClient {
    async fn is_available(&self, url: &str) -> FetchResult<bool> {
        let response = self.client.head(url).send().await?;
        availability_from_status(response.status())
    }
}

/// Success means available and a client error means absent. Anything else
/// (server errors, throttling) is not an answer about the image.
fn availability_from_status(status: StatusCode) -> FetchResult<bool> {
    if status.is_success() {
        Ok(true)
    } else if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        Ok(false)
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_from_status_separates_absent_from_unknown() {
        assert!(matches!(availability_from_status(StatusCode::OK), Ok(true)));
        assert!(matches!(availability_from_status(StatusCode::NOT_FOUND), Ok(false)));
        assert!(matches!(availability_from_status(StatusCode::FORBIDDEN), Ok(false)));
        assert!(matches!(
            availability_from_status(StatusCode::TOO_MANY_REQUESTS),
            Err(FetchError::Status(429))
        ));
        assert!(matches!(
            availability_from_status(StatusCode::BAD_GATEWAY),
            Err(FetchError::Status(502))
        ));
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = PokeApiClient::new("https://pokeapi.co/api/v2/", Duration::from_secs(5)).unwrap();

        assert_eq!(client.record_url("pikachu"), "https://pokeapi.co/api/v2/pokemon/pikachu");
        assert_eq!(client.listing_url(), "https://pokeapi.co/api/v2/pokemon");
    }

    #[test]
    fn test_from_config() {
        let client = PokeApiClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.record_url("25"), "https://pokeapi.co/api/v2/pokemon/25");
    }
}
