//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use tracing::warn;

use crate::cache::DEFAULT_CATALOG_MAX_ID;

/// Zone the featured rotation rolls over in when none is configured.
pub const DEFAULT_REFERENCE_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Cache, upstream and server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity bound of each cache namespace
    pub max_entries: usize,
    /// Entity cache lifetime in minutes, 0 = never expires
    pub entity_ttl_minutes: u64,
    /// Image URL cache lifetime in minutes, 0 = never expires
    pub image_ttl_minutes: u64,
    /// Highest valid canonical id
    pub catalog_max_id: u32,
    /// Timezone whose midnight rolls the featured rotation
    pub reference_timezone: Tz,
    /// Default size of the featured set served over HTTP
    pub featured_count: usize,
    /// Base URL of the upstream catalog API
    pub upstream_base_url: String,
    /// Upstream request timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Share one upstream fetch between concurrent requests for the same key
    pub dedupe_in_flight: bool,
    /// Attach a process-lifetime session mirror to the caches
    pub session_mirror: bool,
    /// Byte quota of the session mirror; writes past it are refused
    pub session_mirror_quota_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Entries per cache namespace (default: 100)
    /// - `ENTITY_TTL_MINUTES` - Entity lifetime (default: 60)
    /// - `IMAGE_TTL_MINUTES` - Image URL lifetime (default: 1440)
    /// - `CATALOG_MAX_ID` - Highest canonical id (default: 1025)
    /// - `REFERENCE_TIMEZONE` - IANA zone name (default: America/New_York)
    /// - `FEATURED_COUNT` - Featured set size (default: 4)
    /// - `UPSTREAM_BASE_URL` - Catalog API (default: https://pokeapi.co/api/v2)
    /// - `FETCH_TIMEOUT_SECS` - Upstream timeout (default: 10)
    /// - `DEDUPE_IN_FLIGHT` - In-flight dedup (default: true)
    /// - `SESSION_MIRROR` - Session mirror (default: false)
    /// - `SESSION_MIRROR_QUOTA_BYTES` - Session mirror quota (default: 5 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            entity_ttl_minutes: parse_var("ENTITY_TTL_MINUTES")
                .unwrap_or(defaults.entity_ttl_minutes),
            image_ttl_minutes: parse_var("IMAGE_TTL_MINUTES").unwrap_or(defaults.image_ttl_minutes),
            catalog_max_id: parse_var("CATALOG_MAX_ID").unwrap_or(defaults.catalog_max_id),
            reference_timezone: env::var("REFERENCE_TIMEZONE")
                .ok()
                .map(|name| parse_timezone(&name))
                .unwrap_or(defaults.reference_timezone),
            featured_count: parse_var("FEATURED_COUNT").unwrap_or(defaults.featured_count),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.upstream_base_url),
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout_secs),
            dedupe_in_flight: parse_var("DEDUPE_IN_FLIGHT").unwrap_or(defaults.dedupe_in_flight),
            session_mirror: parse_var("SESSION_MIRROR").unwrap_or(defaults.session_mirror),
            session_mirror_quota_bytes: parse_var("SESSION_MIRROR_QUOTA_BYTES")
                .unwrap_or(defaults.session_mirror_quota_bytes),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Entity TTL as passed to the cache (`None` = never expires).
    pub fn entity_ttl(&self) -> Option<u64> {
        Some(self.entity_ttl_minutes).filter(|ttl| *ttl > 0)
    }

    /// Image TTL as passed to the cache (`None` = never expires).
    pub fn image_ttl(&self) -> Option<u64> {
        Some(self.image_ttl_minutes).filter(|ttl| *ttl > 0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 100,
            entity_ttl_minutes: 60,
            image_ttl_minutes: 1440,
            catalog_max_id: DEFAULT_CATALOG_MAX_ID,
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE,
            featured_count: 4,
            upstream_base_url: "https://pokeapi.co/api/v2".to_string(),
            fetch_timeout_secs: 10,
            dedupe_in_flight: true,
            session_mirror: false,
            session_mirror_quota_bytes: 5 * 1024 * 1024,
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parses an IANA zone name, falling back to the default zone with a warning.
pub fn parse_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|_| {
        warn!(
            timezone = %name,
            fallback = %DEFAULT_REFERENCE_TIMEZONE,
            "unknown reference timezone, using fallback"
        );
        DEFAULT_REFERENCE_TIMEZONE
    })
}
