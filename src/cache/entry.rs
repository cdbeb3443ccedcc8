//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiry support.

use serde::{Deserialize, Serialize};

/// Milliseconds in one minute, the expiry granularity of the cache.
pub const MINUTE_MS: u64 = 60 * 1000;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Entries are JSON-encoded as-is into the durable mirror, so the expiry
/// survives a mirror round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_minutes` - Lifetime in minutes; `None` or `Some(0)` never expires
    /// * `now_ms` - Current Unix time in milliseconds
    pub fn new(value: V, ttl_minutes: Option<u64>, now_ms: u64) -> Self {
        let expires_at = ttl_minutes
            .filter(|ttl| *ttl > 0)
            .map(|ttl| now_ms.saturating_add(ttl.saturating_mul(MINUTE_MS)));

        Self {
            value,
            created_at: now_ms,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry whose expiry is less than or equal to the current time is
    /// expired and must never be served as a hit.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    /// Remaining lifetime in milliseconds, `None` if the entry never expires.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(now_ms))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), None, NOW);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(NOW + 10 * MINUTE_MS));
    }

    #[test]
    fn test_entry_zero_ttl_never_expires() {
        let entry = CacheEntry::new(1u32, Some(0), NOW);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(u64::MAX));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), Some(1), NOW);

        assert!(!entry.is_expired(NOW));
        assert!(!entry.is_expired(NOW + MINUTE_MS - 1));
        assert!(entry.is_expired(NOW + MINUTE_MS + 1));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry {
            value: "test".to_string(),
            created_at: NOW,
            expires_at: Some(NOW),
        };

        assert!(entry.is_expired(NOW), "Entry should be expired at boundary");
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new((), Some(10), NOW);

        assert_eq!(entry.ttl_remaining_ms(NOW), Some(10 * MINUTE_MS));
        assert_eq!(entry.ttl_remaining_ms(NOW + 11 * MINUTE_MS), Some(0));
        assert_eq!(CacheEntry::new((), None, NOW).ttl_remaining_ms(NOW), None);
    }

    #[test]
    fn test_entry_json_roundtrip_keeps_expiry() {
        let entry = CacheEntry::new("0025".to_string(), Some(5), NOW);
        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
