//! Key Normalizer
//!
//! Canonical cache identity shared by the expiring caches, the negative
//! registry and the entity resolver.

use std::fmt::Display;

/// Lowercases and trims a lookup key. Numbers are stringified first.
///
/// No other transformation happens: `"25"` and `"pikachu"` stay distinct keys,
/// ids are never resolved to names before caching.
pub fn normalize(input: impl Display) -> String {
    input.to_string().trim().to_lowercase()
}
