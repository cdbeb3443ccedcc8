//! Negative Registry
//!
//! Keys confirmed to have no catalog entity. Entries never expire; only an
//! explicit clear forgets them.

use std::collections::HashSet;

use tracing::info;

use crate::cache::normalize;

/// Highest id in the canonical catalog.
pub const DEFAULT_CATALOG_MAX_ID: u32 = 1025;

/// Prefix used by out-of-catalog ("custom") entries.
pub const CUSTOM_ID_PREFIX: &str = "custom-";

// == Out Of Range ==
/// Cheap check for identifiers that can never be canonical catalog ids.
///
/// True for `custom-` keys, keys starting with a digit but carrying any
/// non-digit character (`"25x"`, `"10-a"`), `0`, and numeric ids above
/// `max_id`. Alphabetic names are never out of range.
pub fn is_out_of_range_id(key: &str, max_id: u32) -> bool {
    let key = normalize(key);

    if key.starts_with(CUSTOM_ID_PREFIX) {
        return true;
    }

    if !key.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }

    if !key.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    match key.parse::<u64>() {
        Ok(id) => id == 0 || id > u64::from(max_id),
        // More digits than fit in u64
        Err(_) => true,
    }
}

// == Negative Registry ==
/// Set of normalized keys known to be absent from the catalog.
#[derive(Debug)]
pub struct NegativeRegistry {
    keys: HashSet<String>,
    max_id: u32,
}

impl Default for NegativeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_MAX_ID)
    }
}

impl NegativeRegistry {
    pub fn new(max_id: u32) -> Self {
        Self {
            keys: HashSet::new(),
            max_id,
        }
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Membership test after normalization.
    pub fn is_known_missing(&self, key: &str) -> bool {
        self.keys.contains(&normalize(key))
    }

    /// Marks `key` as missing. Returns `true` only for the first registration,
    /// which is also the only one that gets logged.
    pub fn mark_missing(&mut self, key: &str) -> bool {
        let key = normalize(key);
        if key.is_empty() {
            return false;
        }

        let inserted = self.keys.insert(key.clone());
        if inserted {
            info!(%key, "registered key as missing from catalog");
        }
        inserted
    }

    pub fn is_out_of_range_id(&self, key: &str) -> bool {
        is_out_of_range_id(key, self.max_id)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
