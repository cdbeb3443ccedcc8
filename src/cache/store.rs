//! Expiring Cache Module
//!
//! Namespaced key-value cache combining a HashMap with FIFO eviction, minute
//! granularity expiry and an optional write-through durable mirror.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{normalize, CacheEntry, CacheStats, DurableMirror, InsertionOrder};
use crate::clock::Clock;
use crate::error::MirrorError;

// == Expiring Cache ==
/// In-memory cache with expiry, a capacity bound and a durable mirror.
///
/// - Keys are normalized on every call.
/// - When full, the oldest *inserted* entry is evicted; reads never change order.
/// - Expired entries are purged lazily on access.
/// - Every positive `set` is written through to the mirror; the mirror is only
///   read after a memory miss. Mirror failures are logged and ignored.
pub struct ExpiringCache<V> {
    /// Prefix for durable mirror keys
    namespace: String,
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order for eviction
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of in-memory entries
    max_entries: usize,
    /// Lifetime in minutes for entries set without an explicit TTL
    default_ttl: Option<u64>,
    clock: Arc<dyn Clock>,
    mirror: Option<Arc<dyn DurableMirror>>,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates a memory-only cache.
    ///
    /// # Arguments
    /// * `namespace` - Prefix for mirror keys, e.g. `"pokemon"`
    /// * `max_entries` - Capacity bound (at least 1)
    /// * `default_ttl` - Default lifetime in minutes; `None`/`Some(0)` never expires
    /// * `clock` - Time source for expiry decisions
    pub fn new(
        namespace: impl Into<String>,
        max_entries: usize,
        default_ttl: Option<u64>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
            clock,
            mirror: None,
        }
    }

    /// Attaches a durable mirror.
    pub fn with_mirror(mut self, mirror: Arc<dyn DurableMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Get ==
    /// Returns the value for `key` if present and unexpired.
    ///
    /// An expired memory entry is deleted and reported as a miss. An absent
    /// entry falls through to the durable mirror before declaring a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let key = normalize(key);
        let now = self.clock.now_ms();

        if let Some(entry) = self.entries.get(&key) {
            if entry.is_expired(now) {
                self.entries.remove(&key);
                self.order.remove(&key);
                self.mirror_remove(&key);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_expirations(1);
                self.stats.record_miss();
                debug!(namespace = %self.namespace, %key, "cache entry expired");
                return None;
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            return Some(value);
        }

        match self.mirror_read(&key, now) {
            Some(entry) => {
                let value = entry.value.clone();
                self.insert_memory(key, entry);
                self.stats.record_mirror_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// Re-setting an existing key replaces the value and resets its expiry
    /// without changing its eviction position.
    ///
    /// # Arguments
    /// * `ttl` - Lifetime in minutes; `None` uses the cache default, `Some(0)` never expires
    pub fn set(&mut self, key: &str, value: V, ttl: Option<u64>) {
        let key = normalize(key);
        if key.is_empty() {
            return;
        }

        let effective_ttl = ttl.or(self.default_ttl);
        let entry = CacheEntry::new(value, effective_ttl, self.clock.now_ms());

        self.mirror_write(&key, &entry);
        self.insert_memory(key, entry);
    }

    // == Clear ==
    /// Empties memory and removes this namespace's keys from the mirror.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);

        let Some(mirror) = &self.mirror else {
            return;
        };

        for key in self.namespace_mirror_keys(mirror.as_ref()) {
            if let Err(e) = mirror.remove(&key) {
                warn!(namespace = %self.namespace, %key, error = %e, "failed to remove mirror key");
            }
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from memory, then from this namespace's
    /// part of the mirror, including entries already evicted from memory.
    ///
    /// Returns the number of in-memory entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.order.remove(&key);
        }

        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());

        let purged = self.purge_expired_mirror(now);
        if purged > 0 {
            debug!(namespace = %self.namespace, purged, "purged expired mirror entries");
        }
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_memory(&mut self, key: String, entry: CacheEntry<V>) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.order.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(namespace = %self.namespace, key = %evicted, "evicted oldest entry");
            }
        }

        self.order.record(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    fn mirror_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn mirror_write(&self, key: &str, entry: &CacheEntry<V>) {
        let Some(mirror) = &self.mirror else {
            return;
        };

        let result = serde_json::to_string(entry)
            .map_err(MirrorError::from)
            .and_then(|json| mirror.set(&self.mirror_key(key), json));

        if let Err(e) = result {
            warn!(namespace = %self.namespace, %key, error = %e, "durable mirror write failed");
        }
    }

    fn mirror_read(&self, key: &str, now: u64) -> Option<CacheEntry<V>> {
        let mirror = self.mirror.as_ref()?;
        let mirror_key = self.mirror_key(key);

        let raw = match mirror.get(&mirror_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(namespace = %self.namespace, %key, error = %e, "durable mirror read failed");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<V>>(&raw) {
            Ok(entry) if !entry.is_expired(now) => Some(entry),
            Ok(_) => {
                self.mirror_remove(key);
                None
            }
            Err(e) => {
                warn!(namespace = %self.namespace, %key, error = %e, "discarding unreadable mirror entry");
                self.mirror_remove(key);
                None
            }
        }
    }

    /// Mirror keys belonging to this namespace, or none if listing fails.
    fn namespace_mirror_keys(&self, mirror: &dyn DurableMirror) -> Vec<String> {
        let prefix = format!("{}:", self.namespace);
        match mirror.keys() {
            Ok(keys) => keys.into_iter().filter(|k| k.starts_with(&prefix)).collect(),
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "failed to list mirror keys");
                Vec::new()
            }
        }
    }

    /// Drops expired and unreadable mirror entries of this namespace.
    fn purge_expired_mirror(&self, now: u64) -> usize {
        let Some(mirror) = &self.mirror else {
            return 0;
        };

        let mut purged = 0;
        for key in self.namespace_mirror_keys(mirror.as_ref()) {
            let stale = match mirror.get(&key) {
                Ok(Some(raw)) => serde_json::from_str::<CacheEntry<V>>(&raw)
                    .map_or(true, |entry| entry.is_expired(now)),
                Ok(None) => false,
                Err(e) => {
                    warn!(namespace = %self.namespace, %key, error = %e, "durable mirror read failed");
                    false
                }
            };

            if !stale {
                continue;
            }
            match mirror.remove(&key) {
                Ok(()) => purged += 1,
                Err(e) => {
                    warn!(namespace = %self.namespace, %key, error = %e, "durable mirror remove failed")
                }
            }
        }
        purged
    }

    fn mirror_remove(&self, key: &str) {
        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.remove(&self.mirror_key(key)) {
                warn!(namespace = %self.namespace, %key, error = %e, "durable mirror remove failed");
            }
        }
    }
}

impl<V> std::fmt::Debug for ExpiringCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("namespace", &self.namespace)
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .field("default_ttl", &self.default_ttl)
            .field("mirrored", &self.mirror.is_some())
            .finish()
    }
}
