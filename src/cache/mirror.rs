//! Durable Mirror Module
//!
//! Session-scoped key-value storage backing the in-memory caches. The mirror
//! lives as long as the session that owns it and is never shared across
//! sessions. Running without one is normal and means memory-only caching.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{MirrorError, MirrorResult};

/// String key-value storage shaped like browser session storage.
pub trait DurableMirror: Send + Sync {
    fn get(&self, key: &str) -> MirrorResult<Option<String>>;

    fn set(&self, key: &str, value: String) -> MirrorResult<()>;

    fn remove(&self, key: &str) -> MirrorResult<()>;

    /// Every key currently stored, across all namespaces.
    fn keys(&self) -> MirrorResult<Vec<String>>;
}

// == Session Store ==
/// In-process session storage with an optional byte quota.
#[derive(Debug, Default)]
pub struct SessionStore {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MirrorResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| MirrorError::Storage("session store lock poisoned".to_string()))
    }
}

impl DurableMirror for SessionStore {
    fn get(&self, key: &str) -> MirrorResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> MirrorResult<()> {
        let mut items = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(MirrorError::Storage(format!(
                    "quota of {} bytes exceeded",
                    quota
                )));
            }
        }

        items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> MirrorResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> MirrorResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
