//! Entity Resolver
//!
//! normalize -> out-of-range check -> negative registry -> cache -> upstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::cache::{normalize, CacheContext};
use crate::models::Entity;
use crate::source::CatalogSource;

/// Per-call knobs for [`EntityResolver::resolve_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Skip the cache read and re-fetch, re-caching the result.
    /// Negative and out-of-range keys are still short-circuited.
    pub refresh: bool,
}

/// Per-key fetch locks. The map lock is never held across an await.
type KeyLocks = StdMutex<HashMap<String, Arc<Mutex<()>>>>;

/// Exclusive right to fetch one key.
///
/// Dropping it, on completion or when the caller abandons the future, forgets
/// the key's map entry and releases the key lock.
struct InFlightGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    _held: OwnedMutexGuard<()>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

/// Resolves catalog entities through the cache context.
pub struct EntityResolver {
    context: Arc<CacheContext>,
    source: Arc<dyn CatalogSource>,
    /// Per-key fetch locks, present when in-flight dedup is enabled
    in_flight: Option<KeyLocks>,
}

impl EntityResolver {
    pub fn new(context: Arc<CacheContext>, source: Arc<dyn CatalogSource>) -> Self {
        Self {
            context,
            source,
            in_flight: None,
        }
    }

    /// Makes concurrent misses on the same key share one upstream fetch.
    pub fn with_in_flight_dedup(mut self, enabled: bool) -> Self {
        self.in_flight = enabled.then(|| StdMutex::new(HashMap::new()));
        self
    }

    pub fn context(&self) -> &Arc<CacheContext> {
        &self.context
    }

    /// Resolves `key` (name or id) to a formatted entity.
    ///
    /// Never fails: absence, invalid input and upstream errors all yield `None`.
    pub async fn resolve(&self, key: &str) -> Option<Entity> {
        self.resolve_with(key, ResolveOptions::default()).await
    }

    pub async fn resolve_with(&self, key: &str, options: ResolveOptions) -> Option<Entity> {
        let key = normalize(key);
        if key.is_empty() {
            return None;
        }

        if self.is_rejected(&key) {
            return None;
        }

        if !options.refresh {
            if let Some(entity) = self.context.entities().get(&key) {
                debug!(%key, "entity cache hit");
                return Some(entity);
            }
        }

        let _guard = match &self.in_flight {
            Some(in_flight) => {
                let guard = Self::acquire_key_lock(in_flight, &key).await;
                // Another request may have settled this key while we waited
                if self.is_rejected(&key) {
                    return None;
                }
                if !options.refresh {
                    if let Some(entity) = self.context.entities().get(&key) {
                        debug!(%key, "entity resolved by concurrent request");
                        return Some(entity);
                    }
                }
                Some(guard)
            }
            None => None,
        };

        self.fetch_and_cache(&key).await
    }

    /// Out-of-range ids are registered as missing; known-missing keys are skipped.
    fn is_rejected(&self, key: &str) -> bool {
        let mut negatives = self.context.negatives();

        if negatives.is_out_of_range_id(key) {
            negatives.mark_missing(key);
            return true;
        }

        if negatives.is_known_missing(key) {
            debug!(%key, "skipping lookup of known-missing key");
            return true;
        }

        false
    }

    async fn fetch_and_cache(&self, key: &str) -> Option<Entity> {
        let record = match self.source.fetch_raw(key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!(%key, "catalog has no entry for key");
                self.context.negatives().mark_missing(key);
                return None;
            }
            Err(e) => {
                warn!(%key, error = %e, "catalog fetch failed, not caching");
                return None;
            }
        };

        match Entity::try_from(record) {
            Ok(entity) => {
                self.context.entities().set(key, entity.clone(), None);
                Some(entity)
            }
            Err(e) => {
                warn!(%key, error = %e, "catalog record rejected, not caching");
                None
            }
        }
    }

    async fn acquire_key_lock<'a>(in_flight: &'a KeyLocks, key: &str) -> InFlightGuard<'a> {
        let lock = in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        InFlightGuard {
            locks: in_flight,
            key: key.to_string(),
            _held: lock.lock_owned().await,
        }
    }

    /// Keys with a fetch in progress or queued.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight
            .as_ref()
            .map_or(0, |locks| locks.lock().unwrap_or_else(|e| e.into_inner()).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::error::{FetchError, FetchResult};
    use crate::source::{NamedResource, RawRecord, RawSprites, RawSummary, RawTypeSlot};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Catalog stub: knows pikachu and ditto, fails on "flaky", counts calls.
    #[derive(Default)]
    struct StubCatalog {
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl StubCatalog {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn raw(id: u32, name: &str) -> RawRecord {
        RawRecord {
            id,
            name: name.to_string(),
            weight: 60,
            height: 4,
            types: vec![RawTypeSlot {
                slot: 1,
                kind: NamedResource::new("electric", "https://pokeapi.co/api/v2/type/13/"),
            }],
            sprites: RawSprites::default(),
        }
    }

    #[async_trait]
    impl CatalogSource for StubCatalog {
        async fn fetch_raw(&self, key: &str) -> FetchResult<Option<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match key {
                "pikachu" | "25" => Ok(Some(raw(25, "pikachu"))),
                "broken" => Ok(Some(raw(0, ""))),
                "flaky" => Err(FetchError::Http("connection reset".into())),
                _ => Ok(None),
            }
        }

        async fn fetch_listing(&self, _limit: u32, _offset: u32) -> FetchResult<Vec<RawSummary>> {
            Ok(Vec::new())
        }
    }

    fn resolver(source: Arc<StubCatalog>) -> EntityResolver {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let context = Arc::new(CacheContext::new(&Config::default(), clock, None));
        EntityResolver::new(context, source)
    }

    #[tokio::test]
    async fn test_resolve_formats_and_caches() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        let entity = resolver.resolve("Pikachu").await.unwrap();
        assert_eq!(entity.id, "0025");
        assert_eq!(entity.weight, "6.0");

        let again = resolver.resolve(" pikachu ").await.unwrap();
        assert_eq!(again, entity);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_resolve_empty_key() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        assert!(resolver.resolve("").await.is_none());
        assert!(resolver.resolve("   ").await.is_none());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_confirmed_absent_is_negative_cached() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        assert!(resolver.resolve("fakemon").await.is_none());
        assert!(resolver.resolve("FAKEMON").await.is_none());
        assert_eq!(source.calls(), 1);
        assert!(resolver.context().negatives().is_known_missing("fakemon"));
    }

    #[tokio::test]
    async fn test_out_of_range_skips_upstream() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        assert!(resolver.resolve("9999").await.is_none());
        assert!(resolver.resolve("custom-sparkmouse").await.is_none());
        assert_eq!(source.calls(), 0);
        assert!(resolver.context().negatives().is_known_missing("9999"));
    }

    // Transient failures must stay retryable rather than be negative-cached.
    #[tokio::test]
    async fn test_transient_failure_is_not_negative_cached() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        assert!(resolver.resolve("flaky").await.is_none());
        assert!(resolver.resolve("flaky").await.is_none());
        assert_eq!(source.calls(), 2);
        assert!(!resolver.context().negatives().is_known_missing("flaky"));
    }

    #[tokio::test]
    async fn test_malformed_record_is_transient() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        assert!(resolver.resolve("broken").await.is_none());
        assert!(!resolver.context().negatives().is_known_missing("broken"));
        assert!(resolver.context().entities().is_empty());
    }

    #[tokio::test]
    async fn test_id_and_name_are_cached_separately() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        resolver.resolve("pikachu").await.unwrap();
        resolver.resolve("25").await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let source = Arc::new(StubCatalog::default());
        let resolver = resolver(source.clone());

        resolver.resolve("pikachu").await.unwrap();
        resolver
            .resolve_with("pikachu", ResolveOptions { refresh: true })
            .await
            .unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_without_dedup_both_fetch() {
        let source = Arc::new(StubCatalog {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let resolver = resolver(source.clone());

        let (a, b) = tokio::join!(resolver.resolve("pikachu"), resolver.resolve("pikachu"));
        assert_eq!(a, b);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_with_dedup_share_fetch() {
        let source = Arc::new(StubCatalog {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let resolver = resolver(source.clone()).with_in_flight_dedup(true);

        let (a, b, c) = tokio::join!(
            resolver.resolve("pikachu"),
            resolver.resolve("Pikachu"),
            resolver.resolve(" pikachu")
        );
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_dedup_shares_confirmed_absence() {
        let source = Arc::new(StubCatalog {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let resolver = resolver(source.clone()).with_in_flight_dedup(true);

        let (a, b) = tokio::join!(resolver.resolve("fakemon"), resolver.resolve("fakemon"));
        assert!(a.is_none() && b.is_none());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_fetch_releases_key() {
        let source = Arc::new(StubCatalog {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let resolver = resolver(source.clone()).with_in_flight_dedup(true);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), resolver.resolve("pikachu")).await;
        assert!(abandoned.is_err());
        assert_eq!(resolver.in_flight_len(), 0);

        assert!(resolver.resolve("pikachu").await.is_some());
        assert_eq!(resolver.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn test_waiter_settled_by_holder_releases_key() {
        let source = Arc::new(StubCatalog {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let resolver = resolver(source.clone()).with_in_flight_dedup(true);

        let (a, b) = tokio::join!(resolver.resolve("fakemon"), resolver.resolve("fakemon"));
        assert!(a.is_none() && b.is_none());
        assert_eq!(resolver.in_flight_len(), 0);
    }
}
