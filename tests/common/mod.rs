//! Shared stub collaborators for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use pokedex_cache::error::{FetchError, FetchResult};
use pokedex_cache::source::{NamedResource, RawRecord, RawSprites, RawSummary, RawTypeSlot};
use pokedex_cache::{CatalogSource, Config, ImageProbe, ManualClock, Pokedex};

/// In-memory catalog that records every upstream call.
#[derive(Default)]
pub struct StubCatalog {
    records: HashMap<String, RawRecord>,
    failing: Mutex<HashSet<String>>,
    listing_fails: AtomicBool,
    fetches: Mutex<Vec<String>>,
    listing_calls: AtomicUsize,
}

impl StubCatalog {
    pub fn new() -> Self {
        let mut records = HashMap::new();
        for (id, name, weight, height, types) in [
            (1, "bulbasaur", 69, 7, vec!["grass", "poison"]),
            (25, "pikachu", 60, 4, vec!["electric"]),
            (132, "ditto", 40, 3, vec!["normal"]),
            (133, "eevee", 65, 3, vec!["normal"]),
        ] {
            let record = raw_record(id, name, weight, height, &types);
            records.insert(id.to_string(), record.clone());
            records.insert(name.to_string(), record);
        }

        Self {
            records,
            ..Default::default()
        }
    }

    /// Makes fetches of `key` fail with a transient error.
    pub fn fail_key(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal_key(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.listing_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn fetches_of(&self, key: &str) -> usize {
        self.fetches.lock().unwrap().iter().filter(|k| *k == key).count()
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

pub fn raw_record(id: u32, name: &str, weight: u32, height: u32, types: &[&str]) -> RawRecord {
    RawRecord {
        id,
        name: name.to_string(),
        weight,
        height,
        types: types
            .iter()
            .enumerate()
            .map(|(i, t)| RawTypeSlot {
                slot: (i + 1) as u8,
                kind: NamedResource::new(*t, format!("https://pokeapi.co/api/v2/type/{}/", t)),
            })
            .collect(),
        sprites: RawSprites::default(),
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn fetch_raw(&self, key: &str) -> FetchResult<Option<RawRecord>> {
        self.fetches.lock().unwrap().push(key.to_string());
        if self.failing.lock().unwrap().contains(key) {
            return Err(FetchError::Http("simulated network error".to_string()));
        }
        Ok(self.records.get(key).cloned())
    }

    async fn fetch_listing(&self, limit: u32, offset: u32) -> FetchResult<Vec<RawSummary>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.listing_fails.load(Ordering::SeqCst) {
            return Err(FetchError::Status(500));
        }
        Ok((offset + 1..=offset + limit)
            .map(|id| {
                NamedResource::new(
                    format!("mon-{}", id),
                    format!("https://pokeapi.co/api/v2/pokemon/{}/", id),
                )
            })
            .collect())
    }
}

/// Image probe answering from a fixed allow-list.
#[derive(Default)]
pub struct StubProbe {
    available: Mutex<HashSet<String>>,
    unreachable: AtomicBool,
    pub calls: AtomicUsize,
}

impl StubProbe {
    pub fn allow(&self, url: impl Into<String>) {
        self.available.lock().unwrap().insert(url.into());
    }

    /// Makes every probe fail as if the image host were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageProbe for StubProbe {
    async fn is_available(&self, url: &str) -> FetchResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(FetchError::Http("image host unreachable".to_string()));
        }
        Ok(self.available.lock().unwrap().contains(url))
    }
}

/// Noon UTC on 2024-05-01, 08:00 in New York.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub pokedex: Pokedex,
    pub catalog: Arc<StubCatalog>,
    pub probe: Arc<StubProbe>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(config: Config) -> Harness {
    let catalog = Arc::new(StubCatalog::new());
    let probe = Arc::new(StubProbe::default());
    let clock = Arc::new(ManualClock::new(start_time()));

    let pokedex = Pokedex::builder(config)
        .clock(clock.clone())
        .build(catalog.clone(), probe.clone());

    Harness {
        pokedex,
        catalog,
        probe,
        clock,
    }
}
