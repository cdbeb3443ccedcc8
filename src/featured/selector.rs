//! Featured Selector
//!
//! A daily rotation of catalog entries: the same ordered set for everyone for
//! a whole reference-timezone day, recomputed lazily after midnight.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use super::shuffle::{daily_seed, seeded_shuffle};
use crate::clock::Clock;
use crate::models::{EntityRef, FeaturedSet};
use crate::source::CatalogSource;

/// Shown when the listing cannot be fetched.
pub fn fallback_featured() -> Vec<EntityRef> {
    vec![
        EntityRef::new(1, "bulbasaur"),
        EntityRef::new(4, "charmander"),
        EntityRef::new(7, "squirtle"),
        EntityRef::new(25, "pikachu"),
    ]
}

/// Memoized daily rotation.
///
/// States: stale (no memo or an older date) -> computing -> memoized(date).
/// Only the clock crossing midnight in the reference timezone makes a memo stale.
pub struct FeaturedSelector {
    source: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    max_id: u32,
    memo: Mutex<Option<FeaturedSet>>,
}

impl FeaturedSelector {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
        max_id: u32,
    ) -> Self {
        Self {
            source,
            clock,
            timezone,
            max_id,
            memo: Mutex::new(None),
        }
    }

    /// Today's date in the reference timezone.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }

    /// Today's `YYYY-MM-DD` key in the reference timezone.
    pub fn date_key(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }

    /// Up to `count` featured entries for today.
    ///
    /// Never fails: a listing failure yields the fixed fallback set.
    pub async fn get_featured(&self, count: usize) -> Vec<EntityRef> {
        self.get_featured_set(count).await.members
    }

    /// Like [`get_featured`](Self::get_featured), tagged with the date the
    /// members were chosen for. The clock is read once per call.
    pub async fn get_featured_set(&self, count: usize) -> FeaturedSet {
        let today = self.today();
        let date_key = today.format("%Y-%m-%d").to_string();

        if count == 0 {
            return FeaturedSet {
                date_key,
                members: Vec::new(),
            };
        }

        if let Some(members) = self.memoized(&date_key, count) {
            return FeaturedSet { date_key, members };
        }

        let members = match self.compute(today).await {
            Some(members) => {
                info!(%date_key, size = members.len(), "computed featured rotation");
                let prefix = members.iter().take(count).cloned().collect();
                *self.lock_memo() = Some(FeaturedSet {
                    date_key: date_key.clone(),
                    members,
                });
                prefix
            }
            None => fallback_featured().into_iter().take(count).collect(),
        };

        FeaturedSet { date_key, members }
    }

    /// The memoized set, if it belongs to today.
    pub fn current(&self) -> Option<FeaturedSet> {
        let date_key = self.date_key();
        self.lock_memo()
            .as_ref()
            .filter(|set| set.date_key == date_key)
            .cloned()
    }

    fn memoized(&self, date_key: &str, count: usize) -> Option<Vec<EntityRef>> {
        let memo = self.lock_memo();
        let set = memo.as_ref().filter(|set| set.date_key == date_key)?;
        debug!(%date_key, "featured rotation memo hit");
        Some(set.members.iter().take(count).cloned().collect())
    }

    async fn compute(&self, today: NaiveDate) -> Option<Vec<EntityRef>> {
        let listing = match self.source.fetch_listing(self.max_id, 0).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(error = %e, "featured listing fetch failed, using fallback");
                return None;
            }
        };

        let mut members: Vec<EntityRef> = listing
            .iter()
            .filter_map(|item| {
                let id = item.id().filter(|id| (1..=self.max_id).contains(id))?;
                Some(EntityRef::new(id, &item.name))
            })
            .collect();

        if members.is_empty() {
            warn!("featured listing had no eligible entries, using fallback");
            return None;
        }

        // Listing order is not guaranteed stable, the shuffle input must be
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members.dedup();
        seeded_shuffle(&mut members, daily_seed(today));
        Some(members)
    }

    fn lock_memo(&self) -> std::sync::MutexGuard<'_, Option<FeaturedSet>> {
        self.memo.lock().unwrap_or_else(|e| e.into_inner())
    }
}
