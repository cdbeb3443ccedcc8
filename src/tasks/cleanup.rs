//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, on top
//! of the lazy purge every read already does.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::CacheContext;

/// Spawns the periodic expiry sweep over both cache namespaces.
///
/// The first sweep runs one full interval after spawning. Abort the returned
/// handle on shutdown.
pub fn spawn_cleanup_task(context: Arc<CacheContext>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), "expiry sweep running");

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match context.cleanup_expired() {
                0 => debug!("expiry sweep found nothing to remove"),
                removed => info!(removed, "expiry sweep removed entries"),
            }
        }
    })
}
