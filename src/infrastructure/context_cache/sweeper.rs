//! Periodic removal of expired local entries

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::local_cache::ScopedTtlCache;

/// Spawns a task that sweeps expired entries every `interval`.
///
/// The cache never schedules this itself; abort the returned handle to stop.
pub fn spawn_sweeper(cache: Arc<ScopedTtlCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match cache.sweep_expired() {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::debug!(removed, "Swept expired context cache entries");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Context cache sweep failed");
                    break;
                }
            }
        }
    })
}
