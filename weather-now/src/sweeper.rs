use crate::cache::ExpiringCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Periodically purges expired entries from the given caches until the
/// token is cancelled. Reads never depend on this running.
pub fn spawn_sweeper(
    caches: Vec<(&'static str, Arc<ExpiringCache>)>,
    interval: Duration,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Cache sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    for (name, cache) in &caches {
                        let removed = cache.purge_expired().await;
                        let remaining = cache.len().await;
                        debug!(cache = *name, removed, remaining, "Swept expired entries");
                    }
                }
            }
        }
    })
}
