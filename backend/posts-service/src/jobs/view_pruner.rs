//! View Pruner Background Job
//!
//! Deletes `post_views` rows older than the prune window. The interval is
//! validated at startup to be no longer than the window, so every event is
//! removed at most one interval after it expires.

use chrono::{Duration as ChronoDuration, Utc};
use resilience::with_timeout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

use crate::db::ViewCountStore;

pub async fn start_view_pruner(
    store: Arc<dyn ViewCountStore>,
    prune_window: ChronoDuration,
    prune_interval: Duration,
    db_timeout: Duration,
) {
    tracing::info!(
        "Starting view pruner background job (interval={}s, window_days={})",
        prune_interval.as_secs(),
        prune_window.num_days()
    );

    let mut ticker = interval(prune_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // first tick completes immediately so retention runs at startup
        ticker.tick().await;
        run_prune_cycle(store.as_ref(), prune_window, db_timeout).await;
    }
}

/// Run one prune; returns the number of deleted rows, or `None` on failure.
pub async fn run_prune_cycle(
    store: &dyn ViewCountStore,
    prune_window: ChronoDuration,
    db_timeout: Duration,
) -> Option<u64> {
    let cycle_start = Instant::now();

    match with_timeout(db_timeout, store.prune(Utc::now(), prune_window)).await {
        Ok(deleted) => {
            tracing::info!(
                deleted,
                duration_ms = cycle_start.elapsed().as_millis() as u64,
                "View prune cycle completed"
            );
            Some(deleted)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                duration_ms = cycle_start.elapsed().as_millis() as u64,
                "View prune cycle failed"
            );
            None
        }
    }
}
