//! Periodic sync trigger.
//!
//! The scheduler is bound to the orchestrator's guarded entry point, so a
//! tick that lands while a manual cycle is running is skipped instead of
//! running a second cycle.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

use super::model::SyncConfig;
use super::orchestrator::SyncOrchestrator;
use super::progress::SyncProgressReporter;

/// Shortest interval the scheduler accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Starts the background sync scheduler. Abort the returned handle to stop it.
pub fn start_sync_scheduler<P>(
    orchestrator: Arc<SyncOrchestrator<P>>,
    config: SyncConfig,
) -> JoinHandle<()>
where
    P: SyncProgressReporter + 'static,
{
    let period = config.interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        info!("Quote sync scheduler started ({:?} interval)", period);

        if !config.initial_delay.is_zero() {
            sleep(config.initial_delay).await;
        }

        // First tick is immediate, subsequent ticks are `period` apart
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let report = orchestrator.run_cycle().await;
            if report.is_already_running() {
                debug!("Scheduled sync skipped: a cycle is already running");
            }
        }
    })
}
