//! Sync cycle orchestrator.
//!
//! One cycle is: fetch remote → merge → persist → push unsynced → report.
//! Manual and scheduled triggers share [`SyncOrchestrator::run_cycle`]; a
//! trigger that arrives while a cycle is running returns an
//! "already running" report without touching the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use log::{debug, error, info, warn};

use super::model::{SyncIssue, SyncReport, SyncState};
use super::progress::{NoOpProgressReporter, SyncProgressReporter};
use super::reconcile::merge;
use super::remote::RemoteClient;
use crate::errors::Error;
use crate::quotes::{LocalStore, Quote};

/// Marks the engine `Running` for as long as it is alive.
///
/// Dropping it (normal return or unwinding) always flips the engine back to
/// `Idle`, so a failed cycle can never leave it stuck.
struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates quote synchronization.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(LocalStore::open(backend));
/// let remote = RemoteClient::new(Arc::new(HttpQuoteApiClient::new(url, 1)?));
/// let orchestrator = SyncOrchestrator::new(store, remote);
/// let report = orchestrator.run_cycle().await;
/// ```
pub struct SyncOrchestrator<P: SyncProgressReporter = NoOpProgressReporter> {
    store: Arc<LocalStore>,
    remote: RemoteClient,
    progress_reporter: Arc<P>,
    running: AtomicBool,
    last_report: RwLock<Option<SyncReport>>,
}

impl SyncOrchestrator<NoOpProgressReporter> {
    /// Create an orchestrator without progress reporting.
    pub fn new(store: Arc<LocalStore>, remote: RemoteClient) -> Self {
        Self::with_reporter(store, remote, Arc::new(NoOpProgressReporter))
    }
}

impl<P: SyncProgressReporter> SyncOrchestrator<P> {
    /// Create an orchestrator that reports cycle start/completion to `progress_reporter`.
    pub fn with_reporter(
        store: Arc<LocalStore>,
        remote: RemoteClient,
        progress_reporter: Arc<P>,
    ) -> Self {
        Self {
            store,
            remote,
            progress_reporter,
            running: AtomicBool::new(false),
            last_report: RwLock::new(None),
        }
    }

    /// The store this orchestrator writes to.
    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    pub fn state(&self) -> SyncState {
        if self.running.load(Ordering::SeqCst) {
            SyncState::Running
        } else {
            SyncState::Idle
        }
    }

    /// Report of the most recent completed cycle.
    pub fn last_report(&self) -> Option<SyncReport> {
        self.last_report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one synchronization cycle.
    ///
    /// Never fails: every error is recorded in the returned report and the
    /// engine is back to `Idle` when this returns.
    pub async fn run_cycle(&self) -> SyncReport {
        let Some(_running) = RunningGuard::acquire(&self.running) else {
            debug!("Sync trigger ignored: a cycle is already running");
            return SyncReport::already_running();
        };

        info!("Starting quote sync cycle...");
        self.progress_reporter.report_sync_start();

        let report = self.run_cycle_internal().await;

        self.progress_reporter.report_sync_complete(&report);
        *self
            .last_report
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
        report
    }

    async fn run_cycle_internal(&self) -> SyncReport {
        let mut report = SyncReport::started(Utc::now());

        // Step 1: Fetch the remote snapshot (empty when unreachable)
        let fetch = self.remote.fetch_all().await;
        if let Some(reason) = &fetch.unavailable {
            report.record(&Error::remote_unavailable(reason.clone()));
        }

        // Step 2: Collect unsynced quotes before merging
        let local = self.store.current();
        let to_push: Vec<Quote> = local.iter().filter(|q| !q.is_synced()).cloned().collect();

        // Step 3: Merge and persist
        let outcome = merge(&local, &fetch.quotes);
        report.conflicts_resolved = outcome.conflicts_resolved;
        report.new_from_server = outcome.new_from_server;
        info!(
            "Merged {} local with {} remote quotes: {} conflicts resolved, {} new from server",
            local.len(),
            fetch.quotes.len(),
            outcome.conflicts_resolved,
            outcome.new_from_server
        );

        // Unsynced quotes keep their relative order through the merge.
        let positions: Vec<usize> = outcome
            .merged
            .iter()
            .enumerate()
            .filter(|(_, q)| !q.is_synced())
            .map(|(index, _)| index)
            .collect();

        if let Err(e) = self.store.replace(outcome.merged) {
            error!("Failed to persist merged quotes: {}", e);
            report.record(&e);
        }

        // Step 4: Push unsynced quotes one at a time
        if to_push.is_empty() {
            debug!("No unsynced quotes to push");
        } else {
            info!("Pushing {} unsynced quotes", to_push.len());
            let store = &self.store;
            let issues = &mut report.errors;
            let push = self
                .remote
                .push_each(&to_push, |index, pushed| {
                    let Some(id) = pushed.id else {
                        return Ok(());
                    };
                    let position = positions.get(index).copied().unwrap_or(index);
                    match store.assign_remote_id(position, &to_push[index], id) {
                        Ok(_) => Ok(()),
                        Err(e @ Error::PersistenceFailed(_)) => {
                            warn!("Failed to persist remote id {}: {}", id, e);
                            issues.push(SyncIssue::from(&e));
                            Ok(())
                        }
                        Err(e) => Err(Error::push_failed(&to_push[index], e.to_string())),
                    }
                })
                .await;

            report.pushed = push.pushed;
            if let Some(failure) = &push.failure {
                report.record(failure);
            }
        }

        report.finished_at = Utc::now();
        info!("Quote sync cycle finished: {}", report);
        report
    }
}
