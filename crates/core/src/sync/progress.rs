//! Progress reporting for sync cycles.
//!
//! Callers plug in a reporter to surface cycle start/completion (status bar,
//! notifications, logs) without the orchestrator knowing about them.

use log::{info, warn};

use super::model::SyncReport;

/// Trait for reporting sync progress.
pub trait SyncProgressReporter: Send + Sync {
    /// Report that a cycle is starting.
    fn report_sync_start(&self);

    /// Report that a cycle finished, successfully or with errors.
    fn report_sync_complete(&self, report: &SyncReport);
}

/// A no-op progress reporter for contexts where progress reporting is not needed.
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressReporter;

impl SyncProgressReporter for NoOpProgressReporter {
    fn report_sync_start(&self) {
        // No-op
    }

    fn report_sync_complete(&self, _report: &SyncReport) {
        // No-op
    }
}

/// Reporter that writes cycle outcomes to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingProgressReporter;

impl SyncProgressReporter for LoggingProgressReporter {
    fn report_sync_start(&self) {
        info!("Quote sync started");
    }

    fn report_sync_complete(&self, report: &SyncReport) {
        if report.is_success() {
            info!("Quote sync completed: {}", report);
            return;
        }
        warn!("Quote sync completed with errors: {}", report);
        for issue in &report.errors {
            warn!("  {:?}: {}", issue.kind, issue.message);
        }
    }
}
