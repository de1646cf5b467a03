//! Sync cycle models: engine state, per-cycle report and configuration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::quotes::Quote;

/// Whether a cycle is currently executing. There is no failed state: every
/// cycle ends back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Running,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncState::Idle => write!(f, "idle"),
            SyncState::Running => write!(f, "running"),
        }
    }
}

/// How a `run_cycle` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// The cycle ran to the end (possibly with recorded errors).
    Completed,
    /// Another cycle was in progress; nothing was done.
    AlreadyRunning,
}

/// Category of a failure recorded during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncIssueKind {
    RemoteUnavailable,
    PushFailed,
    PersistenceFailed,
    Unexpected,
}

/// A failure recorded in a [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncIssue {
    pub kind: SyncIssueKind,
    pub message: String,
    /// The quote involved, for push failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

impl SyncIssue {
    pub fn new(kind: SyncIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            quote: None,
        }
    }
}

impl From<&Error> for SyncIssue {
    fn from(error: &Error) -> Self {
        match error {
            Error::RemoteUnavailable(msg) => SyncIssue::new(SyncIssueKind::RemoteUnavailable, msg),
            Error::PushFailed { quote, cause } => SyncIssue {
                kind: SyncIssueKind::PushFailed,
                message: cause.clone(),
                quote: Some(quote.as_ref().clone()),
            },
            Error::PersistenceFailed(msg) => {
                SyncIssue::new(SyncIssueKind::PersistenceFailed, msg)
            }
            other => SyncIssue::new(SyncIssueKind::Unexpected, other.to_string()),
        }
    }
}

/// Report returned by every `run_cycle` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub status: CycleStatus,
    pub conflicts_resolved: usize,
    pub new_from_server: usize,
    /// Unsynced quotes the remote accepted during this cycle.
    pub pushed: usize,
    pub errors: Vec<SyncIssue>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn started(now: DateTime<Utc>) -> Self {
        Self {
            status: CycleStatus::Completed,
            conflicts_resolved: 0,
            new_from_server: 0,
            pushed: 0,
            errors: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Report for a trigger that found a cycle already in progress.
    pub fn already_running() -> Self {
        let now = Utc::now();
        Self {
            status: CycleStatus::AlreadyRunning,
            ..Self::started(now)
        }
    }

    pub fn is_already_running(&self) -> bool {
        self.status == CycleStatus::AlreadyRunning
    }

    /// True for a completed cycle with no recorded errors.
    pub fn is_success(&self) -> bool {
        self.status == CycleStatus::Completed && self.errors.is_empty()
    }

    /// True if the remote could not be reached during this cycle.
    pub fn remote_unavailable(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind == SyncIssueKind::RemoteUnavailable)
    }

    pub(crate) fn record(&mut self, error: &Error) {
        self.errors.push(SyncIssue::from(error));
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_already_running() {
            return write!(f, "skipped: sync already running");
        }
        write!(
            f,
            "{} conflicts resolved, {} new from server, {} pushed",
            self.conflicts_resolved, self.new_from_server, self.pushed
        )?;
        if !self.errors.is_empty() {
            write!(f, " ({} errors)", self.errors.len())?;
        }
        Ok(())
    }
}

/// Configuration for the periodic sync trigger.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Time between scheduled cycles.
    pub interval: Duration,
    /// Delay before the first scheduled cycle.
    pub initial_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            initial_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.initial_delay, Duration::ZERO);
    }

    #[test]
    fn test_issue_from_push_failure_keeps_quote() {
        let quote = Quote::new_local("a", "b").unwrap();
        let issue = SyncIssue::from(&Error::push_failed(&quote, "HTTP 500"));
        assert_eq!(issue.kind, SyncIssueKind::PushFailed);
        assert_eq!(issue.message, "HTTP 500");
        assert_eq!(issue.quote, Some(quote));
    }

    #[test]
    fn test_report_display() {
        let mut report = SyncReport::started(Utc::now());
        report.pushed = 2;
        report.record(&Error::remote_unavailable("timeout"));
        assert_eq!(
            report.to_string(),
            "0 conflicts resolved, 0 new from server, 2 pushed (1 errors)"
        );
        assert!(report.remote_unavailable());
        assert!(!report.is_success());
        assert_eq!(
            SyncReport::already_running().to_string(),
            "skipped: sync already running"
        );
    }
}
