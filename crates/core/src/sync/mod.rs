//! Synchronization engine.
//!
//! ```text
//! trigger ─► SyncOrchestrator ─► RemoteClient::fetch_all ─► reconcile::merge
//!                  │                                            │
//!                  ▼                                            ▼
//!            RemoteClient::push_each ◄──────────────── LocalStore::replace
//! ```
//!
//! - [`reconcile`] - Pure merge of local and remote collections
//! - [`remote`] - Transport trait and the fetch/push failure policy
//! - [`orchestrator`] - Single-flight sync cycle
//! - [`scheduler`] - Periodic trigger bound to the orchestrator
//! - [`progress`] - Cycle start/completion reporting
//! - [`model`] - State, report and configuration types

pub mod model;
pub mod orchestrator;
pub mod progress;
pub mod reconcile;
pub mod remote;
pub mod scheduler;


pub use model::{CycleStatus, SyncConfig, SyncIssue, SyncIssueKind, SyncReport, SyncState};
pub use orchestrator::SyncOrchestrator;
pub use progress::{LoggingProgressReporter, NoOpProgressReporter, SyncProgressReporter};
pub use reconcile::{merge, MergeOutcome};
pub use remote::{PushOutcome, QuoteApiClient, RemoteClient, RemoteFetch};
pub use scheduler::start_sync_scheduler;
