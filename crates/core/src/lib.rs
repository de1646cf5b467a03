//! Quote Sync Core - Local quote store and synchronization engine.
//!
//! This crate keeps a locally persisted quote collection consistent with a
//! remote copy. It is transport-agnostic: the remote is reached through the
//! [`sync::QuoteApiClient`] trait, implemented over HTTP by the `connect` crate.

pub mod errors;
pub mod quotes;
pub mod sync;

pub use quotes::{LocalStore, Quote};
pub use sync::{SyncOrchestrator, SyncReport};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
