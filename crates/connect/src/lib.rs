//! Quote Sync Connect - HTTP transport for the remote quote collection.
//!
//! Implements [`quotesync_core::sync::QuoteApiClient`] over `reqwest` and
//! maps the remote wire records to domain quotes.

pub mod client;
pub mod mapping;

pub use client::{HttpQuoteApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use mapping::{server_category, ApiNewPost, ApiPost, SERVER_CATEGORY_PREFIX};
