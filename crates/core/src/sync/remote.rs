//! Remote side of synchronization.
//!
//! [`QuoteApiClient`] is the transport seam (implemented over HTTP by the
//! connect crate, and by mocks in tests). [`RemoteClient`] wraps it with the
//! failure policy the orchestrator relies on:
//!
//! - a failed fetch degrades to an empty snapshot plus an "unavailable" reason
//! - pushes go one quote at a time and stop at the first failure

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::errors::{Error, Result};
use crate::quotes::Quote;

/// Transport for the remote quote collection.
#[async_trait]
pub trait QuoteApiClient: Send + Sync {
    /// Fetch every quote the remote holds, mapped to the domain shape.
    async fn fetch_quotes(&self) -> Result<Vec<Quote>>;

    /// Create `quote` remotely and return the identity the remote assigned.
    async fn create_quote(&self, quote: &Quote) -> Result<i64>;
}

/// Snapshot returned by [`RemoteClient::fetch_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFetch {
    pub quotes: Vec<Quote>,
    /// Set when the remote could not be reached; `quotes` is then empty.
    pub unavailable: Option<String>,
}

impl RemoteFetch {
    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }
}

/// Outcome of [`RemoteClient::push_each`].
#[derive(Debug, Default)]
pub struct PushOutcome {
    /// Number of quotes the remote accepted.
    pub pushed: usize,
    /// The failure that stopped the batch, if any.
    pub failure: Option<Error>,
}

/// Remote operations with the degradation policy applied.
#[derive(Clone)]
pub struct RemoteClient {
    api: Arc<dyn QuoteApiClient>,
}

impl RemoteClient {
    pub fn new(api: Arc<dyn QuoteApiClient>) -> Self {
        Self { api }
    }

    /// Fetch the remote collection.
    ///
    /// Never fails: an unreachable remote yields an empty snapshot with
    /// `unavailable` set. Records without an id or with blank fields are
    /// dropped.
    pub async fn fetch_all(&self) -> RemoteFetch {
        match self.api.fetch_quotes().await {
            Ok(quotes) => {
                let total = quotes.len();
                let quotes: Vec<Quote> = quotes
                    .into_iter()
                    .filter(|q| q.is_synced() && q.is_well_formed())
                    .collect();
                if quotes.len() != total {
                    debug!(
                        "Dropped {} remote records without id or content",
                        total - quotes.len()
                    );
                }
                debug!("Fetched {} remote quotes", quotes.len());
                RemoteFetch {
                    quotes,
                    unavailable: None,
                }
            }
            Err(e) => {
                warn!("Remote fetch failed, continuing with empty snapshot: {}", e);
                let reason = match e {
                    Error::RemoteUnavailable(msg) => msg,
                    other => other.to_string(),
                };
                RemoteFetch {
                    quotes: Vec::new(),
                    unavailable: Some(reason),
                }
            }
        }
    }

    /// Push one unsynced quote and return it with its remote identity.
    pub async fn push(&self, quote: &Quote) -> Result<Quote> {
        if quote.is_synced() {
            return Err(Error::validation(format!(
                "Quote {:?} already has a remote id",
                quote.id
            )));
        }

        match self.api.create_quote(quote).await {
            Ok(id) => {
                debug!("Remote assigned id {} to \"{}\"", id, quote.text);
                Ok(Quote {
                    id: Some(id),
                    ..quote.clone()
                })
            }
            Err(e) => Err(Error::push_failed(quote, e.to_string())),
        }
    }

    /// Push `quotes` in order, calling `on_pushed(index, pushed)` after each
    /// success. The first failure, from the remote or from `on_pushed`,
    /// abandons the rest of the batch.
    pub async fn push_each<F>(&self, quotes: &[Quote], mut on_pushed: F) -> PushOutcome
    where
        F: FnMut(usize, &Quote) -> Result<()> + Send,
    {
        let mut outcome = PushOutcome::default();
        for (index, quote) in quotes.iter().enumerate() {
            let result = match self.push(quote).await {
                Ok(pushed) => on_pushed(index, &pushed),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                let remaining = quotes.len() - index - 1;
                warn!("{} ({} remaining pushes abandoned)", e, remaining);
                outcome.failure = Some(e);
                break;
            }
            outcome.pushed += 1;
        }
        outcome
    }
}
