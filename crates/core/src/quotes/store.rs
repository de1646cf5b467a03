//! Local quote store.
//!
//! [`LocalStore`] owns the canonical in-memory collection and is its only
//! writer. Every mutation is written through to a [`KeyValueStore`] under
//! [`QUOTES_KEY`] as a JSON array. Readers receive copies.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use super::kv_store::KeyValueStore;
use super::model::{seed_quotes, Quote};
use crate::errors::{Error, Result};

/// Key under which the collection is persisted.
pub const QUOTES_KEY: &str = "quotes";

/// Category filter value that matches every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Owner of the local quote collection and its persistence.
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
    quotes: RwLock<Vec<Quote>>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("quotes", &self.current().len())
            .finish()
    }
}

impl LocalStore {
    /// Create a store with an empty in-memory collection. Call [`load`](Self::load)
    /// to populate it from the backend.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            quotes: RwLock::new(Vec::new()),
        }
    }

    /// Create a store and immediately load the persisted collection.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(backend);
        store.load();
        store
    }

    /// Load the most recently persisted collection into memory and return it.
    ///
    /// Falls back to the seed collection when nothing was persisted, the
    /// payload is not an array of well-formed quotes, or the backend cannot
    /// be read. None of these are fatal.
    pub fn load(&self) -> Vec<Quote> {
        let loaded = match self.backend.get(QUOTES_KEY) {
            Ok(Some(raw)) => match parse_persisted(&raw) {
                Ok(quotes) => {
                    debug!("Loaded {} persisted quotes", quotes.len());
                    quotes
                }
                Err(e) => {
                    warn!("Discarding malformed persisted quotes, using seed: {}", e);
                    seed_quotes()
                }
            },
            Ok(None) => {
                debug!("No persisted quotes, using seed collection");
                seed_quotes()
            }
            Err(e) => {
                warn!("Failed to read persisted quotes, using seed: {}", e);
                seed_quotes()
            }
        };

        *self.write() = loaded.clone();
        loaded
    }

    /// Snapshot of the live collection.
    pub fn current(&self) -> Vec<Quote> {
        self.read().clone()
    }

    /// Number of quotes in the collection.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Replace the whole collection and persist it.
    ///
    /// The in-memory collection is updated even when persisting fails; the
    /// failure is returned as [`Error::PersistenceFailed`]. A collection in
    /// which two quotes share an id is rejected and nothing changes.
    pub fn replace(&self, quotes: Vec<Quote>) -> Result<()> {
        if let Some(id) = duplicate_id(&quotes) {
            return Err(Error::validation(format!(
                "Refusing to store quote id {} more than once",
                id
            )));
        }
        let mut guard = self.write();
        *guard = quotes;
        self.persist(&guard)
    }

    /// Append a new unsynced quote and persist.
    pub fn add(&self, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new_local(text, category)?;
        let mut guard = self.write();
        guard.push(quote.clone());
        self.persist(&guard)?;
        Ok(quote)
    }

    /// Append several quotes in order and persist once.
    pub fn append(&self, quotes: Vec<Quote>) -> Result<()> {
        if quotes.is_empty() {
            return Ok(());
        }
        let mut guard = self.write();
        guard.extend(quotes);
        self.persist(&guard)
    }

    /// Promote an unsynced quote to the identity assigned by the remote.
    ///
    /// `position` is where the quote sat when the push started. If the
    /// collection has shifted since, the first unsynced quote with the same
    /// content is used instead. Returns `Ok(false)` if no such quote is left.
    /// An `id` already carried by another quote is rejected.
    pub fn assign_remote_id(&self, position: usize, expected: &Quote, id: i64) -> Result<bool> {
        let mut guard = self.write();

        if guard.iter().any(|q| q.id == Some(id)) {
            return Err(Error::validation(format!(
                "Remote assigned id {} which is already in use",
                id
            )));
        }

        let matches = |q: &Quote| !q.is_synced() && q.same_content(expected);
        let slot = match guard.get(position) {
            Some(q) if matches(q) => Some(position),
            _ => guard.iter().position(matches),
        };

        let Some(index) = slot else {
            warn!(
                "Pushed quote \"{}\" is no longer in the local collection",
                expected.text
            );
            return Ok(false);
        };

        guard[index].id = Some(id);
        self.persist(&guard)?;
        Ok(true)
    }

    /// Quotes that have not been accepted by the remote yet, in order.
    pub fn unsynced(&self) -> Vec<Quote> {
        self.read()
            .iter()
            .filter(|q| !q.is_synced())
            .cloned()
            .collect()
    }

    /// Distinct categories, lowercased and sorted.
    pub fn categories(&self) -> Vec<String> {
        self.read()
            .iter()
            .map(|q| q.category.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Quotes whose category matches case-insensitively. [`ALL_CATEGORIES`]
    /// returns the whole collection.
    pub fn by_category(&self, category: &str) -> Vec<Quote> {
        let wanted = category.trim().to_lowercase();
        let quotes = self.read();
        if wanted == ALL_CATEGORIES {
            return quotes.clone();
        }
        quotes
            .iter()
            .filter(|q| q.category.to_lowercase() == wanted)
            .cloned()
            .collect()
    }

    fn persist(&self, quotes: &[Quote]) -> Result<()> {
        let json = serde_json::to_string(quotes)
            .map_err(|e| Error::PersistenceFailed(e.to_string()))?;
        self.backend.set(QUOTES_KEY, &json).map_err(|e| match e {
            Error::PersistenceFailed(msg) => Error::PersistenceFailed(msg),
            other => Error::PersistenceFailed(other.to_string()),
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Quote>> {
        self.quotes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Quote>> {
        self.quotes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse a persisted payload, requiring an array of well-formed quotes with
/// unique ids.
fn parse_persisted(raw: &str) -> Result<Vec<Quote>> {
    let quotes: Vec<Quote> = serde_json::from_str(raw)?;
    if let Some(bad) = quotes.iter().find(|q| !q.is_well_formed()) {
        return Err(Error::validation(format!(
            "Persisted quote {:?} has blank text or category",
            bad.id
        )));
    }
    if let Some(id) = duplicate_id(&quotes) {
        return Err(Error::validation(format!(
            "Persisted quote id {} appears more than once",
            id
        )));
    }
    Ok(quotes)
}

/// First id carried by more than one quote.
fn duplicate_id(quotes: &[Quote]) -> Option<i64> {
    let mut seen = HashSet::with_capacity(quotes.len());
    quotes
        .iter()
        .filter_map(|q| q.id)
        .find(|id| !seen.insert(*id))
}
