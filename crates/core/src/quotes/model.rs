//! Quote domain model.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A short text record with a category.
///
/// `id` is assigned by the remote service. A quote without one was created
/// locally and has not been accepted upstream yet ("unsynced"). Quotes are
/// plain values: the store hands out clones and replaces entries wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    pub category: String,
}

impl Quote {
    /// Create an unsynced quote, trimming and validating both fields.
    pub fn new_local(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() {
            return Err(Error::validation("Quote text must not be empty"));
        }
        if category.is_empty() {
            return Err(Error::validation("Quote category must not be empty"));
        }
        Ok(Self {
            id: None,
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Create a quote that already carries a remote identity.
    pub fn with_id(id: i64, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            category: category.into(),
        }
    }

    /// Returns true if the remote has assigned this quote an identity.
    pub fn is_synced(&self) -> bool {
        self.id.is_some()
    }

    /// Returns true if text and category are equal (ids are ignored).
    pub fn same_content(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }

    /// Returns true if both fields are non-empty after trimming.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && !self.category.trim().is_empty()
    }
}

/// The collection used when nothing usable was ever persisted.
pub fn seed_quotes() -> Vec<Quote> {
    [
        ("Love is patient.", "love"),
        ("Be happy", "happiness"),
        ("Food is life.", "food"),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        id: None,
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}
