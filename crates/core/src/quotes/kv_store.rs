//! Durable key-value backends for the local quote store.
//!
//! The store persists a single JSON document under a string key. Two
//! backends are provided:
//!
//! - [`FileKeyValueStore`] - a versioned JSON file on disk
//! - [`MemoryKeyValueStore`] - an in-process map, used by tests and embedders

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

const CURRENT_VERSION: u32 = 1;

/// A durable string-keyed store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// =============================================================================
// File backend
// =============================================================================

#[derive(Serialize, Deserialize, Default)]
struct StoreDocument {
    version: u32,
    entries: HashMap<String, String>,
}

/// Key-value store backed by a single JSON file.
///
/// Every write is a locked read-modify-write of the whole document, so
/// concurrent writers within the process never lose each other's keys.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load_locked(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(HashMap::new());
        }

        let document: StoreDocument = serde_json::from_slice(&raw)?;
        Ok(document.entries)
    }

    fn persist_locked(&self, entries: HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let document = StoreDocument {
            version: CURRENT_VERSION,
            entries,
        };
        let json = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::PersistenceFailed("Store lock poisoned".into()))?;
        Ok(self.load_locked()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::PersistenceFailed("Store lock poisoned".into()))?;
        // An unreadable document is overwritten rather than blocking all writes.
        let mut entries = self.load_locked().unwrap_or_else(|e| {
            log::warn!(
                "Discarding unreadable store file {}: {}",
                self.path.display(),
                e
            );
            HashMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.persist_locked(entries)
            .map_err(|e| Error::PersistenceFailed(e.to_string()))
    }
}

// =============================================================================
// Memory backend
// =============================================================================

/// In-memory key-value store.
///
/// Clones share the same entries. Writes can be made to fail on demand to
/// exercise quota/permission failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    /// Raw value currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::PersistenceFailed("Store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let fail = self.fail_writes.lock().map(|f| *f).unwrap_or(false);
        if fail {
            return Err(Error::PersistenceFailed("Storage quota exceeded".into()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::PersistenceFailed("Store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested").join("store.json"));

        assert_eq!(store.get("quotes").unwrap(), None);
        store.set("quotes", "[]").unwrap();
        store.set("other", "1").unwrap();

        let reopened = FileKeyValueStore::new(store.path().clone());
        assert_eq!(reopened.get("quotes").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_file_store_overwrites_corrupt_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileKeyValueStore::new(&path);
        assert!(store.get("quotes").is_err());
        store.set("quotes", "[]").unwrap();
        assert_eq!(store.get("quotes").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_store_write_failure() {
        let store = MemoryKeyValueStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.set("quotes", "[]"),
            Err(Error::PersistenceFailed(_))
        ));
        assert_eq!(store.raw("quotes"), None);
    }
}
