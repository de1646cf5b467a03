//! Import and export of the quote collection as JSON documents.
//!
//! # Key Invariants
//!
//! - A payload that is not a JSON array is rejected before the collection is touched
//! - Imported quotes are always unsynced: any incoming `id` is dropped
//! - Records without non-blank `text` and `category` are skipped, not fatal

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::Quote;
use super::store::LocalStore;
use crate::errors::{Error, Result};

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Quotes appended to the collection.
    pub imported: usize,
    /// Array elements that were not quote-shaped.
    pub skipped: usize,
}

/// Parse an import payload into unsynced quotes.
///
/// Returns the accepted quotes and the number of skipped elements.
pub fn parse_import(payload: &str) -> Result<(Vec<Quote>, usize)> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| Error::MalformedImport(format!("invalid JSON: {}", e)))?;

    let Value::Array(records) = value else {
        return Err(Error::MalformedImport(
            "expected a JSON array of quotes".to_string(),
        ));
    };

    let mut quotes = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match quote_from_record(&record) {
            Some(quote) => quotes.push(quote),
            None => {
                debug!("Skipping import record that is not quote-shaped: {}", record);
                skipped += 1;
            }
        }
    }
    Ok((quotes, skipped))
}

fn quote_from_record(record: &Value) -> Option<Quote> {
    let text = record.get("text")?.as_str()?;
    let category = record.get("category")?.as_str()?;
    Quote::new_local(text, category).ok()
}

/// Append the quotes from an externally supplied JSON payload.
pub fn import_quotes(store: &LocalStore, payload: &str) -> Result<ImportSummary> {
    let (quotes, skipped) = parse_import(payload)?;
    let summary = ImportSummary {
        imported: quotes.len(),
        skipped,
    };
    store.append(quotes)?;
    info!(
        "Imported {} quotes ({} skipped)",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

/// Import quotes from a JSON file.
pub fn import_quotes_from_file(store: &LocalStore, path: &Path) -> Result<ImportSummary> {
    let payload = fs::read_to_string(path)?;
    import_quotes(store, &payload)
}

/// Serialize the current collection as a pretty-printed JSON array.
pub fn export_quotes(store: &LocalStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&store.current())?)
}

/// Write the current collection to a JSON file.
pub fn export_quotes_to_file(store: &LocalStore, path: &Path) -> Result<usize> {
    let quotes = store.current();
    fs::write(path, serde_json::to_string_pretty(&quotes)?)?;
    info!("Exported {} quotes to {}", quotes.len(), path.display());
    Ok(quotes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::kv_store::MemoryKeyValueStore;
    use std::sync::Arc;

    fn empty_store() -> LocalStore {
        let store = LocalStore::new(Arc::new(MemoryKeyValueStore::new()));
        store.replace(vec![Quote::with_id(1, "existing", "x")]).unwrap();
        store
    }

    #[test]
    fn test_import_rejects_non_array_payload() {
        let store = empty_store();
        for payload in [r#"{"text":"a","category":"b"}"#, "42", "not json"] {
            assert!(matches!(
                import_quotes(&store, payload),
                Err(Error::MalformedImport(_))
            ));
        }
        assert_eq!(store.current(), vec![Quote::with_id(1, "existing", "x")]);
    }

    #[test]
    fn test_import_normalizes_ids_and_skips_bad_records() {
        let store = empty_store();
        let payload = r#"[
            {"id": 99, "text": "From elsewhere", "category": "misc"},
            {"text": "No id", "category": "misc"},
            {"text": "", "category": "misc"},
            "just a string",
            {"text": "Missing category"}
        ]"#;

        let summary = import_quotes(&store, payload).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                skipped: 3
            }
        );

        let current = store.current();
        assert_eq!(current.len(), 3);
        assert!(current[1..].iter().all(|q| q.id.is_none()));
        assert_eq!(current[1].text, "From elsewhere");
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let store = empty_store();

        assert_eq!(export_quotes_to_file(&store, &path).unwrap(), 1);

        let other = LocalStore::new(Arc::new(MemoryKeyValueStore::new()));
        other.replace(Vec::new()).unwrap();
        let summary = import_quotes_from_file(&other, &path).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(other.current(), vec![Quote::new_local("existing", "x").unwrap()]);
    }

    #[test]
    fn test_export_is_json_array() {
        let store = empty_store();
        let json = export_quotes(&store).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["text"], "existing");
    }
}
