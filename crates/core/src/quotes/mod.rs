//! Local quote collection.
//!
//! - [`model`] - The `Quote` record and the seed collection
//! - [`kv_store`] - Durable key-value backends (file, memory)
//! - [`store`] - `LocalStore`, the single writer of the collection
//! - [`transfer`] - JSON import and export

pub mod kv_store;
pub mod model;
pub mod store;
pub mod transfer;

pub use kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use model::{seed_quotes, Quote};
pub use store::{LocalStore, ALL_CATEGORIES, QUOTES_KEY};
pub use transfer::{
    export_quotes, export_quotes_to_file, import_quotes, import_quotes_from_file, parse_import,
    ImportSummary,
};
