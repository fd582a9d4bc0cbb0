//! Storage backends
//!
//! Persistence goes through the `WikiStore` trait. `JsonStore` keeps one
//! JSON file per section; `SqliteStore` keeps everything in one database.

mod json;
mod sqlite;
mod traits;

pub use json::{JsonStore, CHANGELOG_FILE, GRAPH_FILE, TAXONOMY_FILE};
pub use sqlite::SqliteStore;
pub use traits::{OpenStore, Snapshot, StorageError, StorageResult, WikiStore};
