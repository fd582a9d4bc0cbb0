//! Storage trait definitions

use crate::changelog::ChangelogEntry;
use crate::graph::KnowledgeGraph;
use crate::taxonomy::TaxonomyIndex;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage connection lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The three persisted sections
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub graph: KnowledgeGraph,
    pub taxonomy: TaxonomyIndex,
    /// Append-only
    pub changelog: Vec<ChangelogEntry>,
}

/// Trait for wiki storage backends
///
/// A missing store loads as an empty snapshot. Saving never drops
/// changelog entries already persisted.
pub trait WikiStore {
    fn load(&self) -> StorageResult<Snapshot>;

    fn save(&self, snapshot: &Snapshot) -> StorageResult<()>;
}

/// Constructors for stores backed by a single file
pub trait OpenStore: WikiStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
