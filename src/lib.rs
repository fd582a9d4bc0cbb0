//! Semwiki: a semantic wiki knowledge graph
//!
//! Markdown documents declare concepts with inline relation blocks
//! (`[[credit_union]]{is_a: bank, offers: [loans, savings]}`). Each concept
//! gets two addresses: a short search-endian name and a classification-endian
//! path built from its is_a ancestry (`institution/financial/bank/credit_union`).
//!
//! # Core Concepts
//!
//! - **Graph**: nodes keyed by search path, typed edges with automatic inverses,
//!   and an is_a subgraph that is kept acyclic
//! - **Taxonomy**: the bidirectional search <-> classification mapping, with
//!   aliases for concepts that have several parents
//! - **Search**: an inverted index over classification path segments, ranked by
//!   specificity
//!
//! # Example
//!
//! ```
//! use semwiki::WikiEngine;
//!
//! let mut engine = WikiEngine::new();
//! let context = engine.context_for("concepts/bank.md");
//! engine.ingest_document(&context, "[[bank]]{is_a: institution/financial}");
//! assert_eq!(
//!     engine.taxonomy().classification_of("bank"),
//!     Some("institution/financial/bank")
//! );
//! ```

pub mod changelog;
pub mod config;
pub mod engine;
pub mod graph;
pub mod parser;
pub mod search;
pub mod storage;
pub mod taxonomy;
pub mod workspace;

pub use changelog::{ChangeAction, ChangelogEntry, StagedChange};
pub use config::{Backend, WikiConfig};
pub use engine::{Advisory, DocumentReport, WikiEngine, WikiError, WikiResult, WikiStats};
pub use graph::{Edge, EdgeId, KnowledgeGraph, MissingReference, Node, PropertyValue};
pub use search::{SearchEngine, SearchIndex, SearchOptions, SearchResult, TreeNode};
pub use storage::{JsonStore, OpenStore, Snapshot, SqliteStore, StorageError, StorageResult, WikiStore};
pub use taxonomy::{ParseContext, PathResolver, Resolution, ResolutionOrigin, TaxonomyIndex};
pub use workspace::{ProcessOptions, ProcessReport, Workspace, WorkspaceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
