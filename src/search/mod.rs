//! Search over classification paths
//!
//! An inverted index keyed by path segment, specificity-ranked term
//! search, and ancestor traversal along is_a edges.

mod engine;
mod hierarchy;
mod index;
mod types;

pub use engine::SearchEngine;
pub use hierarchy::MAX_HOPS;
pub use index::SearchIndex;
pub use types::{IndexEntry, SearchOptions, SearchResult, TreeNode};
