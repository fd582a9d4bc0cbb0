//! Core graph data structures

mod cycle;
mod edge;
mod node;
pub mod relation;
mod store;

#[cfg(test)]
mod tests;

pub use cycle::would_create_cycle;
pub use edge::{Edge, EdgeId};
pub use node::{Node, Properties, PropertyValue};
pub use relation::{inverse_of, HAS_INSTANCE, IS_A};
pub use store::{EdgeInsertion, GraphMetadata, KnowledgeGraph, MissingReference};
