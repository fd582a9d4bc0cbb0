//! KnowledgeGraph: nodes, edges and the search-to-classification mirror

use super::cycle;
use super::edge::{Edge, EdgeId};
use super::node::{Node, PropertyValue};
use super::relation::{hierarchy_orientation, inverse_of};
use crate::engine::{WikiError, WikiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Metadata about a graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the graph was first created
    pub created: DateTime<Utc>,
    /// Last mutation
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes_count: usize,
    #[serde(default)]
    pub edges_count: usize,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            created: Utc::now(),
            updated: None,
            version: default_version(),
            description: "Semantic wiki knowledge graph".to_string(),
            nodes_count: 0,
            edges_count: 0,
        }
    }
}

/// A `[[reference]]` that names no known concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReference {
    /// The reference as written
    pub reference: String,
    /// Document that mentions it
    pub context: String,
    /// Up to three similar existing ids
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Outcome of an edge insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsertion {
    /// The edge (and its inverse, if any) was added
    Inserted,
    /// An edge with the same id already existed; nothing changed
    Duplicate,
}

/// The knowledge graph
///
/// Nodes are keyed by search-endian id and iterate in id order. Edges are
/// kept in insertion order alongside an id index used for deduplication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawGraph")]
pub struct KnowledgeGraph {
    pub metadata: GraphMetadata,
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    taxonomy_mappings: BTreeMap<String, String>,
    missing_references: Vec<MissingReference>,
    #[serde(skip)]
    edge_ids: HashSet<EdgeId>,
}

#[derive(Deserialize)]
struct RawGraph {
    #[serde(default)]
    metadata: GraphMetadata,
    #[serde(default)]
    nodes: BTreeMap<String, Node>,
    #[serde(default)]
    edges: Vec<Edge>,
    #[serde(default)]
    taxonomy_mappings: BTreeMap<String, String>,
    #[serde(default)]
    missing_references: Vec<MissingReference>,
}

impl From<RawGraph> for KnowledgeGraph {
    fn from(raw: RawGraph) -> Self {
        let edge_ids = raw.edges.iter().map(|e| e.id.clone()).collect();
        Self {
            metadata: raw.metadata,
            nodes: raw.nodes,
            edges: raw.edges,
            taxonomy_mappings: raw.taxonomy_mappings,
            missing_references: raw.missing_references,
            edge_ids,
        }
    }
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // === Nodes ===

    /// Create the node if absent, otherwise record `source_document` as one more source.
    ///
    /// An existing node keeps its classification path. Returns true if the node was created.
    pub fn ensure_node(
        &mut self,
        id: &str,
        classification_path: &str,
        source_document: &str,
    ) -> bool {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.sources.insert(source_document.to_string()) {
                self.touch();
            }
            return false;
        }
        let node = Node::new(id, classification_path).with_source(source_document);
        self.nodes.insert(id.to_string(), node);
        self.taxonomy_mappings
            .insert(id.to_string(), classification_path.to_string());
        self.touch();
        true
    }

    /// Overwrite a node's classification path and its mirrored mapping
    pub fn set_classification(&mut self, id: &str, classification_path: &str) -> WikiResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| WikiError::NodeNotFound(id.to_string()))?;
        node.classification_path = classification_path.to_string();
        self.taxonomy_mappings
            .insert(id.to_string(), classification_path.to_string());
        self.touch();
        Ok(())
    }

    /// Record a defining document for `id`.
    ///
    /// A placeholder (or any node when `adopt` is set) takes on
    /// `classification_path`; otherwise this is [`Self::ensure_node`].
    pub fn define_node(
        &mut self,
        id: &str,
        classification_path: &str,
        source_document: &str,
        adopt: bool,
    ) {
        if let Some(node) = self.nodes.get_mut(id) {
            if (adopt || node.is_placeholder()) && node.classification_path != classification_path {
                node.classification_path = classification_path.to_string();
                self.taxonomy_mappings
                    .insert(id.to_string(), classification_path.to_string());
                self.touch();
            }
        }
        self.ensure_node(id, classification_path, source_document);
    }

    /// Set a literal property on an existing node
    pub fn set_property(&mut self, id: &str, key: &str, value: PropertyValue) -> WikiResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| WikiError::NodeNotFound(id.to_string()))?;
        node.properties.insert(key.to_string(), value);
        self.touch();
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A node that some document defined (not just pointed at)
    pub fn is_defined(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| !n.is_placeholder())
    }

    /// First node (in id order) whose classification path equals `path`
    pub fn find_by_classification(&self, path: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.classification_path == path)
    }

    // === Taxonomy mirror ===

    pub fn taxonomy_map(&self, search_path: &str) -> Option<&str> {
        self.taxonomy_mappings.get(search_path).map(String::as_str)
    }

    pub fn taxonomy_mappings(&self) -> &BTreeMap<String, String> {
        &self.taxonomy_mappings
    }

    // === Edges ===

    /// Insert `source -relation-> target` with its inverse.
    ///
    /// Hierarchy edges (is_a, and has_instance as the reversed is_a) are
    /// checked for cycles first; a cycle rejects the insertion and leaves
    /// the graph untouched. An edge id that already exists is a no-op.
    /// A missing source becomes a placeholder node; a missing target does
    /// too when the relation has an inverse.
    pub fn add_edge(
        &mut self,
        source: &str,
        relation: &str,
        target: &str,
        source_document: &str,
    ) -> WikiResult<EdgeInsertion> {
        if let Some((child, parent)) = hierarchy_orientation(source, relation, target) {
            if let Some(cycle) = self.would_create_cycle(child, parent) {
                return Err(WikiError::CycleDetected { cycle });
            }
        }

        let edge = Edge::new(source, relation, target, source_document);
        if self.edge_ids.contains(&edge.id) {
            return Ok(EdgeInsertion::Duplicate);
        }

        let inverse =
            inverse_of(relation).map(|inv| Edge::new(target, inv, source, source_document));
        self.insert_edge(edge);
        // One level only: the inverse of the inverse is the edge just inserted
        if let Some(inverse) = inverse {
            self.insert_edge(inverse);
        }
        self.touch();
        Ok(EdgeInsertion::Inserted)
    }

    /// Remove a single edge by id.
    ///
    /// The inverse edge has its own id and is left in place.
    pub fn remove_edge(&mut self, id: &EdgeId) -> WikiResult<Edge> {
        let position = self
            .edges
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| WikiError::EdgeNotFound(id.to_string()))?;
        let edge = self.edges.remove(position);
        self.edge_ids.remove(&edge.id);
        if let Some(node) = self.nodes.get_mut(&edge.source) {
            node.remove_relation(&edge.relation, &edge.target);
        }
        self.touch();
        Ok(edge)
    }

    /// Would `source is_a target` close a cycle? Returns the cycle path if so.
    pub fn would_create_cycle(&self, source: &str, target: &str) -> Option<Vec<String>> {
        cycle::would_create_cycle(&self.edges, source, target)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge_ids.contains(id)
    }

    /// Edges whose declared inverse is absent.
    ///
    /// Construction keeps this empty; only externally loaded data can trip it.
    pub fn missing_inverses(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| {
                inverse_of(&e.relation).is_some_and(|inv| !self.edge_ids.contains(&e.inverse_id(inv)))
            })
            .collect()
    }

    // === Missing references ===

    pub fn missing_references(&self) -> &[MissingReference] {
        &self.missing_references
    }

    pub fn set_missing_references(&mut self, missing: Vec<MissingReference>) {
        self.missing_references = missing;
        self.touch();
    }

    /// Stamp the update time and refresh the counts
    pub fn touch(&mut self) {
        self.metadata.updated = Some(Utc::now());
        self.metadata.nodes_count = self.nodes.len();
        self.metadata.edges_count = self.edges.len();
    }

    fn insert_edge(&mut self, edge: Edge) -> bool {
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        // Targets only become nodes through their own inverse edge; one-way
        // relations (`founded: 1901`) point at plain values
        self.node_or_placeholder(&edge.source)
            .push_relation(&edge.relation, &edge.target);
        self.edges.push(edge);
        true
    }

    fn node_or_placeholder(&mut self, id: &str) -> &mut Node {
        let classification = self
            .taxonomy_mappings
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string());
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| Node::new(id, classification))
    }
}
