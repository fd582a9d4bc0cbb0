//! Concept nodes in the knowledge graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Typed property values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<PropertyValue>),
    Object(HashMap<String, PropertyValue>),
}

/// Properties collection
pub type Properties = HashMap<String, PropertyValue>;

fn default_node_type() -> String {
    "concept".to_string()
}

/// A concept in the knowledge graph, keyed by its search-endian path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Search-endian path (unique key)
    pub id: String,
    /// Kind of node; every node produced by parsing is a "concept"
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    /// Canonical classification-endian path
    pub classification_path: String,
    /// When the node was created (never mutated)
    pub created: DateTime<Utc>,
    /// Documents that defined this node
    #[serde(default)]
    pub sources: BTreeSet<String>,
    /// Outgoing relations: relation type -> ordered, unique target ids
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<String>>,
    /// Open key/value bag
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    /// Create a new node with the given id and classification path
    pub fn new(id: impl Into<String>, classification_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: default_node_type(),
            classification_path: classification_path.into(),
            created: Utc::now(),
            sources: BTreeSet::new(),
            relations: BTreeMap::new(),
            properties: HashMap::new(),
        }
    }

    /// Add a property to the node
    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Record a defining document
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.insert(source.into());
        self
    }

    /// A node that only exists because something pointed at it.
    ///
    /// Placeholders have no defining document yet.
    pub fn is_placeholder(&self) -> bool {
        self.sources.is_empty()
    }

    /// Last segment of the classification path
    pub fn local_name(&self) -> &str {
        self.classification_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.classification_path)
    }

    /// Targets of one relation type, in insertion order
    pub fn targets(&self, relation: &str) -> &[String] {
        self.relations
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a target to a relation list; returns false if already present
    pub(crate) fn push_relation(&mut self, relation: &str, target: &str) -> bool {
        let targets = self.relations.entry(relation.to_string()).or_default();
        if targets.iter().any(|t| t == target) {
            return false;
        }
        targets.push(target.to_string());
        true
    }

    /// Drop a target from a relation list, removing the list when it empties
    pub(crate) fn remove_relation(&mut self, relation: &str, target: &str) -> bool {
        let Some(targets) = self.relations.get_mut(relation) else {
            return false;
        };
        let before = targets.len();
        targets.retain(|t| t != target);
        let removed = targets.len() != before;
        if targets.is_empty() {
            self.relations.remove(relation);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relations_are_ordered_and_unique() {
        let mut node = Node::new("credit_union", "institution/financial/bank/credit_union");
        assert!(node.push_relation("is_a", "bank"));
        assert!(node.push_relation("is_a", "cooperative"));
        assert!(!node.push_relation("is_a", "bank"));
        assert_eq!(node.targets("is_a"), ["bank", "cooperative"]);
    }

    #[test]
    fn removing_last_target_drops_relation() {
        let mut node = Node::new("bank", "bank");
        node.push_relation("offers", "loan");
        assert!(node.remove_relation("offers", "loan"));
        assert!(!node.relations.contains_key("offers"));
        assert!(!node.remove_relation("offers", "loan"));
    }

    #[test]
    fn placeholder_until_sourced() {
        let node = Node::new("loan", "loan");
        assert!(node.is_placeholder());
        assert!(!node.with_source("concepts/loan.md").is_placeholder());
    }

    #[test]
    fn local_name_is_last_segment() {
        assert_eq!(Node::new("bank", "institution/financial/bank").local_name(), "bank");
        assert_eq!(Node::new("bank", "bank").local_name(), "bank");
    }
}
