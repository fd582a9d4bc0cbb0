//! Serialization tests with on-disk fixtures

use serde_json::{json, Value};

/// Fixture: a node as written to graph.json
fn stored_node_fixture() -> Value {
    json!({
        "id": "credit_union",
        "type": "concept",
        "classification_path": "institution/financial/bank/credit_union",
        "created": "2025-01-15T10:00:00Z",
        "sources": ["concepts/institution/financial/bank/credit_union.md"],
        "relations": {
            "is_a": ["bank", "cooperative"],
            "offers": ["loan"]
        },
        "properties": {
            "aka": "CU",
            "members": 1200
        }
    })
}

/// Fixture: an edge using the older `source_file` field name
fn stored_edge_fixture() -> Value {
    json!({
        "id": "credit_union--is_a--bank",
        "source": "credit_union",
        "relation": "is_a",
        "target": "bank",
        "source_file": "concepts/institution/financial/bank/credit_union.md",
        "created": "2025-01-15T10:00:00Z"
    })
}

/// Fixture: a whole graph section
fn stored_graph_fixture() -> Value {
    json!({
        "metadata": {
            "created": "2025-01-15T09:00:00Z",
            "updated": "2025-01-15T10:00:00Z",
            "version": "0.1.0",
            "description": "Semantic wiki knowledge graph",
            "nodes_count": 2,
            "edges_count": 2
        },
        "nodes": {
            "bank": {
                "id": "bank",
                "type": "concept",
                "classification_path": "institution/financial/bank",
                "created": "2025-01-15T09:00:00Z",
                "sources": ["concepts/bank.md"],
                "relations": { "offers": ["loan"] },
                "properties": {}
            },
            "loan": {
                "id": "loan",
                "type": "concept",
                "classification_path": "loan",
                "created": "2025-01-15T09:00:00Z",
                "sources": [],
                "relations": { "offered_by": ["bank"] },
                "properties": {}
            }
        },
        "edges": [
            {
                "id": "bank--offers--loan",
                "source": "bank",
                "relation": "offers",
                "target": "loan",
                "source_document": "concepts/bank.md",
                "created": "2025-01-15T09:00:00Z"
            },
            {
                "id": "loan--offered_by--bank",
                "source": "loan",
                "relation": "offered_by",
                "target": "bank",
                "source_document": "concepts/bank.md",
                "created": "2025-01-15T09:00:00Z"
            }
        ],
        "taxonomy_mappings": { "bank": "institution/financial/bank" },
        "missing_references": [
            { "reference": "mortgage", "context": "concepts/bank.md", "suggestions": [] }
        ]
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{
        edge::{Edge, EdgeId},
        node::{Node, PropertyValue},
        store::{EdgeInsertion, KnowledgeGraph},
    };

    #[test]
    fn edge_id_serializes_as_string() {
        let id = EdgeId::new("bank", "offers", "loan");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"bank--offers--loan\"");
    }

    #[test]
    fn node_deserializes_from_fixture() {
        let node: Node = serde_json::from_value(stored_node_fixture()).unwrap();

        assert_eq!(node.id, "credit_union");
        assert_eq!(node.node_type, "concept");
        assert_eq!(node.local_name(), "credit_union");
        assert_eq!(node.targets("is_a"), ["bank", "cooperative"]);
        assert_eq!(
            node.properties.get("members"),
            Some(&PropertyValue::Int(1200))
        );
        assert_eq!(
            node.properties.get("aka"),
            Some(&PropertyValue::String("CU".to_string()))
        );
    }

    #[test]
    fn node_writes_type_field() {
        let node = Node::new("bank", "institution/financial/bank");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "concept");
        assert!(value.get("node_type").is_none());
    }

    #[test]
    fn node_defaults_missing_collections() {
        let node: Node = serde_json::from_value(json!({
            "id": "bank",
            "classification_path": "bank",
            "created": "2025-01-15T10:00:00Z"
        }))
        .unwrap();
        assert!(node.is_placeholder());
        assert!(node.relations.is_empty());
        assert_eq!(node.node_type, "concept");
    }

    #[test]
    fn edge_accepts_legacy_source_file() {
        let edge: Edge = serde_json::from_value(stored_edge_fixture()).unwrap();
        assert_eq!(edge.id.as_str(), "credit_union--is_a--bank");
        assert_eq!(
            edge.source_document,
            "concepts/institution/financial/bank/credit_union.md"
        );

        let written = serde_json::to_value(&edge).unwrap();
        assert!(written.get("source_document").is_some());
        assert!(written.get("source_file").is_none());
    }

    #[test]
    fn graph_deserializes_from_fixture() {
        let graph: KnowledgeGraph = serde_json::from_value(stored_graph_fixture()).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.taxonomy_map("bank"), Some("institution/financial/bank"));
        assert_eq!(graph.missing_references()[0].reference, "mortgage");
        assert!(graph.is_defined("bank"));
        assert!(!graph.is_defined("loan"));
        assert!(graph.missing_inverses().is_empty());
    }

    #[test]
    fn loaded_graph_rebuilds_edge_index() {
        let mut graph: KnowledgeGraph = serde_json::from_value(stored_graph_fixture()).unwrap();

        assert!(graph.contains_edge(&EdgeId::new("bank", "offers", "loan")));
        let again = graph.add_edge("bank", "offers", "loan", "concepts/bank.md").unwrap();
        assert_eq!(again, EdgeInsertion::Duplicate);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn empty_object_is_an_empty_graph() {
        let graph: KnowledgeGraph = serde_json::from_value(json!({})).unwrap();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn graph_roundtrips_through_json() {
        let mut graph = KnowledgeGraph::new();
        graph.ensure_node("bank", "institution/financial/bank", "concepts/bank.md");
        graph.add_edge("bank", "offers", "loan", "concepts/bank.md").unwrap();

        let json = serde_json::to_string_pretty(&graph).unwrap();
        let back: KnowledgeGraph = serde_json::from_str(&json).unwrap();

        assert_eq!(back.node_count(), graph.node_count());
        assert_eq!(back.edges(), graph.edges());
        assert_eq!(back.metadata, graph.metadata);
        assert!(!json.contains("edge_ids"));
    }
}
