//! Typed, immutable edges between concepts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deterministic edge identifier: `source--relation--target`
///
/// The id is the deduplication key; two edges with the same id are the same edge.
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Build the id for an edge
    pub fn new(source: &str, relation: &str, target: &str) -> Self {
        Self(format!("{source}--{relation}--{target}"))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A directed, typed relation between two concepts
///
/// Edges are never updated in place. Correcting a relation means removing
/// the edge by id and inserting a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Deterministic identifier
    pub id: EdgeId,
    /// Source concept (search-endian id)
    pub source: String,
    /// Relation type (e.g., "is_a", "part_of", "offers")
    pub relation: String,
    /// Target concept (search-endian id)
    pub target: String,
    /// Document that declared this relation
    #[serde(alias = "source_file")]
    pub source_document: String,
    /// When the edge was created
    pub created: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge, deriving its id from the endpoints and relation
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
        source_document: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let relation = relation.into();
        let target = target.into();
        Self {
            id: EdgeId::new(&source, &relation, &target),
            source,
            relation,
            target,
            source_document: source_document.into(),
            created: Utc::now(),
        }
    }

    /// The id this edge's inverse would carry under `inverse_relation`
    pub fn inverse_id(&self, inverse_relation: &str) -> EdgeId {
        EdgeId::new(&self.target, inverse_relation, &self.source)
    }
}
