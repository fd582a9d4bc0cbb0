//! Inverted index over classification-path segments

use super::types::IndexEntry;
use crate::graph::KnowledgeGraph;
use std::collections::BTreeMap;

/// Lowercased segment -> every node whose classification passes through it
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    terms: BTreeMap<String, Vec<IndexEntry>>,
}

impl SearchIndex {
    /// Index each prefix of each node's classification under the prefix's last segment
    pub fn build(graph: &KnowledgeGraph) -> Self {
        let mut terms: BTreeMap<String, Vec<IndexEntry>> = BTreeMap::new();

        for node in graph.nodes() {
            let parts: Vec<&str> = node.classification_path.split('/').collect();
            for (i, part) in parts.iter().enumerate() {
                terms
                    .entry(part.to_lowercase())
                    .or_default()
                    .push(IndexEntry {
                        search_path: node.id.clone(),
                        classification_path: node.classification_path.clone(),
                        depth: i,
                        specificity: i + 1,
                        partial: i + 1 < parts.len(),
                    });
            }
        }

        for entries in terms.values_mut() {
            entries.sort_by(|a, b| b.specificity.cmp(&a.specificity));
        }

        tracing::debug!(terms = terms.len(), "built search index");
        Self { terms }
    }

    /// Entries for a segment, most specific first
    pub fn get(&self, term: &str) -> &[IndexEntry] {
        self.terms
            .get(&term.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All terms in order, each with its entries
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[IndexEntry])> {
        self.terms.iter().map(|(t, e)| (t.as_str(), e.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.ensure_node("c", "a/b/c", "doc.md");
        graph.ensure_node("bank", "Institution/bank", "doc.md");
        graph
    }

    #[test]
    fn test_every_prefix_is_indexed() {
        let index = SearchIndex::build(&create_test_graph());

        let a = &index.get("a")[0];
        assert_eq!((a.depth, a.specificity, a.partial), (0, 1, true));
        let b = &index.get("b")[0];
        assert_eq!((b.depth, b.specificity, b.partial), (1, 2, true));
        let c = &index.get("c")[0];
        assert_eq!((c.depth, c.specificity, c.partial), (2, 3, false));
        assert_eq!(c.classification_path, "a/b/c");
    }

    #[test]
    fn test_terms_are_lowercased() {
        let index = SearchIndex::build(&create_test_graph());
        assert_eq!(index.get("institution").len(), 1);
        assert_eq!(index.get("INSTITUTION").len(), 1);
        assert!(index.terms().all(|(t, _)| t == t.to_lowercase()));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_entries_sorted_by_specificity() {
        let mut graph = KnowledgeGraph::new();
        graph.ensure_node("x", "x", "doc.md");
        graph.ensure_node("y", "y/x", "doc.md");
        let index = SearchIndex::build(&graph);

        let specificities: Vec<usize> = index.get("x").iter().map(|e| e.specificity).collect();
        assert_eq!(specificities, [2, 1]);
    }
}
