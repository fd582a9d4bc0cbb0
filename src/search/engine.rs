//! SearchEngine: specificity-ranked lookup over one graph

use super::hierarchy;
use super::index::SearchIndex;
use super::types::{SearchOptions, SearchResult, TreeNode};
use crate::graph::KnowledgeGraph;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A search session over a borrowed graph.
///
/// Ancestor chains are cached for the lifetime of the session.
pub struct SearchEngine<'g> {
    graph: &'g KnowledgeGraph,
    index: SearchIndex,
    /// classification -> first node (in id order) carrying it
    owners: HashMap<&'g str, &'g str>,
    hierarchy_cache: HashMap<String, Vec<String>>,
}

impl<'g> SearchEngine<'g> {
    pub fn new(graph: &'g KnowledgeGraph) -> Self {
        let mut owners = HashMap::new();
        for node in graph.nodes() {
            owners
                .entry(node.classification_path.as_str())
                .or_insert(node.id.as_str());
        }
        Self {
            graph,
            index: SearchIndex::build(graph),
            owners,
            hierarchy_cache: HashMap::new(),
        }
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Find concepts whose classification (or search path) contains `term`.
    ///
    /// For each node the first classification segment that contains the
    /// term, or is contained in it, is the match point; the result is the
    /// classification truncated there. A match only in the search path
    /// counts as matching the last classification segment. Results are
    /// deduplicated by truncated path and ordered by specificity
    /// (descending), then path.
    pub fn search(&mut self, term: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for node in self.graph.nodes() {
            let parts: Vec<&str> = node.classification_path.split('/').collect();

            let (match_index, matched_in_search_path) =
                match parts.iter().position(|p| segment_matches(p, &term)) {
                    Some(i) => (i, false),
                    None if node.id.split('/').any(|p| segment_matches(p, &term)) => {
                        (parts.len() - 1, true)
                    }
                    None => continue,
                };

            let truncated = parts[..=match_index].join("/");
            if !seen.insert(truncated.clone()) {
                continue;
            }
            results.push(SearchResult {
                search_path: node.id.clone(),
                classification_path: truncated,
                full_classification_path: node.classification_path.clone(),
                depth: match_index,
                specificity: match_index + 1,
                matched_term: parts[match_index].to_string(),
                matched_in_search_path,
                hierarchy: None,
            });
        }

        results.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then_with(|| a.classification_path.cmp(&b.classification_path))
        });
        if let Some(limit) = options.limit {
            results.truncate(limit);
        }

        if options.include_hierarchy {
            for result in &mut results {
                result.hierarchy = Some(self.ancestors(&result.classification_path));
            }
        }

        tracing::debug!(term = %term, results = results.len(), "search");
        results
    }

    /// Ancestors of a classification path, most specific first (cached)
    pub fn ancestors(&mut self, classification_path: &str) -> Vec<String> {
        if let Some(cached) = self.hierarchy_cache.get(classification_path) {
            return cached.clone();
        }
        let chain = hierarchy::ancestors(self.graph, &self.owners, classification_path);
        self.hierarchy_cache
            .insert(classification_path.to_string(), chain.clone());
        chain
    }

    /// Number of cached ancestor chains
    pub fn cached_hierarchies(&self) -> usize {
        self.hierarchy_cache.len()
    }

    /// Classification forest built from every prefix of every node's path.
    ///
    /// With `root`, only the subtree at that path (empty if unknown).
    pub fn tree(&self, root: Option<&str>) -> Vec<TreeNode> {
        let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut roots = BTreeSet::new();

        for node in self.graph.nodes() {
            let parts: Vec<&str> = node.classification_path.split('/').collect();
            roots.insert(parts[0].to_string());
            for end in 1..parts.len() {
                children
                    .entry(parts[..end].join("/"))
                    .or_default()
                    .insert(parts[..=end].join("/"));
            }
        }

        match root {
            Some(root) if roots.contains(root) || children.values().any(|c| c.contains(root)) => {
                vec![build_tree(root, &children)]
            }
            Some(_) => Vec::new(),
            None => roots.iter().map(|r| build_tree(r, &children)).collect(),
        }
    }
}

fn segment_matches(segment: &str, term: &str) -> bool {
    let segment = segment.to_lowercase();
    segment.contains(term) || term.contains(segment.as_str())
}

fn build_tree(path: &str, children: &BTreeMap<String, BTreeSet<String>>) -> TreeNode {
    TreeNode {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        children: children
            .get(path)
            .map(|kids| kids.iter().map(|k| build_tree(k, children)).collect())
            .unwrap_or_default(),
    }
}
