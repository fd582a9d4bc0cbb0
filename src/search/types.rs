//! Search options and result structures

/// Options for a search call
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Attach the ancestor chain to every result
    pub include_hierarchy: bool,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include ancestor hierarchies in results
    pub fn with_hierarchy(mut self) -> Self {
        self.include_hierarchy = true;
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Node that produced the hit
    pub search_path: String,
    /// Classification truncated at the matched segment
    pub classification_path: String,
    /// The node's full classification
    pub full_classification_path: String,
    /// Segments above the match
    pub depth: usize,
    /// Segment count of the truncated path
    pub specificity: usize,
    /// Segment the term matched
    pub matched_term: String,
    /// The match came from the search path rather than the classification
    pub matched_in_search_path: bool,
    /// Ancestors of the truncated path, most specific first
    pub hierarchy: Option<Vec<String>>,
}

/// Entry of the inverted index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub search_path: String,
    /// Full classification of the indexed node
    pub classification_path: String,
    pub depth: usize,
    pub specificity: usize,
    /// The indexed segment is an ancestor, not the node itself
    pub partial: bool,
}

/// A classification prefix and everything classified beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: String,
    /// Last segment of `path`
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, itself included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}
