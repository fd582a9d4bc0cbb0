//! Ancestor traversal along first is_a targets

use crate::graph::{KnowledgeGraph, IS_A};
use std::collections::{HashMap, HashSet};

/// Maximum number of ancestors returned for one path
pub const MAX_HOPS: usize = 10;

/// Ancestors of `classification_path`, most specific first, excluding the path itself.
///
/// `owners` maps a classification to the node carrying it. A path no node
/// carries falls back to its own lexical prefixes.
pub(crate) fn ancestors(
    graph: &KnowledgeGraph,
    owners: &HashMap<&str, &str>,
    classification_path: &str,
) -> Vec<String> {
    let mut hierarchy = Vec::new();
    let mut visited: HashSet<String> = HashSet::from([classification_path.to_string()]);

    let Some(&start) = owners.get(classification_path) else {
        let segments: Vec<&str> = classification_path.split('/').collect();
        for end in (1..segments.len()).rev().take(MAX_HOPS) {
            let prefix = segments[..end].join("/");
            if visited.insert(prefix.clone()) {
                hierarchy.push(prefix);
            }
        }
        return hierarchy;
    };

    let mut current = start;
    while hierarchy.len() < MAX_HOPS {
        let Some(target) = graph
            .node(current)
            .and_then(|n| n.targets(IS_A).first())
        else {
            break;
        };
        let target_path = graph
            .node(target)
            .map(|n| n.classification_path.as_str())
            .unwrap_or(target.as_str());
        if !visited.insert(target_path.to_string()) {
            break;
        }
        hierarchy.push(target_path.to_string());
        current = target.as_str();
    }
    hierarchy
}
