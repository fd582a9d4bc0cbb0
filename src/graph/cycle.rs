//! Cycle detection over the is-a subgraph

use super::edge::Edge;
use super::relation::IS_A;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the active DFS path
    Active,
    /// Fully explored; cannot lead back to the active path
    Done,
}

/// Would adding `source is_a target` close a cycle?
///
/// Builds the is-a adjacency from `edges`, adds the proposed edge and runs
/// an iterative white/gray/black DFS from `source`. Each node is explored
/// at most once. On a cycle, returns the path from the first occurrence of
/// the repeated node through the repeat, inclusive (e.g. `[a, b, a]`).
pub fn would_create_cycle<'a>(
    edges: &'a [Edge],
    source: &'a str,
    target: &'a str,
) -> Option<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges.iter().filter(|e| e.relation == IS_A) {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    adjacency.entry(source).or_default().push(target);
    for targets in adjacency.values_mut() {
        targets.sort_unstable();
        targets.dedup();
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    // (node, index of the next neighbor to visit); doubles as the active path
    let mut stack: Vec<(&str, usize)> = vec![(source, 0)];
    marks.insert(source, Mark::Active);

    while let Some(&(node, next)) = stack.last() {
        let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);

        let Some(&neighbor) = neighbors.get(next) else {
            marks.insert(node, Mark::Done);
            stack.pop();
            continue;
        };

        if let Some(top) = stack.last_mut() {
            top.1 += 1;
        }

        match marks.get(neighbor) {
            Some(Mark::Active) => {
                let start = stack
                    .iter()
                    .position(|(n, _)| *n == neighbor)
                    .unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
            Some(Mark::Done) => {}
            None => {
                marks.insert(neighbor, Mark::Active);
                stack.push((neighbor, 0));
            }
        }
    }

    None
}
