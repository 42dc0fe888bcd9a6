//! Graph ordering: check a graph before it is submitted for execution.
//!
//! Rules checked:
//! 1. Node IDs must be unique.
//! 2. Every edge must reference known node IDs (both ends).
//! 3. The directed graph must be acyclic (topological sort must succeed).
//!
//! The editor itself allows cycles while authoring; this check only feeds
//! advisories and the execution endpoint.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::EditorError;
use crate::document::ExecutionRequest;

/// Return the node IDs in topological execution order.
///
/// Ties are broken by the order nodes were given in, so the result is
/// deterministic.
///
/// # Errors
/// - [`EditorError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EditorError::UnknownNodeReference`] if an edge references a missing node.
/// - [`EditorError::CycleDetected`] if the graph is not acyclic.
pub fn execution_order(node_ids: &[&str], edges: &[(&str, &str)]) -> Result<Vec<String>, EditorError> {
    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for &id in node_ids {
        if !seen_ids.insert(id) {
            return Err(EditorError::DuplicateNodeId(id.to_string()));
        }
    }

    // -----------------------------------------------------------------------
    // 2. Validate edge endpoints
    // -----------------------------------------------------------------------
    for &(from, to) in edges {
        if !seen_ids.contains(from) {
            return Err(EditorError::UnknownNodeReference {
                node_id: from.to_string(),
                side: "from",
            });
        }
        if !seen_ids.contains(to) {
            return Err(EditorError::UnknownNodeReference {
                node_id: to.to_string(),
                side: "to",
            });
        }
    }

    // -----------------------------------------------------------------------
    // 3. Topological sort (Kahn's algorithm)
    // -----------------------------------------------------------------------
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = node_ids.iter().map(|id| (*id, 0)).collect();

    for &(from, to) in edges {
        adjacency.entry(from).or_default().push(to);
        *in_degree.entry(to).or_insert(0) += 1;
    }

    let mut queue: VecDeque<&str> = node_ids
        .iter()
        .copied()
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut sorted: Vec<String> = Vec::with_capacity(node_ids.len());

    while let Some(node_id) = queue.pop_front() {
        sorted.push(node_id.to_owned());

        if let Some(neighbours) = adjacency.get(node_id) {
            for &neighbour in neighbours {
                let deg = in_degree.entry(neighbour).or_insert(0);
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    queue.push_back(neighbour);
                }
            }
        }
    }

    // If we didn't visit every node the graph contains a cycle.
    if sorted.len() != node_ids.len() {
        return Err(EditorError::CycleDetected);
    }

    Ok(sorted)
}

/// [`execution_order`] over an execution request body.
pub fn request_order(request: &ExecutionRequest) -> Result<Vec<String>, EditorError> {
    let ids: Vec<&str> = request.nodes.iter().map(|n| n.id.as_str()).collect();
    let edges: Vec<(&str, &str)> = request
        .edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str()))
        .collect();
    execution_order(&ids, &edges)
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_linear_graph_returns_sorted_order() {
        // A → B → C
        let sorted = execution_order(&["a", "b", "c"], &[("a", "b"), ("b", "c")])
            .expect("should be valid");
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }

    #[test]
    fn order_follows_edges_not_insertion() {
        let sorted = execution_order(&["c", "b", "a"], &[("a", "b"), ("b", "c")]).unwrap();
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }

    #[test]
    fn valid_diamond_graph() {
        //   A
        //  / \
        // B   C
        //  \ /
        //   D
        let sorted = execution_order(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        )
        .expect("should be valid");
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        assert!(matches!(
            execution_order(&["a", "a"], &[]),
            Err(EditorError::DuplicateNodeId(id)) if id == "a"
        ));
    }

    #[test]
    fn edge_referencing_missing_node_is_rejected() {
        assert!(matches!(
            execution_order(&["a"], &[("a", "ghost")]),
            Err(EditorError::UnknownNodeReference { node_id, side: "to" }) if node_id == "ghost"
        ));
    }

    #[test]
    fn cycle_is_detected() {
        // A → B → C → A
        assert_eq!(
            execution_order(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]),
            Err(EditorError::CycleDetected)
        );
    }

    #[test]
    fn single_node_no_edges_is_valid() {
        assert_eq!(execution_order(&["solo"], &[]).unwrap(), vec!["solo"]);
    }
}
