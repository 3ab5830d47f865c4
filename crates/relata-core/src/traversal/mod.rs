//! Graph traversal over the relational adjacency.
//!
//! Every operation here works purely off the active-relationship lookups
//! in `relata-db` — one storage read per frontier expansion, no graph
//! engine involved. Depth and node-count bounds are validated before any
//! storage access so out-of-range calls never touch the database.

pub mod model;

use crate::entity;
use crate::error::{RelataError, RelataResult};
use crate::relationship::{incoming, outgoing, list_relationships, Relationship};
use relata_db::DbPool;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

pub use model::{CycleReport, GraphStructure, ShortestPath, TraversalNode};

/// Inclusive depth bounds for every traversal operation.
pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 1000;

/// Inclusive bounds for `get_graph_structure`.
pub const MIN_NODES: u32 = 1;
pub const MAX_NODES: u32 = 10_000;

fn check_depth(max_depth: usize) -> RelataResult<()> {
    if !(MIN_DEPTH..=MAX_DEPTH).contains(&max_depth) {
        return Err(RelataError::invalid_argument(format!(
            "max_depth must be between {} and {}, got {}",
            MIN_DEPTH, MAX_DEPTH, max_depth
        )));
    }
    Ok(())
}

/// Which adjacency a traversal expands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adjacency {
    Outgoing,
    Incoming,
}

fn neighbors(pool: &DbPool, id: &str, adjacency: Adjacency) -> RelataResult<Vec<String>> {
    let rels = match adjacency {
        Adjacency::Outgoing => outgoing(pool, id)?,
        Adjacency::Incoming => incoming(pool, id)?,
    };
    Ok(rels
        .into_iter()
        .map(|r| match adjacency {
            Adjacency::Outgoing => r.target_id,
            Adjacency::Incoming => r.source_id,
        })
        .collect())
}

fn hydrate(pool: &DbPool, id: &str, depth: usize, path: Vec<String>) -> RelataResult<TraversalNode> {
    Ok(TraversalNode {
        entity_id: id.to_string(),
        entity: entity::get_entity(pool, id)?,
        depth,
        path,
    })
}

/// Level-order traversal over outgoing edges, start included at depth 0.
///
/// A global visited set records each node at most once, so on cyclic
/// graphs the result is first-discovery order rather than a raw walk.
pub fn breadth_first_search(
    pool: &DbPool,
    start_id: &str,
    max_depth: usize,
) -> RelataResult<Vec<TraversalNode>> {
    check_depth(max_depth)?;
    entity::require_entity(pool, start_id)?;

    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize, Vec<String>)> = VecDeque::new();
    let mut result = Vec::new();

    visited.insert(start_id.to_string());
    queue.push_back((start_id.to_string(), 0, vec![start_id.to_string()]));

    while let Some((id, depth, path)) = queue.pop_front() {
        result.push(hydrate(pool, &id, depth, path.clone())?);

        if depth >= max_depth {
            continue;
        }
        for next in neighbors(pool, &id, Adjacency::Outgoing)? {
            if visited.insert(next.clone()) {
                let mut next_path = path.clone();
                next_path.push(next.clone());
                queue.push_back((next, depth + 1, next_path));
            }
        }
    }

    debug!(start = start_id, visited = result.len(), "BFS complete");
    Ok(result)
}

/// Pre-order traversal over outgoing edges with an explicit frame stack,
/// start included at depth 0. Same visited-set semantics as BFS.
pub fn depth_first_search(
    pool: &DbPool,
    start_id: &str,
    max_depth: usize,
) -> RelataResult<Vec<TraversalNode>> {
    check_depth(max_depth)?;
    entity::require_entity(pool, start_id)?;

    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<(String, usize, Vec<String>)> =
        vec![(start_id.to_string(), 0, vec![start_id.to_string()])];
    let mut result = Vec::new();

    while let Some((id, depth, path)) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        result.push(hydrate(pool, &id, depth, path.clone())?);

        if depth >= max_depth {
            continue;
        }
        // Reverse push so the first outgoing edge is explored first.
        for next in neighbors(pool, &id, Adjacency::Outgoing)?.into_iter().rev() {
            if !visited.contains(&next) {
                let mut next_path = path.clone();
                next_path.push(next.clone());
                stack.push((next, depth + 1, next_path));
            }
        }
    }

    debug!(start = start_id, visited = result.len(), "DFS complete");
    Ok(result)
}

/// Entities reachable by walking incoming edges from `id`. The starting
/// entity itself is excluded; its direct parents are at depth 1.
pub fn find_ancestors(
    pool: &DbPool,
    id: &str,
    max_depth: usize,
) -> RelataResult<Vec<TraversalNode>> {
    directional_search(pool, id, max_depth, Adjacency::Incoming)
}

/// Entities reachable by walking outgoing edges from `id`, excluding `id`.
pub fn find_descendants(
    pool: &DbPool,
    id: &str,
    max_depth: usize,
) -> RelataResult<Vec<TraversalNode>> {
    directional_search(pool, id, max_depth, Adjacency::Outgoing)
}

fn directional_search(
    pool: &DbPool,
    start_id: &str,
    max_depth: usize,
    adjacency: Adjacency,
) -> RelataResult<Vec<TraversalNode>> {
    check_depth(max_depth)?;
    entity::require_entity(pool, start_id)?;

    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize, Vec<String>)> = VecDeque::new();
    let mut result = Vec::new();

    // Start occupies depth 0 internally but is not reported.
    visited.insert(start_id.to_string());
    queue.push_back((start_id.to_string(), 0, vec![start_id.to_string()]));

    while let Some((id, depth, path)) = queue.pop_front() {
        if depth > 0 {
            result.push(hydrate(pool, &id, depth, path.clone())?);
        }
        if depth >= max_depth {
            continue;
        }
        for next in neighbors(pool, &id, adjacency)? {
            if visited.insert(next.clone()) {
                let mut next_path = path.clone();
                next_path.push(next.clone());
                queue.push_back((next, depth + 1, next_path));
            }
        }
    }

    Ok(result)
}

/// Minimum-hop path from source to target over outgoing edges.
///
/// Returns `None` when the target is unreachable within `max_depth`;
/// `source == target` short-circuits to a zero-length path.
pub fn find_shortest_path(
    pool: &DbPool,
    source_id: &str,
    target_id: &str,
    max_depth: usize,
) -> RelataResult<Option<ShortestPath>> {
    check_depth(max_depth)?;
    entity::require_entity(pool, source_id)?;
    entity::require_entity(pool, target_id)?;

    if source_id == target_id {
        return Ok(Some(ShortestPath {
            path: vec![source_id.to_string()],
            length: 0,
        }));
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize, Vec<String>)> = VecDeque::new();

    visited.insert(source_id.to_string());
    queue.push_back((source_id.to_string(), 0, vec![source_id.to_string()]));

    while let Some((id, depth, path)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for next in neighbors(pool, &id, Adjacency::Outgoing)? {
            if next == target_id {
                let mut full = path.clone();
                full.push(next);
                let length = full.len() - 1;
                return Ok(Some(ShortestPath { path: full, length }));
            }
            if visited.insert(next.clone()) {
                let mut next_path = path.clone();
                next_path.push(next.clone());
                queue.push_back((next, depth + 1, next_path));
            }
        }
    }

    Ok(None)
}

enum DfsAction {
    Enter(String, usize, Vec<String>),
    Leave(String),
}

/// Detect a directed cycle reachable from `start_id` within `max_depth`.
///
/// Iterative DFS with an explicit on-path set mutated on enter/leave: a
/// back-edge into the active path is a cycle. The reported cycle is the
/// path suffix from the first repeated node, closed by re-appending it.
pub fn detect_circular_references(
    pool: &DbPool,
    start_id: &str,
    max_depth: usize,
) -> RelataResult<CycleReport> {
    check_depth(max_depth)?;
    entity::require_entity(pool, start_id)?;

    let mut visited: HashSet<String> = HashSet::new();
    let mut on_path: HashSet<String> = HashSet::new();
    let mut stack = vec![DfsAction::Enter(
        start_id.to_string(),
        0,
        vec![start_id.to_string()],
    )];

    while let Some(action) = stack.pop() {
        match action {
            DfsAction::Enter(id, depth, path) => {
                if visited.contains(&id) {
                    continue;
                }
                visited.insert(id.clone());
                on_path.insert(id.clone());
                stack.push(DfsAction::Leave(id.clone()));

                if depth >= max_depth {
                    continue;
                }
                for next in neighbors(pool, &id, Adjacency::Outgoing)? {
                    if on_path.contains(&next) {
                        let pos = path
                            .iter()
                            .position(|p| p == &next)
                            .unwrap_or(0);
                        let mut cycle = path[pos..].to_vec();
                        cycle.push(next);
                        let cycle_length = cycle.len();
                        debug!(start = start_id, cycle_length, "Cycle detected");
                        return Ok(CycleReport {
                            has_circular_reference: true,
                            cycle,
                            cycle_length,
                        });
                    }
                    if !visited.contains(&next) {
                        let mut next_path = path.clone();
                        next_path.push(next.clone());
                        stack.push(DfsAction::Enter(next, depth + 1, next_path));
                    }
                }
            }
            DfsAction::Leave(id) => {
                on_path.remove(&id);
            }
        }
    }

    Ok(CycleReport::none())
}

/// Bounded snapshot of up to `max_nodes` entities plus every active
/// relationship, for visualization.
pub fn get_graph_structure(pool: &DbPool, max_nodes: u32) -> RelataResult<GraphStructure> {
    if !(MIN_NODES..=MAX_NODES).contains(&max_nodes) {
        return Err(RelataError::invalid_argument(format!(
            "max_nodes must be between {} and {}, got {}",
            MIN_NODES, MAX_NODES, max_nodes
        )));
    }

    let entities = entity::list_entities(pool, max_nodes)?;
    let relationships: Vec<Relationship> = list_relationships(pool)?;
    Ok(GraphStructure {
        entities,
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::upsert_entity;
    use crate::relationship::{
        create_relationship, Cardinality, CreateRelationship, RelationshipType,
    };

    fn link(pool: &DbPool, source: &str, target: &str) {
        create_relationship(
            pool,
            &CreateRelationship {
                source_id: source.to_string(),
                target_id: target.to_string(),
                relationship_type: RelationshipType::HasMany,
                cardinality: Cardinality::OneToMany,
                is_bidirectional: false,
                rules: None,
            },
        )
        .unwrap();
    }

    /// A -> B -> C chain plus D -> B side edge.
    fn chain_pool() -> DbPool {
        let pool = relata_db::init_pool_in_memory().unwrap();
        for id in ["a", "b", "c", "d"] {
            upsert_entity(&pool, id, "object_type", id, &serde_json::json!({})).unwrap();
        }
        link(&pool, "a", "b");
        link(&pool, "b", "c");
        link(&pool, "d", "b");
        pool
    }

    fn ids(nodes: &[TraversalNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.entity_id.as_str()).collect()
    }

    #[test]
    fn test_depth_bounds_fail_before_storage() {
        // A pool with no schema at all: bound violations must error out
        // before any query would hit the missing tables.
        let pool = DbPool::in_memory().unwrap();
        for bad in [0, 1001] {
            let err = breadth_first_search(&pool, "a", bad).unwrap_err();
            assert!(matches!(err, RelataError::InvalidArgument(_)));
            let err = depth_first_search(&pool, "a", bad).unwrap_err();
            assert!(matches!(err, RelataError::InvalidArgument(_)));
            let err = find_ancestors(&pool, "a", bad).unwrap_err();
            assert!(matches!(err, RelataError::InvalidArgument(_)));
            let err = find_shortest_path(&pool, "a", "b", bad).unwrap_err();
            assert!(matches!(err, RelataError::InvalidArgument(_)));
            let err = detect_circular_references(&pool, "a", bad).unwrap_err();
            assert!(matches!(err, RelataError::InvalidArgument(_)));
        }
        for bad in [0, 10_001] {
            let err = get_graph_structure(&pool, bad).unwrap_err();
            assert!(matches!(err, RelataError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_bfs_level_order_with_paths() {
        let pool = chain_pool();
        let nodes = breadth_first_search(&pool, "a", 10).unwrap();
        assert_eq!(ids(&nodes), vec!["a", "b", "c"]);
        assert_eq!(nodes[0].depth, 0);
        assert_eq!(nodes[2].depth, 2);
        assert_eq!(nodes[2].path, vec!["a", "b", "c"]);
        assert!(nodes[1].entity.is_some());
    }

    #[test]
    fn test_bfs_respects_max_depth() {
        let pool = chain_pool();
        let nodes = breadth_first_search(&pool, "a", 1).unwrap();
        assert_eq!(ids(&nodes), vec!["a", "b"]);
    }

    #[test]
    fn test_bfs_dfs_same_node_set() {
        let pool = chain_pool();
        let bfs: HashSet<String> = breadth_first_search(&pool, "a", 10)
            .unwrap()
            .into_iter()
            .map(|n| n.entity_id)
            .collect();
        let dfs: HashSet<String> = depth_first_search(&pool, "a", 10)
            .unwrap()
            .into_iter()
            .map(|n| n.entity_id)
            .collect();
        assert_eq!(bfs, dfs);
    }

    #[test]
    fn test_dfs_preorder() {
        let pool = relata_db::init_pool_in_memory().unwrap();
        for id in ["r", "x", "y", "z"] {
            upsert_entity(&pool, id, "object_type", id, &serde_json::json!({})).unwrap();
        }
        link(&pool, "r", "x");
        link(&pool, "r", "y");
        link(&pool, "x", "z");

        let nodes = depth_first_search(&pool, "r", 10).unwrap();
        // First branch is explored to the bottom before the second.
        assert_eq!(ids(&nodes), vec!["r", "x", "z", "y"]);
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let pool = chain_pool();

        let ancestors = find_ancestors(&pool, "c", 10).unwrap();
        let mut anc_ids: Vec<&str> = ids(&ancestors);
        anc_ids.sort();
        assert_eq!(anc_ids, vec!["a", "b", "d"]);
        assert!(!anc_ids.contains(&"c"));

        let descendants = find_descendants(&pool, "a", 10).unwrap();
        assert_eq!(ids(&descendants), vec!["b", "c"]);
        assert_eq!(descendants[0].depth, 1);

        // On a DAG, ancestors and descendants of the same node are disjoint.
        let anc: HashSet<String> = find_ancestors(&pool, "b", 10)
            .unwrap()
            .into_iter()
            .map(|n| n.entity_id)
            .collect();
        let desc: HashSet<String> = find_descendants(&pool, "b", 10)
            .unwrap()
            .into_iter()
            .map(|n| n.entity_id)
            .collect();
        assert!(anc.is_disjoint(&desc));
    }

    #[test]
    fn test_shortest_path_chain() {
        let pool = chain_pool();
        let path = find_shortest_path(&pool, "a", "c", 10).unwrap().unwrap();
        assert_eq!(path.path, vec!["a", "b", "c"]);
        assert_eq!(path.length, 2);
    }

    #[test]
    fn test_shortest_path_same_node_is_zero_length() {
        let pool = chain_pool();
        let path = find_shortest_path(&pool, "a", "a", 10).unwrap().unwrap();
        assert_eq!(path.length, 0);
        assert_eq!(path.path, vec!["a"]);
    }

    #[test]
    fn test_shortest_path_unreachable_is_none() {
        let pool = chain_pool();
        // Nothing points at "a" except nothing; c has no outgoing edges.
        assert!(find_shortest_path(&pool, "c", "a", 10).unwrap().is_none());
        // Depth bound cuts the path off.
        assert!(find_shortest_path(&pool, "a", "c", 1).unwrap().is_none());
    }

    #[test]
    fn test_shortest_path_prefers_fewest_hops() {
        let pool = relata_db::init_pool_in_memory().unwrap();
        for id in ["a", "b", "c", "z"] {
            upsert_entity(&pool, id, "object_type", id, &serde_json::json!({})).unwrap();
        }
        // Long way round: a -> b -> c -> z. Short way: a -> z.
        link(&pool, "a", "b");
        link(&pool, "b", "c");
        link(&pool, "c", "z");
        link(&pool, "a", "z");

        let path = find_shortest_path(&pool, "a", "z", 10).unwrap().unwrap();
        assert_eq!(path.length, 1);
    }

    #[test]
    fn test_no_cycle_on_dag() {
        let pool = chain_pool();
        let report = detect_circular_references(&pool, "a", 10).unwrap();
        assert!(!report.has_circular_reference);
        assert!(report.cycle.is_empty());
    }

    #[test]
    fn test_cycle_detected_and_closed() {
        let pool = chain_pool();
        // Close the loop: c -> a.
        link(&pool, "c", "a");

        let report = detect_circular_references(&pool, "a", 10).unwrap();
        assert!(report.has_circular_reference);
        assert_eq!(report.cycle, vec!["a", "b", "c", "a"]);
        assert_eq!(report.cycle_length, 4);
    }

    #[test]
    fn test_cycle_beyond_depth_not_reported() {
        let pool = chain_pool();
        link(&pool, "c", "a");
        // The back-edge sits at depth 2; a depth-1 walk never sees it.
        let report = detect_circular_references(&pool, "a", 1).unwrap();
        assert!(!report.has_circular_reference);
    }

    #[test]
    fn test_graph_structure_snapshot() {
        let pool = chain_pool();
        let structure = get_graph_structure(&pool, 100).unwrap();
        assert_eq!(structure.entities.len(), 4);
        assert_eq!(structure.relationships.len(), 3);

        let bounded = get_graph_structure(&pool, 2).unwrap();
        assert_eq!(bounded.entities.len(), 2);
    }

    #[test]
    fn test_unknown_start_is_not_found() {
        let pool = chain_pool();
        let err = breadth_first_search(&pool, "ghost", 10).unwrap_err();
        assert!(matches!(err, RelataError::EntityNotFound(_)));
    }
}
