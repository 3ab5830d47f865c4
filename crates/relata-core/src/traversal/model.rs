//! Traversal result types.

use crate::entity::Entity;
use crate::relationship::Relationship;
use serde::Serialize;

/// A node discovered during traversal.
#[derive(Debug, Clone, Serialize)]
pub struct TraversalNode {
    pub entity_id: String,
    /// Hydrated entity, `None` when the id dangles (edge to a removed row).
    pub entity: Option<Entity>,
    /// Hop distance from the start along the discovery edge.
    pub depth: usize,
    /// Entity ids from the start to this node, inclusive on both ends.
    pub path: Vec<String>,
}

/// A shortest path between two entities. `length` is the edge count;
/// a zero-length path is the source-equals-target case.
#[derive(Debug, Clone, Serialize)]
pub struct ShortestPath {
    pub path: Vec<String>,
    pub length: usize,
}

/// Outcome of cycle detection.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub has_circular_reference: bool,
    /// The cycle as ids, closed by re-appending the first repeated node
    /// (e.g. `[A, B, C, A]`). Empty when no cycle was found.
    pub cycle: Vec<String>,
    pub cycle_length: usize,
}

impl CycleReport {
    pub fn none() -> Self {
        Self {
            has_circular_reference: false,
            cycle: Vec::new(),
            cycle_length: 0,
        }
    }
}

/// Bounded snapshot of the graph for visualization.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStructure {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}
