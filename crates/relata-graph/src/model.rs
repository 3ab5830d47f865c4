//! Graph-store projection types and result assembly.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Traversal direction relative to the start vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Outbound,
    Inbound,
    Both,
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OUTBOUND" | "OUT" => Some(Direction::Outbound),
            "INBOUND" | "IN" => Some(Direction::Inbound),
            "BOTH" | "ANY" => Some(Direction::Both),
            _ => None,
        }
    }
}

/// A vertex in the graph-store projection.
#[derive(Debug, Clone, Serialize)]
pub struct GraphVertex {
    pub id: String,
    /// Vertex type label.
    pub tag: String,
    pub properties: Value,
}

/// An edge in the graph-store projection. `rank` disambiguates parallel
/// edges of the same type between the same vertex pair.
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub edge_type: String,
    pub source_id: String,
    pub target_id: String,
    pub rank: i64,
    pub properties: Value,
}

impl GraphEdge {
    /// Deduplication key: `(source, type, target, rank)`.
    pub fn key(&self) -> (String, String, String, i64) {
        (
            self.source_id.clone(),
            self.edge_type.clone(),
            self.target_id.clone(),
            self.rank,
        )
    }
}

/// An ordered walk: vertices interleaved with the edges connecting them.
/// `length` is the edge count; a zero-length path is a single vertex.
#[derive(Debug, Clone, Serialize)]
pub struct GraphPath {
    pub vertices: Vec<GraphVertex>,
    pub edges: Vec<GraphEdge>,
    pub length: usize,
}

/// Deduplicated traversal output. Repeated rows that mention the same
/// vertex or edge contribute once; the totals are the map sizes.
#[derive(Debug, Clone, Serialize, Default)]
pub struct TraversalResult {
    pub vertices: Vec<GraphVertex>,
    pub edges: Vec<GraphEdge>,
    pub total_vertices: usize,
    pub total_edges: usize,
}

/// Accumulator that enforces the dedup contract while preserving
/// first-seen order.
#[derive(Default)]
pub struct ResultBuilder {
    vertices: BTreeMap<String, GraphVertex>,
    edges: BTreeMap<(String, String, String, i64), GraphEdge>,
    vertex_order: Vec<String>,
    edge_order: Vec<(String, String, String, i64)>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: GraphVertex) {
        if !self.vertices.contains_key(&vertex.id) {
            self.vertex_order.push(vertex.id.clone());
            self.vertices.insert(vertex.id.clone(), vertex);
        }
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        let key = edge.key();
        if !self.edges.contains_key(&key) {
            self.edge_order.push(key.clone());
            self.edges.insert(key, edge);
        }
    }

    pub fn contains_vertex(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn build(mut self) -> TraversalResult {
        let vertices: Vec<GraphVertex> = self
            .vertex_order
            .iter()
            .filter_map(|id| self.vertices.remove(id))
            .collect();
        let edges: Vec<GraphEdge> = self
            .edge_order
            .iter()
            .filter_map(|key| self.edges.remove(key))
            .collect();
        TraversalResult {
            total_vertices: vertices.len(),
            total_edges: edges.len(),
            vertices,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vertex(id: &str) -> GraphVertex {
        GraphVertex {
            id: id.to_string(),
            tag: "Entity".to_string(),
            properties: json!({}),
        }
    }

    fn edge(source: &str, target: &str, rank: i64) -> GraphEdge {
        GraphEdge {
            edge_type: "HAS_MANY".to_string(),
            source_id: source.to_string(),
            target_id: target.to_string(),
            rank,
            properties: json!({}),
        }
    }

    #[test]
    fn test_vertices_deduplicated() {
        let mut builder = ResultBuilder::new();
        builder.add_vertex(vertex("a"));
        builder.add_vertex(vertex("b"));
        builder.add_vertex(vertex("a"));
        let result = builder.build();
        assert_eq!(result.total_vertices, 2);
        assert_eq!(result.vertices[0].id, "a");
    }

    #[test]
    fn test_edges_keyed_by_rank() {
        let mut builder = ResultBuilder::new();
        builder.add_edge(edge("a", "b", 0));
        builder.add_edge(edge("a", "b", 0));
        builder.add_edge(edge("a", "b", 1));
        let result = builder.build();
        // Same endpoints and type but a different rank is a distinct edge.
        assert_eq!(result.total_edges, 2);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::from_str("outbound"), Some(Direction::Outbound));
        assert_eq!(Direction::from_str("IN"), Some(Direction::Inbound));
        assert_eq!(Direction::from_str("both"), Some(Direction::Both));
        assert_eq!(Direction::from_str("sideways"), None);
    }
}
