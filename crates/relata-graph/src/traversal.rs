//! Graph-native traversal: operations expressed as declarative query text
//! executed through [`QueryExecutor`], with results parsed back into
//! vertex/edge/path objects.
//!
//! Edge-type labels are sanitized (alphanumeric and underscore only)
//! before being spliced into query text, and inline string values go
//! through [`escape_string`].

use crate::executor::{escape_string, QueryExecutor, QueryResult};
use crate::model::{Direction, GraphEdge, GraphPath, GraphVertex, ResultBuilder, TraversalResult};
use async_trait::async_trait;
use relata_core::{RelataError, RelataResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Variable-length expansions beyond this depth are rejected to prevent
/// runaway queries.
pub const MAX_TRAVERSE_DEPTH: usize = 10;

/// Hard cap on the number of paths `find_all_paths` enumerates.
pub const ALL_PATHS_CAP: usize = 100;

const DEFAULT_LIMIT: usize = 100;

/// Graph-native traversal operations over an executor.
#[derive(Clone)]
pub struct GraphTraversal {
    executor: Arc<dyn QueryExecutor>,
}

/// Render the relationship clause for a direction. Shared by every
/// operation that takes a direction parameter.
fn direction_clause(direction: Direction, rel_spec: &str) -> String {
    match direction {
        Direction::Outbound => format!("-[{}]->", rel_spec),
        Direction::Inbound => format!("<-[{}]-", rel_spec),
        Direction::Both => format!("-[{}]-", rel_spec),
    }
}

/// Render `:T1|T2` for an edge-type filter, empty for "any type".
fn edge_type_spec(edge_types: Option<&[String]>) -> String {
    match edge_types {
        Some(types) if !types.is_empty() => {
            let safe: Vec<String> = types
                .iter()
                .map(|t| {
                    t.chars()
                        .filter(|c| c.is_alphanumeric() || *c == '_')
                        .collect()
                })
                .collect();
            format!(":{}", safe.join("|"))
        }
        _ => String::new(),
    }
}

fn id_list(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("'{}'", escape_string(id)))
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn check_traverse_depth(min_depth: usize, max_depth: usize) -> RelataResult<()> {
    if min_depth == 0 || max_depth < min_depth || max_depth > MAX_TRAVERSE_DEPTH {
        return Err(RelataError::invalid_argument(format!(
            "traversal depth must satisfy 1 <= min <= max <= {}, got {}..{}",
            MAX_TRAVERSE_DEPTH, min_depth, max_depth
        )));
    }
    Ok(())
}

fn string_cell(row: &[Value], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn parse_vertices(result: &QueryResult, builder: &mut ResultBuilder) {
    let id_idx = result.column_index("id");
    let tag_idx = result.column_index("tag");
    let props_idx = result.column_index("props");

    for row in &result.rows {
        let Some(id) = string_cell(row, id_idx) else {
            continue;
        };
        builder.add_vertex(GraphVertex {
            id,
            tag: string_cell(row, tag_idx).unwrap_or_else(|| "Entity".to_string()),
            properties: props_idx
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or(Value::Null),
        });
    }
}

fn parse_edges(result: &QueryResult, builder: &mut ResultBuilder) {
    let source_idx = result.column_index("source_id");
    let target_idx = result.column_index("target_id");
    let type_idx = result.column_index("edge_type");
    let rank_idx = result.column_index("rank");
    let props_idx = result.column_index("props");

    for row in &result.rows {
        let (Some(source_id), Some(target_id), Some(edge_type)) = (
            string_cell(row, source_idx),
            string_cell(row, target_idx),
            string_cell(row, type_idx),
        ) else {
            continue;
        };
        builder.add_edge(GraphEdge {
            edge_type,
            source_id,
            target_id,
            rank: rank_idx
                .and_then(|i| row.get(i))
                .and_then(Value::as_i64)
                .unwrap_or(0),
            properties: props_idx
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or(Value::Null),
        });
    }
}

const PATH_PROJECTION: &str = "[n IN nodes(p) | n.id] AS vertex_ids, \
     [n IN nodes(p) | n.tag] AS vertex_tags, \
     [n IN nodes(p) | properties(n)] AS vertex_props, \
     [r IN relationships(p) | type(r)] AS edge_types, \
     [r IN relationships(p) | startNode(r).id] AS edge_sources, \
     [r IN relationships(p) | endNode(r).id] AS edge_targets, \
     [r IN relationships(p) | coalesce(r.rank, 0)] AS edge_ranks, \
     [r IN relationships(p) | properties(r)] AS edge_props";

fn array_cell<'a>(result: &QueryResult, row: &'a [Value], name: &str) -> Vec<Value> {
    result
        .column_index(name)
        .and_then(|i| row.get(i))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

fn parse_path_row(result: &QueryResult, row: &[Value]) -> Option<GraphPath> {
    let ids = array_cell(result, row, "vertex_ids");
    if ids.is_empty() {
        return None;
    }
    let tags = array_cell(result, row, "vertex_tags");
    let vprops = array_cell(result, row, "vertex_props");

    let vertices: Vec<GraphVertex> = ids
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            Some(GraphVertex {
                id: id.as_str()?.to_string(),
                tag: tags
                    .get(i)
                    .and_then(|t| t.as_str())
                    .unwrap_or("Entity")
                    .to_string(),
                properties: vprops.get(i).cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    let etypes = array_cell(result, row, "edge_types");
    let esources = array_cell(result, row, "edge_sources");
    let etargets = array_cell(result, row, "edge_targets");
    let eranks = array_cell(result, row, "edge_ranks");
    let eprops = array_cell(result, row, "edge_props");

    let edges: Vec<GraphEdge> = etypes
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            Some(GraphEdge {
                edge_type: t.as_str()?.to_string(),
                source_id: esources.get(i)?.as_str()?.to_string(),
                target_id: etargets.get(i)?.as_str()?.to_string(),
                rank: eranks.get(i).and_then(Value::as_i64).unwrap_or(0),
                properties: eprops.get(i).cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    Some(GraphPath {
        length: edges.len(),
        vertices,
        edges,
    })
}

impl GraphTraversal {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    async fn run(&self, query: &str, params: HashMap<String, Value>) -> RelataResult<QueryResult> {
        let result = self.executor.execute(query, Some(&params)).await;
        if !result.success {
            return Err(RelataError::Unavailable(
                result
                    .error_message
                    .unwrap_or_else(|| "graph query failed".to_string()),
            ));
        }
        Ok(result)
    }

    /// Multi-hop walk from `start`, deduplicated into vertex and edge maps.
    pub async fn traverse(
        &self,
        start: &str,
        edge_types: Option<&[String]>,
        direction: Direction,
        min_depth: usize,
        max_depth: usize,
        limit: Option<usize>,
    ) -> RelataResult<TraversalResult> {
        check_traverse_depth(min_depth, max_depth)?;
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        let spec = format!(
            "{}*{}..{}",
            edge_type_spec(edge_types),
            min_depth,
            max_depth
        );
        let clause = direction_clause(direction, &spec);
        let params: HashMap<String, Value> =
            [("start".to_string(), Value::String(start.to_string()))].into();

        let vertex_query = format!(
            "MATCH (start:Entity {{id: $start}}) \
             MATCH (start){clause}(v:Entity) \
             WITH DISTINCT v \
             RETURN v.id AS id, v.tag AS tag, properties(v) AS props \
             LIMIT {limit}"
        );
        let edge_query = format!(
            "MATCH (start:Entity {{id: $start}}) \
             MATCH p = (start){clause}(v:Entity) \
             UNWIND relationships(p) AS r \
             WITH DISTINCT r \
             RETURN startNode(r).id AS source_id, endNode(r).id AS target_id, \
                    type(r) AS edge_type, coalesce(r.rank, 0) AS rank, \
                    properties(r) AS props \
             LIMIT {edge_limit}",
            edge_limit = limit * 2
        );

        let mut builder = ResultBuilder::new();
        parse_vertices(&self.run(&vertex_query, params.clone()).await?, &mut builder);
        parse_edges(&self.run(&edge_query, params).await?, &mut builder);

        let result = builder.build();
        debug!(
            start,
            vertices = result.total_vertices,
            edges = result.total_edges,
            "Traverse complete"
        );
        Ok(result)
    }

    /// 1-hop special case of [`traverse`](Self::traverse).
    pub async fn find_neighbors(
        &self,
        vertex: &str,
        edge_types: Option<&[String]>,
        direction: Direction,
        limit: usize,
    ) -> RelataResult<TraversalResult> {
        self.traverse(vertex, edge_types, direction, 1, 1, Some(limit))
            .await
    }

    /// Minimum-hop path via the store's shortest-path primitive. `None`
    /// (not an error) when no path exists within `max_depth`.
    pub async fn find_shortest_path(
        &self,
        source: &str,
        target: &str,
        edge_types: Option<&[String]>,
        direction: Direction,
        max_depth: usize,
    ) -> RelataResult<Option<GraphPath>> {
        check_traverse_depth(1, max_depth)?;

        if source == target {
            return self.single_vertex_path(source).await;
        }

        let spec = format!("{}*..{}", edge_type_spec(edge_types), max_depth);
        let clause = direction_clause(direction, &spec);
        let query = format!(
            "MATCH (a:Entity {{id: $source}}), (b:Entity {{id: $target}}) \
             MATCH p = shortestPath((a){clause}(b)) \
             RETURN {PATH_PROJECTION} \
             LIMIT 1"
        );
        let params: HashMap<String, Value> = [
            ("source".to_string(), Value::String(source.to_string())),
            ("target".to_string(), Value::String(target.to_string())),
        ]
        .into();

        let result = self.run(&query, params).await?;
        Ok(result
            .rows
            .first()
            .and_then(|row| parse_path_row(&result, row)))
    }

    async fn single_vertex_path(&self, id: &str) -> RelataResult<Option<GraphPath>> {
        let params: HashMap<String, Value> =
            [("id".to_string(), Value::String(id.to_string()))].into();
        let result = self
            .run(
                "MATCH (v:Entity {id: $id}) \
                 RETURN v.id AS id, v.tag AS tag, properties(v) AS props \
                 LIMIT 1",
                params,
            )
            .await?;

        let mut builder = ResultBuilder::new();
        parse_vertices(&result, &mut builder);
        let parsed = builder.build();
        Ok(parsed.vertices.into_iter().next().map(|v| GraphPath {
            vertices: vec![v],
            edges: Vec::new(),
            length: 0,
        }))
    }

    /// Enumerate distinct outbound paths between two vertices, capped at
    /// [`ALL_PATHS_CAP`] to protect against combinatorial blow-up.
    pub async fn find_all_paths(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
        edge_types: Option<&[String]>,
    ) -> RelataResult<Vec<GraphPath>> {
        check_traverse_depth(1, max_depth)?;

        let spec = format!("{}*1..{}", edge_type_spec(edge_types), max_depth);
        let query = format!(
            "MATCH p = (a:Entity {{id: $source}})-[{spec}]->(b:Entity {{id: $target}}) \
             RETURN {PATH_PROJECTION} \
             LIMIT {ALL_PATHS_CAP}"
        );
        let params: HashMap<String, Value> = [
            ("source".to_string(), Value::String(source.to_string())),
            ("target".to_string(), Value::String(target.to_string())),
        ]
        .into();

        let result = self.run(&query, params).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| parse_path_row(&result, row))
            .collect())
    }

    /// Union of the neighborhoods around a seed set, seeds included.
    pub async fn get_subgraph(
        &self,
        vertex_ids: &[String],
        depth: usize,
        edge_types: Option<&[String]>,
    ) -> RelataResult<TraversalResult> {
        check_traverse_depth(1, depth)?;
        if vertex_ids.is_empty() {
            return Ok(TraversalResult::default());
        }

        let seeds = id_list(vertex_ids);
        let spec = format!("{}*1..{}", edge_type_spec(edge_types), depth);

        let seed_query = format!(
            "MATCH (s:Entity) WHERE s.id IN {seeds} \
             RETURN s.id AS id, s.tag AS tag, properties(s) AS props"
        );
        let vertex_query = format!(
            "MATCH (s:Entity) WHERE s.id IN {seeds} \
             MATCH (s)-[{spec}]-(v:Entity) \
             WITH DISTINCT v \
             RETURN v.id AS id, v.tag AS tag, properties(v) AS props \
             LIMIT {DEFAULT_LIMIT}"
        );
        let edge_query = format!(
            "MATCH (s:Entity) WHERE s.id IN {seeds} \
             MATCH p = (s)-[{spec}]-(v:Entity) \
             UNWIND relationships(p) AS r \
             WITH DISTINCT r \
             RETURN startNode(r).id AS source_id, endNode(r).id AS target_id, \
                    type(r) AS edge_type, coalesce(r.rank, 0) AS rank, \
                    properties(r) AS props \
             LIMIT {edge_limit}",
            edge_limit = DEFAULT_LIMIT * 2
        );

        let mut builder = ResultBuilder::new();
        parse_vertices(&self.run(&seed_query, HashMap::new()).await?, &mut builder);
        parse_vertices(&self.run(&vertex_query, HashMap::new()).await?, &mut builder);
        parse_edges(&self.run(&edge_query, HashMap::new()).await?, &mut builder);
        Ok(builder.build())
    }

    /// Vertices reachable by walking edges backwards from `vertex`.
    pub async fn find_ancestors(
        &self,
        vertex: &str,
        max_depth: usize,
    ) -> RelataResult<TraversalResult> {
        self.traverse(vertex, None, Direction::Inbound, 1, max_depth, None)
            .await
    }

    /// Vertices reachable by walking edges forwards from `vertex`.
    pub async fn find_descendants(
        &self,
        vertex: &str,
        max_depth: usize,
    ) -> RelataResult<TraversalResult> {
        self.traverse(vertex, None, Direction::Outbound, 1, max_depth, None)
            .await
    }
}

/// Traversal surface consumed by the analytics engine. Implemented by
/// [`GraphTraversal`] for production and by in-memory fixtures in tests.
#[async_trait]
pub trait TraversalOps: Send + Sync {
    /// A bounded, deterministic sample of vertex ids.
    async fn sample_vertex_ids(&self, limit: usize) -> RelataResult<Vec<String>>;

    async fn neighbors(
        &self,
        vertex: &str,
        direction: Direction,
        limit: usize,
    ) -> RelataResult<TraversalResult>;

    async fn shortest_path(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
    ) -> RelataResult<Option<GraphPath>>;

    /// Whether two vertices are connected, in either direction, within
    /// `max_depth` hops.
    async fn is_connected(&self, a: &str, b: &str, max_depth: usize) -> RelataResult<bool>;

    /// Global `(vertex, edge)` totals.
    async fn counts(&self) -> RelataResult<(u64, u64)>;
}

#[async_trait]
impl TraversalOps for GraphTraversal {
    async fn sample_vertex_ids(&self, limit: usize) -> RelataResult<Vec<String>> {
        let query = format!(
            "MATCH (v:Entity) RETURN v.id AS id ORDER BY v.id LIMIT {limit}"
        );
        let result = self.run(&query, HashMap::new()).await?;
        Ok(result
            .column_values("id")
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn neighbors(
        &self,
        vertex: &str,
        direction: Direction,
        limit: usize,
    ) -> RelataResult<TraversalResult> {
        self.find_neighbors(vertex, None, direction, limit).await
    }

    async fn shortest_path(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
    ) -> RelataResult<Option<GraphPath>> {
        self.find_shortest_path(source, target, None, Direction::Outbound, max_depth)
            .await
    }

    async fn is_connected(&self, a: &str, b: &str, max_depth: usize) -> RelataResult<bool> {
        let path = self
            .find_shortest_path(a, b, None, Direction::Both, max_depth)
            .await?;
        Ok(path.is_some())
    }

    async fn counts(&self) -> RelataResult<(u64, u64)> {
        let vertices = self
            .run(
                "MATCH (v:Entity) RETURN count(v) AS total",
                HashMap::new(),
            )
            .await?;
        let edges = self
            .run(
                "MATCH (:Entity)-[r]->(:Entity) RETURN count(r) AS total",
                HashMap::new(),
            )
            .await?;
        let count_of = |result: &QueryResult| {
            result
                .column_values("total")
                .next()
                .and_then(Value::as_u64)
                .unwrap_or(0)
        };
        Ok((count_of(&vertices), count_of(&edges)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::executor::QueryExecutor;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted executor: pops pre-baked results in order and records the
    /// substituted query text for assertions.
    pub(crate) struct ScriptedExecutor {
        responses: Mutex<VecDeque<QueryResult>>,
        pub queries: Mutex<Vec<String>>,
        pub connected: bool,
    }

    impl ScriptedExecutor {
        pub fn new(responses: Vec<QueryResult>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                queries: Mutex::new(Vec::new()),
                connected: true,
            }
        }

        pub fn recorded(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for ScriptedExecutor {
        async fn execute(
            &self,
            query: &str,
            params: Option<&HashMap<String, Value>>,
        ) -> QueryResult {
            let text = match params {
                Some(p) => crate::executor::substitute_params(query, p),
                None => query.to_string(),
            };
            self.queries.lock().unwrap().push(text);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| QueryResult::failed("no scripted response", 0))
        }

        async fn check_connectivity(&self) -> bool {
            self.connected
        }
    }

    fn vertex_rows(ids: &[&str]) -> QueryResult {
        QueryResult::ok(
            vec!["id".into(), "tag".into(), "props".into()],
            ids.iter()
                .map(|id| vec![json!(id), json!("Entity"), json!({"id": id})])
                .collect(),
            3,
        )
    }

    fn edge_rows(edges: &[(&str, &str)]) -> QueryResult {
        QueryResult::ok(
            vec![
                "source_id".into(),
                "target_id".into(),
                "edge_type".into(),
                "rank".into(),
                "props".into(),
            ],
            edges
                .iter()
                .map(|(s, t)| vec![json!(s), json!(t), json!("HAS_MANY"), json!(0), json!({})])
                .collect(),
            3,
        )
    }

    #[tokio::test]
    async fn test_traverse_outbound_clause_and_dedup() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            vertex_rows(&["b", "c", "b"]),
            edge_rows(&[("a", "b"), ("b", "c"), ("a", "b")]),
        ]));
        let traversal = GraphTraversal::new(executor.clone());

        let result = traversal
            .traverse(
                "a",
                Some(&["HAS_MANY".to_string()]),
                Direction::Outbound,
                1,
                3,
                None,
            )
            .await
            .unwrap();

        assert_eq!(result.total_vertices, 2);
        assert_eq!(result.total_edges, 2);

        let queries = executor.recorded();
        assert!(queries[0].contains("-[:HAS_MANY*1..3]->"));
        assert!(queries[0].contains("{id: 'a'}"));
    }

    #[tokio::test]
    async fn test_neighbors_inbound_clause() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            vertex_rows(&["p"]),
            edge_rows(&[("p", "x")]),
        ]));
        let traversal = GraphTraversal::new(executor.clone());

        traversal
            .find_neighbors("x", None, Direction::Inbound, 50)
            .await
            .unwrap();

        let queries = executor.recorded();
        assert!(queries[0].contains("<-[*1..1]-"));
        assert!(queries[0].contains("LIMIT 50"));
    }

    #[tokio::test]
    async fn test_edge_type_sanitized() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            vertex_rows(&[]),
            edge_rows(&[]),
        ]));
        let traversal = GraphTraversal::new(executor.clone());

        traversal
            .traverse(
                "a",
                Some(&["HAS_MANY]-(x) DETACH DELETE x //".to_string()]),
                Direction::Outbound,
                1,
                2,
                None,
            )
            .await
            .unwrap();

        let queries = executor.recorded();
        assert!(queries[0].contains(":HAS_MANYxDETACHDELETEx*1..2"));
        assert!(!queries[0].contains("DETACH DELETE"));
    }

    #[tokio::test]
    async fn test_depth_bounds_rejected() {
        let traversal = GraphTraversal::new(Arc::new(ScriptedExecutor::new(vec![])));
        let err = traversal
            .traverse("a", None, Direction::Outbound, 0, 3, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RelataError::InvalidArgument(_)));

        let err = traversal
            .traverse("a", None, Direction::Outbound, 1, 99, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RelataError::InvalidArgument(_)));
    }

    fn path_rows(paths: &[&[&str]]) -> QueryResult {
        let rows = paths
            .iter()
            .map(|ids| {
                let edges: Vec<(String, String)> = ids
                    .windows(2)
                    .map(|w| (w[0].to_string(), w[1].to_string()))
                    .collect();
                vec![
                    json!(ids),
                    json!(vec!["Entity"; ids.len()]),
                    json!(vec![serde_json::Map::new(); ids.len()]),
                    json!(vec!["HAS_MANY"; edges.len()]),
                    json!(edges.iter().map(|e| e.0.clone()).collect::<Vec<_>>()),
                    json!(edges.iter().map(|e| e.1.clone()).collect::<Vec<_>>()),
                    json!(vec![0; edges.len()]),
                    json!(vec![serde_json::Map::new(); edges.len()]),
                ]
            })
            .collect();
        QueryResult::ok(
            vec![
                "vertex_ids".into(),
                "vertex_tags".into(),
                "vertex_props".into(),
                "edge_types".into(),
                "edge_sources".into(),
                "edge_targets".into(),
                "edge_ranks".into(),
                "edge_props".into(),
            ],
            rows,
            4,
        )
    }

    fn path_row(ids: &[&str]) -> QueryResult {
        path_rows(&[ids])
    }

    #[tokio::test]
    async fn test_shortest_path_parsed() {
        let executor = Arc::new(ScriptedExecutor::new(vec![path_row(&["a", "b", "c"])]));
        let traversal = GraphTraversal::new(executor.clone());

        let path = traversal
            .find_shortest_path("a", "c", None, Direction::Outbound, 5)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(path.length, 2);
        assert_eq!(path.vertices.len(), 3);
        assert_eq!(path.edges[0].source_id, "a");
        assert_eq!(path.edges[1].target_id, "c");

        let queries = executor.recorded();
        assert!(queries[0].contains("shortestPath"));
        assert!(queries[0].contains("*..5"));
    }

    #[tokio::test]
    async fn test_shortest_path_none_when_no_rows() {
        let executor = Arc::new(ScriptedExecutor::new(vec![QueryResult::ok(
            vec!["vertex_ids".into()],
            vec![],
            1,
        )]));
        let traversal = GraphTraversal::new(executor);

        let path = traversal
            .find_shortest_path("a", "z", None, Direction::Outbound, 5)
            .await
            .unwrap();
        assert!(path.is_none());
    }

    #[tokio::test]
    async fn test_shortest_path_same_vertex_zero_length() {
        let executor = Arc::new(ScriptedExecutor::new(vec![vertex_rows(&["a"])]));
        let traversal = GraphTraversal::new(executor);

        let path = traversal
            .find_shortest_path("a", "a", None, Direction::Outbound, 5)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(path.length, 0);
        assert_eq!(path.vertices[0].id, "a");
    }

    #[tokio::test]
    async fn test_all_paths_capped_in_query() {
        let executor = Arc::new(ScriptedExecutor::new(vec![QueryResult::ok(
            vec!["vertex_ids".into()],
            vec![],
            1,
        )]));
        let traversal = GraphTraversal::new(executor.clone());

        traversal.find_all_paths("a", "z", 4, None).await.unwrap();

        let queries = executor.recorded();
        assert!(queries[0].contains(&format!("LIMIT {}", ALL_PATHS_CAP)));
        assert!(queries[0].contains("*1..4]->"));
    }

    #[tokio::test]
    async fn test_shortest_path_no_longer_than_enumerated_paths() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            path_rows(&[&["a", "x", "y", "z"], &["a", "b", "z"]]),
            path_row(&["a", "b", "z"]),
        ]));
        let traversal = GraphTraversal::new(executor);

        let all = traversal.find_all_paths("a", "z", 5, None).await.unwrap();
        assert_eq!(all.len(), 2);
        let min_enumerated = all.iter().map(|p| p.length).min().unwrap();

        let shortest = traversal
            .find_shortest_path("a", "z", None, Direction::Outbound, 5)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(shortest.length, 2);
        assert!(shortest.length <= min_enumerated);
        assert!(all.iter().all(|p| shortest.length <= p.length));
    }

    #[tokio::test]
    async fn test_subgraph_includes_seeds() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            vertex_rows(&["a", "b"]),
            vertex_rows(&["c"]),
            edge_rows(&[("a", "c"), ("b", "c")]),
        ]));
        let traversal = GraphTraversal::new(executor.clone());

        let result = traversal
            .get_subgraph(&["a".to_string(), "b".to_string()], 2, None)
            .await
            .unwrap();

        assert_eq!(result.total_vertices, 3);
        assert_eq!(result.total_edges, 2);
        assert!(executor.recorded()[0].contains("IN ['a', 'b']"));
    }

    #[tokio::test]
    async fn test_unavailable_propagates() {
        let executor = Arc::new(ScriptedExecutor::new(vec![QueryResult::failed(
            "connection refused",
            2,
        )]));
        let traversal = GraphTraversal::new(executor);

        let err = traversal
            .traverse("a", None, Direction::Outbound, 1, 2, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RelataError::Unavailable(_)));
    }
}
