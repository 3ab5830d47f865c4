//! Graph analytics built on the traversal primitives.
//!
//! Every operation takes an optional explicit vertex set; when omitted, a
//! bounded sample is pulled from the store (the caps vary with algorithm
//! cost and can be overridden via [`AnalyticsOptions::sample_size`]).
//! Results are sorted by score descending and re-ranked 1-based after any
//! limit truncation. The [`GraphAnalytics::run`] dispatcher converts any
//! failure into an empty result with a `summary.error` message — analytics
//! degrade to "no data", they never propagate a raw error to transport.

use crate::model::Direction;
use crate::traversal::TraversalOps;
use relata_core::{RelataError, RelataResult};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Default sample caps, by algorithm cost.
const DEGREE_SAMPLE: usize = 1000;
const PAGERANK_SAMPLE: usize = 500;
const COMPONENTS_SAMPLE: usize = 500;
const CLOSENESS_SAMPLE: usize = 100;
const CLUSTERING_SAMPLE: usize = 100;
const BETWEENNESS_SAMPLE: usize = 50;

/// Pair cap for the betweenness approximation.
const BETWEENNESS_PAIR_CAP: usize = 100;

/// Neighbor fetch cap shared by pagerank/clustering/components.
const NEIGHBOR_CAP: usize = 100;

/// Degree centrality scores neighbor counts directly, so its fetch cap
/// matches the vertex sample cap; a hit is flagged in item metadata.
const DEGREE_NEIGHBOR_CAP: usize = 1000;

/// Depth bound for the shortest-path calls analytics issue.
const PATH_DEPTH: usize = 10;

const DEFAULT_DAMPING: f64 = 0.85;
const DEFAULT_ITERATIONS: usize = 20;

/// Supported analytics algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    DegreeCentrality,
    BetweennessCentrality,
    ClosenessCentrality,
    PageRank,
    ClusteringCoefficient,
    ConnectedComponents,
    ShortestPathMetrics,
    GraphDensity,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::DegreeCentrality => "degree_centrality",
            Algorithm::BetweennessCentrality => "betweenness_centrality",
            Algorithm::ClosenessCentrality => "closeness_centrality",
            Algorithm::PageRank => "pagerank",
            Algorithm::ClusteringCoefficient => "clustering_coefficient",
            Algorithm::ConnectedComponents => "connected_components",
            Algorithm::ShortestPathMetrics => "shortest_path_metrics",
            Algorithm::GraphDensity => "graph_density",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "degree_centrality" | "degree" => Some(Algorithm::DegreeCentrality),
            "betweenness_centrality" | "betweenness" => Some(Algorithm::BetweennessCentrality),
            "closeness_centrality" | "closeness" => Some(Algorithm::ClosenessCentrality),
            "pagerank" => Some(Algorithm::PageRank),
            "clustering_coefficient" | "clustering" => Some(Algorithm::ClusteringCoefficient),
            "connected_components" | "components" => Some(Algorithm::ConnectedComponents),
            "shortest_path_metrics" | "shortest_path" => Some(Algorithm::ShortestPathMetrics),
            "graph_density" | "density" => Some(Algorithm::GraphDensity),
            _ => None,
        }
    }
}

/// Tuning knobs; every field optional, defaults per algorithm.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsOptions {
    /// Explicit vertex universe; when `None` a bounded sample is used.
    pub vertex_ids: Option<Vec<String>>,
    /// Truncate the result list before re-ranking.
    pub limit: Option<usize>,
    /// Override the default sample cap.
    pub sample_size: Option<usize>,
    pub damping_factor: Option<f64>,
    pub iterations: Option<usize>,
    /// Required by [`Algorithm::ShortestPathMetrics`].
    pub source_id: Option<String>,
    pub target_id: Option<String>,
}

/// One scored vertex. `rank` is the 1-based position in the returned
/// (possibly truncated) list, not the full universe.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsItem {
    pub vertex_id: String,
    pub score: f64,
    pub rank: usize,
    pub metadata: Map<String, Value>,
}

/// Result of one analytics run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResult {
    pub algorithm: String,
    pub items: Vec<AnalyticsItem>,
    pub summary: Map<String, Value>,
}

impl AnalyticsResult {
    fn empty_with_error(algorithm: Algorithm, error: String) -> Self {
        let mut summary = Map::new();
        summary.insert("error".to_string(), Value::String(error));
        Self {
            algorithm: algorithm.as_str().to_string(),
            items: Vec::new(),
            summary,
        }
    }
}

fn sort_and_rank(mut items: Vec<AnalyticsItem>, limit: Option<usize>) -> Vec<AnalyticsItem> {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.vertex_id.cmp(&b.vertex_id))
    });
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    for (i, item) in items.iter_mut().enumerate() {
        item.rank = i + 1;
    }
    items
}

fn item(vertex_id: &str, score: f64, metadata: Map<String, Value>) -> AnalyticsItem {
    AnalyticsItem {
        vertex_id: vertex_id.to_string(),
        score,
        rank: 0,
        metadata,
    }
}

/// Analytics engine over a traversal backend.
#[derive(Clone)]
pub struct GraphAnalytics {
    traversal: Arc<dyn TraversalOps>,
}

impl GraphAnalytics {
    pub fn new(traversal: Arc<dyn TraversalOps>) -> Self {
        Self { traversal }
    }

    /// Dispatch an algorithm, degrading every failure to an empty result
    /// with `summary.error`.
    pub async fn run(&self, algorithm: Algorithm, options: &AnalyticsOptions) -> AnalyticsResult {
        let outcome = match algorithm {
            Algorithm::DegreeCentrality => self.degree_centrality(options).await,
            Algorithm::BetweennessCentrality => self.betweenness_centrality(options).await,
            Algorithm::ClosenessCentrality => self.closeness_centrality(options).await,
            Algorithm::PageRank => self.pagerank(options).await,
            Algorithm::ClusteringCoefficient => self.clustering_coefficient(options).await,
            Algorithm::ConnectedComponents => self.connected_components(options).await,
            Algorithm::ShortestPathMetrics => self.shortest_path_metrics(options).await,
            Algorithm::GraphDensity => self.graph_density(options).await,
        };
        match outcome {
            Ok(result) => result,
            Err(e) => {
                debug!(algorithm = algorithm.as_str(), error = %e, "Analytics run degraded");
                AnalyticsResult::empty_with_error(algorithm, e.to_string())
            }
        }
    }

    async fn candidates(
        &self,
        options: &AnalyticsOptions,
        default_cap: usize,
    ) -> RelataResult<Vec<String>> {
        if let Some(ids) = &options.vertex_ids {
            return Ok(ids.clone());
        }
        let cap = options.sample_size.unwrap_or(default_cap);
        self.traversal.sample_vertex_ids(cap).await
    }

    async fn neighbor_ids(
        &self,
        vertex: &str,
        direction: Direction,
        cap: usize,
    ) -> RelataResult<Vec<String>> {
        let result = self.traversal.neighbors(vertex, direction, cap).await?;
        Ok(result
            .vertices
            .into_iter()
            .map(|v| v.id)
            .filter(|id| id != vertex)
            .collect())
    }

    /// Degree centrality: out-degree plus in-degree via two 1-hop queries
    /// per vertex; the in/out split rides in metadata.
    pub async fn degree_centrality(
        &self,
        options: &AnalyticsOptions,
    ) -> RelataResult<AnalyticsResult> {
        let candidates = self.candidates(options, DEGREE_SAMPLE).await?;
        let mut items = Vec::with_capacity(candidates.len());

        for vertex in &candidates {
            let out_degree = self
                .neighbor_ids(vertex, Direction::Outbound, DEGREE_NEIGHBOR_CAP)
                .await?
                .len();
            let in_degree = self
                .neighbor_ids(vertex, Direction::Inbound, DEGREE_NEIGHBOR_CAP)
                .await?
                .len();

            let mut metadata = Map::new();
            metadata.insert("out_degree".to_string(), json!(out_degree));
            metadata.insert("in_degree".to_string(), json!(in_degree));
            if out_degree >= DEGREE_NEIGHBOR_CAP || in_degree >= DEGREE_NEIGHBOR_CAP {
                metadata.insert("truncated".to_string(), json!(true));
            }
            items.push(item(vertex, (out_degree + in_degree) as f64, metadata));
        }

        let mut summary = Map::new();
        summary.insert("vertex_count".to_string(), json!(candidates.len()));
        Ok(AnalyticsResult {
            algorithm: Algorithm::DegreeCentrality.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// Sampling approximation of betweenness centrality: shortest paths
    /// over a bounded pair sample, counting strictly-between vertices.
    /// Scores are raw counts, not normalized to [0, 1].
    pub async fn betweenness_centrality(
        &self,
        options: &AnalyticsOptions,
    ) -> RelataResult<AnalyticsResult> {
        let mut candidates = self.candidates(options, BETWEENNESS_SAMPLE).await?;
        candidates.truncate(options.sample_size.unwrap_or(BETWEENNESS_SAMPLE));

        let mut counters: HashMap<String, usize> =
            candidates.iter().map(|v| (v.clone(), 0)).collect();
        let mut pairs_evaluated = 0usize;

        'outer: for source in &candidates {
            for target in &candidates {
                if source == target {
                    continue;
                }
                if pairs_evaluated >= BETWEENNESS_PAIR_CAP {
                    break 'outer;
                }
                pairs_evaluated += 1;

                if let Some(path) = self.traversal.shortest_path(source, target, PATH_DEPTH).await? {
                    for vertex in path.vertices.iter().skip(1).take(path.length.saturating_sub(1)) {
                        *counters.entry(vertex.id.clone()).or_insert(0) += 1;
                    }
                }
            }
        }

        let items: Vec<AnalyticsItem> = candidates
            .iter()
            .map(|v| item(v, counters.get(v).copied().unwrap_or(0) as f64, Map::new()))
            .collect();

        let mut summary = Map::new();
        summary.insert("pairs_evaluated".to_string(), json!(pairs_evaluated));
        summary.insert("approximate".to_string(), json!(true));
        Ok(AnalyticsResult {
            algorithm: Algorithm::BetweennessCentrality.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// Closeness centrality over the bounded candidate set:
    /// `reachable_count / sum_of_distances`, 0 when nothing is reachable.
    /// O(n²) shortest-path calls, which is why the default sample is small.
    pub async fn closeness_centrality(
        &self,
        options: &AnalyticsOptions,
    ) -> RelataResult<AnalyticsResult> {
        let candidates = self.candidates(options, CLOSENESS_SAMPLE).await?;
        let mut items = Vec::with_capacity(candidates.len());

        for vertex in &candidates {
            let mut reachable = 0usize;
            let mut total_distance = 0usize;
            for other in &candidates {
                if other == vertex {
                    continue;
                }
                if let Some(path) = self.traversal.shortest_path(vertex, other, PATH_DEPTH).await? {
                    reachable += 1;
                    total_distance += path.length;
                }
            }

            let score = if reachable > 0 && total_distance > 0 {
                reachable as f64 / total_distance as f64
            } else {
                0.0
            };
            let mut metadata = Map::new();
            metadata.insert("reachable".to_string(), json!(reachable));
            metadata.insert("total_distance".to_string(), json!(total_distance));
            items.push(item(vertex, score, metadata));
        }

        let mut summary = Map::new();
        summary.insert("vertex_count".to_string(), json!(candidates.len()));
        Ok(AnalyticsResult {
            algorithm: Algorithm::ClosenessCentrality.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// PageRank via classic power iteration over the sampled subgraph.
    ///
    /// Out-neighbor lists are fetched once before iterating. Dangling
    /// vertices redistribute their mass uniformly so the scores keep
    /// summing to 1.
    pub async fn pagerank(&self, options: &AnalyticsOptions) -> RelataResult<AnalyticsResult> {
        let candidates = self.candidates(options, PAGERANK_SAMPLE).await?;
        if candidates.is_empty() {
            return Ok(AnalyticsResult {
                algorithm: Algorithm::PageRank.as_str().to_string(),
                items: Vec::new(),
                summary: Map::new(),
            });
        }

        let damping = options.damping_factor.unwrap_or(DEFAULT_DAMPING);
        let iterations = options.iterations.unwrap_or(DEFAULT_ITERATIONS);
        let n = candidates.len() as f64;
        let universe: HashSet<&String> = candidates.iter().collect();

        // Precompute out-neighbor lists restricted to the sample.
        let mut out_neighbors: HashMap<String, Vec<String>> = HashMap::new();
        for vertex in &candidates {
            let neighbors: Vec<String> = self
                .neighbor_ids(vertex, Direction::Outbound, NEIGHBOR_CAP)
                .await?
                .into_iter()
                .filter(|id| universe.contains(id))
                .collect();
            out_neighbors.insert(vertex.clone(), neighbors);
        }
        let mut in_neighbors: HashMap<&String, Vec<&String>> = HashMap::new();
        for (source, targets) in &out_neighbors {
            for target in targets {
                in_neighbors.entry(target).or_default().push(source);
            }
        }

        let mut ranks: HashMap<&String, f64> =
            candidates.iter().map(|v| (v, 1.0 / n)).collect();

        for _ in 0..iterations {
            let dangling_mass: f64 = candidates
                .iter()
                .filter(|v| out_neighbors[*v].is_empty())
                .map(|v| ranks[v])
                .sum();

            let mut next: HashMap<&String, f64> = HashMap::with_capacity(candidates.len());
            for vertex in &candidates {
                let incoming: f64 = in_neighbors
                    .get(vertex)
                    .map(|sources| {
                        sources
                            .iter()
                            .map(|s| ranks[*s] / out_neighbors[*s].len() as f64)
                            .sum()
                    })
                    .unwrap_or(0.0);
                let score = (1.0 - damping) / n + damping * (incoming + dangling_mass / n);
                next.insert(vertex, score);
            }
            ranks = next;
        }

        let items: Vec<AnalyticsItem> = candidates
            .iter()
            .map(|v| item(v, ranks[v], Map::new()))
            .collect();

        let mut summary = Map::new();
        summary.insert("damping_factor".to_string(), json!(damping));
        summary.insert("iterations".to_string(), json!(iterations));
        summary.insert(
            "score_sum".to_string(),
            json!(items.iter().map(|i| i.score).sum::<f64>()),
        );
        Ok(AnalyticsResult {
            algorithm: Algorithm::PageRank.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// Local clustering coefficient: triangles over possible neighbor
    /// pairs, with neighbor sets capped and pair connectivity tested via
    /// 1-hop `is_connected`.
    pub async fn clustering_coefficient(
        &self,
        options: &AnalyticsOptions,
    ) -> RelataResult<AnalyticsResult> {
        let candidates = self.candidates(options, CLUSTERING_SAMPLE).await?;
        let mut items = Vec::with_capacity(candidates.len());

        for vertex in &candidates {
            let mut neighbors = self
                .neighbor_ids(vertex, Direction::Both, NEIGHBOR_CAP)
                .await?;
            neighbors.sort();
            neighbors.dedup();
            let k = neighbors.len();

            let mut triangles = 0usize;
            if k >= 2 {
                for i in 0..k {
                    for j in (i + 1)..k {
                        if self
                            .traversal
                            .is_connected(&neighbors[i], &neighbors[j], 1)
                            .await?
                        {
                            triangles += 1;
                        }
                    }
                }
            }

            let possible = k * (k.saturating_sub(1)) / 2;
            let score = if possible > 0 {
                triangles as f64 / possible as f64
            } else {
                0.0
            };
            let mut metadata = Map::new();
            metadata.insert("neighbor_count".to_string(), json!(k));
            metadata.insert("triangles".to_string(), json!(triangles));
            items.push(item(vertex, score, metadata));
        }

        let mut summary = Map::new();
        summary.insert("vertex_count".to_string(), json!(candidates.len()));
        Ok(AnalyticsResult {
            algorithm: Algorithm::ClusteringCoefficient.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// Connected components over the sampled universe, ignoring edge
    /// direction. Each vertex scores its component's ordinal index.
    pub async fn connected_components(
        &self,
        options: &AnalyticsOptions,
    ) -> RelataResult<AnalyticsResult> {
        let candidates = self.candidates(options, COMPONENTS_SAMPLE).await?;
        let universe: HashSet<String> = candidates.iter().cloned().collect();

        let mut visited: HashSet<String> = HashSet::new();
        let mut component_sizes: Vec<usize> = Vec::new();
        let mut items = Vec::with_capacity(candidates.len());

        for start in &candidates {
            if visited.contains(start) {
                continue;
            }
            let component_index = component_sizes.len();
            let mut members: Vec<String> = Vec::new();
            let mut queue: VecDeque<String> = VecDeque::new();
            visited.insert(start.clone());
            queue.push_back(start.clone());

            while let Some(vertex) = queue.pop_front() {
                members.push(vertex.clone());
                for next in self.neighbor_ids(&vertex, Direction::Both, NEIGHBOR_CAP).await? {
                    if universe.contains(&next) && visited.insert(next.clone()) {
                        queue.push_back(next);
                    }
                }
            }

            let size = members.len();
            for member in members {
                let mut metadata = Map::new();
                metadata.insert("component_size".to_string(), json!(size));
                items.push(item(&member, component_index as f64, metadata));
            }
            component_sizes.push(size);
        }

        let mut summary = Map::new();
        summary.insert("component_count".to_string(), json!(component_sizes.len()));
        summary.insert(
            "largest_component".to_string(),
            json!(component_sizes.iter().max().copied().unwrap_or(0)),
        );
        summary.insert(
            "smallest_component".to_string(),
            json!(component_sizes.iter().min().copied().unwrap_or(0)),
        );
        let average = if component_sizes.is_empty() {
            0.0
        } else {
            component_sizes.iter().sum::<usize>() as f64 / component_sizes.len() as f64
        };
        summary.insert("average_size".to_string(), json!(average));
        summary.insert(
            "isolated_count".to_string(),
            json!(component_sizes.iter().filter(|s| **s == 1).count()),
        );
        Ok(AnalyticsResult {
            algorithm: Algorithm::ConnectedComponents.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// Shortest-path metrics between the required `source_id` and
    /// `target_id`: path vertices annotated with position and endpoint
    /// flags.
    pub async fn shortest_path_metrics(
        &self,
        options: &AnalyticsOptions,
    ) -> RelataResult<AnalyticsResult> {
        let source = options.source_id.as_deref().ok_or_else(|| {
            RelataError::invalid_argument("shortest_path_metrics requires source_id")
        })?;
        let target = options.target_id.as_deref().ok_or_else(|| {
            RelataError::invalid_argument("shortest_path_metrics requires target_id")
        })?;

        let mut summary = Map::new();
        let Some(path) = self.traversal.shortest_path(source, target, PATH_DEPTH).await? else {
            summary.insert("found".to_string(), json!(false));
            return Ok(AnalyticsResult {
                algorithm: Algorithm::ShortestPathMetrics.as_str().to_string(),
                items: Vec::new(),
                summary,
            });
        };

        let last = path.vertices.len().saturating_sub(1);
        let items: Vec<AnalyticsItem> = path
            .vertices
            .iter()
            .enumerate()
            .map(|(position, vertex)| {
                let mut metadata = Map::new();
                metadata.insert("position".to_string(), json!(position));
                metadata.insert("is_source".to_string(), json!(position == 0));
                metadata.insert("is_target".to_string(), json!(position == last));
                item(&vertex.id, position as f64, metadata)
            })
            .collect();

        summary.insert("found".to_string(), json!(true));
        summary.insert("path_length".to_string(), json!(path.length));
        Ok(AnalyticsResult {
            algorithm: Algorithm::ShortestPathMetrics.as_str().to_string(),
            items: sort_and_rank(items, options.limit),
            summary,
        })
    }

    /// Graph density `e / (n * (n - 1))` and average degree `2e / n`,
    /// both 0 for empty or single-vertex graphs.
    pub async fn graph_density(&self, _options: &AnalyticsOptions) -> RelataResult<AnalyticsResult> {
        let (vertices, edges) = self.traversal.counts().await?;
        let n = vertices as f64;
        let e = edges as f64;

        let density = if vertices <= 1 { 0.0 } else { e / (n * (n - 1.0)) };
        let average_degree = if vertices == 0 { 0.0 } else { 2.0 * e / n };

        let mut summary = Map::new();
        summary.insert("vertex_count".to_string(), json!(vertices));
        summary.insert("edge_count".to_string(), json!(edges));
        summary.insert("density".to_string(), json!(density));
        summary.insert("average_degree".to_string(), json!(average_degree));
        Ok(AnalyticsResult {
            algorithm: Algorithm::GraphDensity.as_str().to_string(),
            items: Vec::new(),
            summary,
        })
    }
}
