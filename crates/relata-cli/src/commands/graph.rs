//! Graph-store CLI commands: schema, sync, traversal, analytics.

use crate::output;
use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use relata_db::DbPool;
use relata_graph::analytics::{Algorithm, AnalyticsOptions, GraphAnalytics};
use relata_graph::traversal::TraversalOps;
use relata_graph::{
    Direction, GraphClient, GraphTraversal, HealthStatus, QueryExecutor, SyncManager,
};
use std::sync::Arc;

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Declare graph constraints and indexes
    Schema,

    /// Full sync of entities and relationships into the graph store
    Sync,

    /// Enable incremental sync for this process
    EnableSync,

    /// Disable incremental sync for this process
    DisableSync,

    /// Multi-hop walk from a vertex
    Traverse {
        /// Start vertex ID
        start: String,

        /// Traversal direction (out, in, both)
        #[arg(long, default_value = "out")]
        direction: String,

        /// Comma-separated edge type filter
        #[arg(long)]
        edge_types: Option<String>,

        #[arg(long, default_value_t = 1)]
        min_depth: usize,

        /// Depth bound (1..=10)
        #[arg(long, default_value_t = 3)]
        max_depth: usize,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Direct neighbors of a vertex
    Neighbors {
        /// Vertex ID
        vertex: String,

        /// Traversal direction (out, in, both)
        #[arg(long, default_value = "both")]
        direction: String,

        /// Comma-separated edge type filter
        #[arg(long)]
        edge_types: Option<String>,

        #[arg(long, default_value_t = 100)]
        limit: usize,
    },

    /// Shortest path between two vertices
    Path {
        /// Source vertex ID
        source: String,

        /// Target vertex ID
        target: String,

        /// Traversal direction (out, in, both)
        #[arg(long, default_value = "out")]
        direction: String,

        /// Comma-separated edge type filter
        #[arg(long)]
        edge_types: Option<String>,

        /// Depth bound (1..=10)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// All distinct outbound paths between two vertices (capped)
    AllPaths {
        /// Source vertex ID
        source: String,

        /// Target vertex ID
        target: String,

        /// Comma-separated edge type filter
        #[arg(long)]
        edge_types: Option<String>,

        /// Depth bound (1..=10)
        #[arg(long, default_value_t = 5)]
        max_depth: usize,
    },

    /// Neighborhood union around a seed set
    Subgraph {
        /// Seed vertex IDs
        #[arg(required = true)]
        vertices: Vec<String>,

        /// Comma-separated edge type filter
        #[arg(long)]
        edge_types: Option<String>,

        /// Neighborhood depth (1..=10)
        #[arg(long, default_value_t = 1)]
        depth: usize,
    },

    /// Vertices reachable by walking edges backwards
    Ancestors {
        /// Vertex ID
        vertex: String,

        /// Depth bound (1..=10)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Vertices reachable by walking edges forwards
    Descendants {
        /// Vertex ID
        vertex: String,

        /// Depth bound (1..=10)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Whether two vertices are connected, ignoring direction
    Connected {
        /// First vertex ID
        a: String,

        /// Second vertex ID
        b: String,

        /// Depth bound (1..=10)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Run an analytics algorithm
    Analytics {
        /// Algorithm: degree, betweenness, closeness, pagerank,
        /// clustering, components, shortest_path, density
        algorithm: String,

        /// Explicit comma-separated vertex universe
        #[arg(long)]
        vertex_ids: Option<String>,

        #[arg(long)]
        limit: Option<usize>,

        /// Override the default sample cap
        #[arg(long)]
        sample_size: Option<usize>,

        /// PageRank damping factor
        #[arg(long)]
        damping: Option<f64>,

        /// PageRank iteration count
        #[arg(long)]
        iterations: Option<usize>,

        /// Source vertex (shortest_path only)
        #[arg(long)]
        source: Option<String>,

        /// Target vertex (shortest_path only)
        #[arg(long)]
        target: Option<String>,
    },

    /// Execute a raw graph query
    Query {
        /// Query string
        query: String,
    },

    /// Vertex and edge totals
    Status,

    /// Connectivity and sync state
    Health,

    /// Delete every vertex and edge in the graph store
    Clear {
        /// Confirm the destructive operation
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(cmd: GraphCommands, pool: &DbPool) -> Result<()> {
    // Health connects on its own terms: an unreachable store is reported
    // as degraded status, not a failed command.
    if let GraphCommands::Health = cmd {
        return cmd_health().await;
    }

    let client = GraphClient::connect_from_env().await?;
    let executor: Arc<dyn QueryExecutor> = Arc::new(client);

    match cmd {
        GraphCommands::Schema => {
            let declarations = relata_graph::ensure_schema(executor.as_ref()).await;
            output::print_schema(&declarations);
            Ok(())
        }
        GraphCommands::Sync => cmd_sync(executor, pool).await,
        GraphCommands::EnableSync => {
            let manager = SyncManager::new(executor);
            manager.enable_sync();
            println!("Incremental sync: {}", "enabled".green());
            println!(
                "{}",
                "Note: the flag is process-wide and resets on restart.".dimmed()
            );
            Ok(())
        }
        GraphCommands::DisableSync => {
            let manager = SyncManager::new(executor);
            manager.disable_sync();
            println!("Incremental sync: {}", "disabled".yellow());
            println!(
                "{}",
                "Note: the flag is process-wide and resets on restart.".dimmed()
            );
            Ok(())
        }
        GraphCommands::Traverse {
            start,
            direction,
            edge_types,
            min_depth,
            max_depth,
            limit,
        } => {
            let traversal = GraphTraversal::new(executor);
            let edge_types = parse_edge_types(edge_types);
            let result = traversal
                .traverse(
                    &start,
                    edge_types.as_deref(),
                    parse_direction(&direction)?,
                    min_depth,
                    max_depth,
                    limit,
                )
                .await?;
            output::print_traversal_result(&result);
            Ok(())
        }
        GraphCommands::Neighbors {
            vertex,
            direction,
            edge_types,
            limit,
        } => {
            let traversal = GraphTraversal::new(executor);
            let edge_types = parse_edge_types(edge_types);
            let result = traversal
                .find_neighbors(
                    &vertex,
                    edge_types.as_deref(),
                    parse_direction(&direction)?,
                    limit,
                )
                .await?;
            output::print_traversal_result(&result);
            Ok(())
        }
        GraphCommands::Path {
            source,
            target,
            direction,
            edge_types,
            max_depth,
        } => {
            let traversal = GraphTraversal::new(executor);
            let edge_types = parse_edge_types(edge_types);
            let path = traversal
                .find_shortest_path(
                    &source,
                    &target,
                    edge_types.as_deref(),
                    parse_direction(&direction)?,
                    max_depth,
                )
                .await?;
            output::print_graph_path(path.as_ref());
            Ok(())
        }
        GraphCommands::AllPaths {
            source,
            target,
            edge_types,
            max_depth,
        } => {
            let traversal = GraphTraversal::new(executor);
            let edge_types = parse_edge_types(edge_types);
            let paths = traversal
                .find_all_paths(&source, &target, max_depth, edge_types.as_deref())
                .await?;
            output::print_graph_paths(&paths);
            Ok(())
        }
        GraphCommands::Subgraph {
            vertices,
            edge_types,
            depth,
        } => {
            let traversal = GraphTraversal::new(executor);
            let edge_types = parse_edge_types(edge_types);
            let result = traversal
                .get_subgraph(&vertices, depth, edge_types.as_deref())
                .await?;
            output::print_traversal_result(&result);
            Ok(())
        }
        GraphCommands::Ancestors { vertex, max_depth } => {
            let traversal = GraphTraversal::new(executor);
            let result = traversal.find_ancestors(&vertex, max_depth).await?;
            output::print_traversal_result(&result);
            Ok(())
        }
        GraphCommands::Descendants { vertex, max_depth } => {
            let traversal = GraphTraversal::new(executor);
            let result = traversal.find_descendants(&vertex, max_depth).await?;
            output::print_traversal_result(&result);
            Ok(())
        }
        GraphCommands::Connected { a, b, max_depth } => {
            let traversal = GraphTraversal::new(executor);
            let connected = traversal.is_connected(&a, &b, max_depth).await?;
            if connected {
                println!("{} and {} are {}", a.cyan(), b.cyan(), "connected".green());
            } else {
                println!("{} and {} are {}", a.cyan(), b.cyan(), "not connected".red());
            }
            Ok(())
        }
        GraphCommands::Analytics {
            algorithm,
            vertex_ids,
            limit,
            sample_size,
            damping,
            iterations,
            source,
            target,
        } => {
            let algorithm = Algorithm::from_str(&algorithm)
                .ok_or_else(|| anyhow!("unknown algorithm: {algorithm}"))?;
            let options = AnalyticsOptions {
                vertex_ids: parse_edge_types(vertex_ids),
                limit,
                sample_size,
                damping_factor: damping,
                iterations,
                source_id: source,
                target_id: target,
            };

            let traversal: Arc<dyn TraversalOps> = Arc::new(GraphTraversal::new(executor));
            let analytics = GraphAnalytics::new(traversal);
            let result = analytics.run(algorithm, &options).await;
            output::print_analytics(&result);
            Ok(())
        }
        GraphCommands::Query { query } => {
            let result = executor.execute(&query, None).await;
            if !result.success {
                return Err(anyhow!(
                    "query failed: {}",
                    result
                        .error_message
                        .unwrap_or_else(|| "unknown error".to_string())
                ));
            }
            output::print_query_result(&result);
            Ok(())
        }
        GraphCommands::Status => {
            let manager = SyncManager::new(executor);
            let stats = manager.stats().await;
            output::print_stats(&stats);
            Ok(())
        }
        GraphCommands::Health => cmd_health().await,
        GraphCommands::Clear { force } => {
            if !force {
                return Err(anyhow!(
                    "clear deletes every vertex and edge; re-run with --force"
                ));
            }
            let manager = SyncManager::new(executor);
            manager.clear_graph().await?;
            println!("{}", "Graph store cleared.".yellow().bold());
            Ok(())
        }
    }
}

/// Health check that reports an unreachable store instead of failing.
async fn cmd_health() -> Result<()> {
    match GraphClient::connect_from_env().await {
        Ok(client) => {
            let executor: Arc<dyn QueryExecutor> = Arc::new(client);
            let manager = SyncManager::new(executor);
            manager.initialize().await;
            output::print_health(&manager.health().await);
        }
        Err(err) => {
            output::print_health(&HealthStatus::unreachable());
            println!("{}", format!("Graph store unreachable: {err}").dimmed());
        }
    }
    Ok(())
}

/// Full sync from SQLite into the graph store.
async fn cmd_sync(executor: Arc<dyn QueryExecutor>, pool: &DbPool) -> Result<()> {
    println!("{}", "Syncing to graph store...".bold());

    let manager = SyncManager::new(executor);
    if !manager.initialize().await {
        println!("{}", "Warning: schema initialization incomplete.".yellow());
    }

    let report = manager.full_sync(pool).await?;
    output::print_sync_report(&report);
    Ok(())
}

fn parse_direction(s: &str) -> Result<Direction> {
    Direction::from_str(s).ok_or_else(|| anyhow!("unknown direction: {s} (out, in, both)"))
}

fn parse_edge_types(s: Option<String>) -> Option<Vec<String>> {
    s.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
}
