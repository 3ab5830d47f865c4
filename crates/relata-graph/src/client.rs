//! Neo4j connection client.

use crate::executor::{substitute_params, QueryExecutor, QueryResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::warn;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "relata_dev".to_string(),
        }
    }
}

impl GraphConfig {
    /// Build a config from `NEO4J_URI` / `NEO4J_USER` / `NEO4J_PASSWORD`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            uri: std::env::var("NEO4J_URI").unwrap_or(defaults.uri),
            user: std::env::var("NEO4J_USER").unwrap_or(defaults.user),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or(defaults.password),
        }
    }
}

/// Client for the Neo4j projection of the relationship graph.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// Note: neo4rs uses a lazy deadpool — `Graph::connect` only creates the
    /// pool object and does NOT establish a real bolt connection yet. We run
    /// a cheap `RETURN 1` ping immediately so that callers can wrap this in
    /// a timeout and get a fast failure when Neo4j is unreachable.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db("neo4j")
            .max_connections(4)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        // Ping to force an actual TCP+bolt handshake so the caller's timeout works.
        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j is not responding to queries")?;

        Ok(Self { graph })
    }

    /// Create a new GraphClient from environment configuration.
    pub async fn connect_from_env() -> Result<Self> {
        Self::connect(&GraphConfig::from_env()).await
    }

    async fn run_query(&self, text: &str) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
        let mut result = self
            .graph
            .execute(Query::new(text.to_string()))
            .await
            .context("Neo4j query failed")?;

        // Column order is normalized to the first row's key order; every
        // builder in this crate addresses cells by column name, not index.
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<Value>> = Vec::new();

        while let Some(row) = result
            .next()
            .await
            .context("Neo4j result stream failed")?
        {
            let map: BTreeMap<String, Value> = row
                .to()
                .context("Failed to decode Neo4j row")?;
            if columns.is_empty() {
                columns = map.keys().cloned().collect();
            }
            let cells = columns
                .iter()
                .map(|c| map.get(c).cloned().unwrap_or(Value::Null))
                .collect();
            rows.push(cells);
        }

        Ok((columns, rows))
    }
}

#[async_trait]
impl QueryExecutor for GraphClient {
    async fn execute(&self, query: &str, params: Option<&HashMap<String, Value>>) -> QueryResult {
        let text = match params {
            Some(p) => substitute_params(query, p),
            None => query.to_string(),
        };

        let started = Instant::now();
        match self.run_query(&text).await {
            Ok((columns, rows)) => {
                QueryResult::ok(columns, rows, started.elapsed().as_millis() as u64)
            }
            Err(e) => {
                warn!(error = %e, "Graph query failed");
                QueryResult::failed(e.to_string(), started.elapsed().as_millis() as u64)
            }
        }
    }

    async fn check_connectivity(&self) -> bool {
        self.graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .is_ok()
    }
}
