//! Relational-to-graph synchronization.
//!
//! The [`SyncManager`] is the only writer into the graph store. It reads
//! active entities and relationships from the relational source of truth
//! and upserts them as vertices/edges; the projection is eventually
//! consistent and never authoritative — on any conflict the relational
//! record wins, and re-running a full sync repairs a partial one because
//! every upsert is keyed by stable entity id.

use crate::executor::{QueryExecutor, QueryResult};
use crate::schema::{self, SchemaOutcome};
use relata_core::{RelataError, RelataResult};
use relata_db::queries::{entities, relationships};
use relata_db::DbPool;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a full sync run. Per-record failures are collected rather
/// than aborting the whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub instances_synced: usize,
    pub relationships_synced: usize,
    pub errors: Vec<String>,
}

/// Connectivity and freshness summary for the graph projection.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub connected: bool,
    pub initialized: bool,
    pub sync_enabled: bool,
    pub vertex_count: u64,
    pub edge_count: u64,
}

impl HealthStatus {
    /// Fully degraded report for a store that cannot even be reached:
    /// disconnected, uninitialized, zero counts.
    pub fn unreachable() -> Self {
        Self {
            connected: false,
            initialized: false,
            sync_enabled: false,
            vertex_count: 0,
            edge_count: 0,
        }
    }
}

/// Global vertex/edge totals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphStats {
    pub vertex_count: u64,
    pub edge_count: u64,
}

/// Owner of the graph projection lifecycle: schema, sync, clear.
pub struct SyncManager {
    executor: Arc<dyn QueryExecutor>,
    /// Process-wide toggle for incremental mirroring; not persisted, so it
    /// resets to enabled on restart.
    sync_enabled: AtomicBool,
    initialized: AtomicBool,
}

fn edge_label(relationship_type: &str) -> String {
    relationship_type
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

impl SyncManager {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            sync_enabled: AtomicBool::new(true),
            initialized: AtomicBool::new(false),
        }
    }

    /// Best-effort startup: check connectivity and declare the schema.
    ///
    /// Returns `false` (without erroring) when the store is unreachable —
    /// the service still boots and reports "not initialized" until a later
    /// call succeeds.
    pub async fn initialize(&self) -> bool {
        if !self.executor.check_connectivity().await {
            warn!("Graph store unreachable; starting without projection");
            return false;
        }

        let declarations = schema::ensure_schema(self.executor.as_ref()).await;
        for declaration in &declarations {
            if let SchemaOutcome::Failed(message) = &declaration.outcome {
                warn!(name = declaration.name, error = %message, "Schema element not declared");
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
        info!("Graph projection initialized");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Allow incremental mirroring of relational mutations.
    pub fn enable_sync(&self) {
        self.sync_enabled.store(true, Ordering::SeqCst);
    }

    /// Pause incremental mirroring; full sync remains available.
    pub fn disable_sync(&self) {
        self.sync_enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_sync_enabled(&self) -> bool {
        self.sync_enabled.load(Ordering::SeqCst)
    }

    async fn upsert_vertex_query(&self, id: &str, tag: &str, name: &str, attributes: &str) -> QueryResult {
        let params: HashMap<String, Value> = [
            ("id".to_string(), Value::String(id.to_string())),
            ("tag".to_string(), Value::String(tag.to_string())),
            ("name".to_string(), Value::String(name.to_string())),
            ("attributes".to_string(), Value::String(attributes.to_string())),
        ]
        .into();
        self.executor
            .execute(
                "MERGE (v:Entity {id: $id}) \
                 SET v.tag = $tag, v.name = $name, v.attributes = $attributes",
                Some(&params),
            )
            .await
    }

    async fn upsert_edge_query(&self, rel: &relationships::RelationshipRow) -> QueryResult {
        // The relational store allows one active edge per (source, target,
        // type) triple, so the mirrored rank is always 0; the property is
        // kept because the graph store itself permits parallel edges.
        let label = edge_label(&rel.relationship_type);
        let params: HashMap<String, Value> = [
            ("id".to_string(), Value::String(rel.id.clone())),
            ("source".to_string(), Value::String(rel.source_id.clone())),
            ("target".to_string(), Value::String(rel.target_id.clone())),
            (
                "cardinality".to_string(),
                Value::String(rel.cardinality.clone()),
            ),
            (
                "bidirectional".to_string(),
                Value::Bool(rel.is_bidirectional),
            ),
        ]
        .into();
        let query = format!(
            "MATCH (a:Entity {{id: $source}}), (b:Entity {{id: $target}}) \
             MERGE (a)-[r:{label} {{rank: 0}}]->(b) \
             SET r.id = $id, r.cardinality = $cardinality, \
                 r.is_bidirectional = $bidirectional"
        );
        self.executor.execute(&query, Some(&params)).await
    }

    /// Re-project every active entity and relationship into the graph
    /// store. Individual record failures land in `errors`.
    pub async fn full_sync(&self, pool: &DbPool) -> RelataResult<SyncReport> {
        let entity_rows = entities::list_entities(pool, u32::MAX)?;
        let relationship_rows = relationships::list_active(pool)?;

        let mut report = SyncReport::default();

        for row in &entity_rows {
            let result = self
                .upsert_vertex_query(&row.id, &row.entity_type, &row.name, &row.attributes)
                .await;
            if result.success {
                report.instances_synced += 1;
            } else {
                report.errors.push(format!(
                    "vertex {}: {}",
                    row.id,
                    result.error_message.unwrap_or_else(|| "unknown".to_string())
                ));
            }
        }

        for row in &relationship_rows {
            let result = self.upsert_edge_query(row).await;
            if result.success {
                report.relationships_synced += 1;
            } else {
                report.errors.push(format!(
                    "edge {}: {}",
                    row.id,
                    result.error_message.unwrap_or_else(|| "unknown".to_string())
                ));
            }
        }

        info!(
            instances = report.instances_synced,
            relationships = report.relationships_synced,
            errors = report.errors.len(),
            "Full sync complete"
        );
        Ok(report)
    }

    /// Incremental vertex upsert for one entity. No-op (returning `false`)
    /// when sync is disabled.
    pub async fn sync_entity(&self, pool: &DbPool, entity_id: &str) -> RelataResult<bool> {
        if !self.is_sync_enabled() {
            return Ok(false);
        }
        let row = entities::require_entity(pool, entity_id)?;
        let result = self
            .upsert_vertex_query(&row.id, &row.entity_type, &row.name, &row.attributes)
            .await;
        if !result.success {
            return Err(RelataError::Unavailable(
                result
                    .error_message
                    .unwrap_or_else(|| "vertex upsert failed".to_string()),
            ));
        }
        Ok(true)
    }

    /// Incremental edge upsert for one relationship. No-op when disabled.
    pub async fn sync_relationship(&self, pool: &DbPool, relationship_id: &str) -> RelataResult<bool> {
        if !self.is_sync_enabled() {
            return Ok(false);
        }
        let row = relationships::get_relationship(pool, relationship_id)?;
        let result = self.upsert_edge_query(&row).await;
        if !result.success {
            return Err(RelataError::Unavailable(
                result
                    .error_message
                    .unwrap_or_else(|| "edge upsert failed".to_string()),
            ));
        }
        Ok(true)
    }

    /// Remove the mirrored edge for a soft-deleted relationship. No-op
    /// when disabled.
    pub async fn remove_relationship(&self, relationship_id: &str) -> RelataResult<bool> {
        if !self.is_sync_enabled() {
            return Ok(false);
        }
        let params: HashMap<String, Value> = [(
            "id".to_string(),
            Value::String(relationship_id.to_string()),
        )]
        .into();
        let result = self
            .executor
            .execute(
                "MATCH (:Entity)-[r {id: $id}]->(:Entity) DELETE r",
                Some(&params),
            )
            .await;
        if !result.success {
            return Err(RelataError::Unavailable(
                result
                    .error_message
                    .unwrap_or_else(|| "edge delete failed".to_string()),
            ));
        }
        Ok(true)
    }

    /// Destructive: drop every mirrored vertex and edge.
    pub async fn clear_graph(&self) -> RelataResult<()> {
        let result = self
            .executor
            .execute("MATCH (n:Entity) DETACH DELETE n", None)
            .await;
        if !result.success {
            return Err(RelataError::Unavailable(
                result
                    .error_message
                    .unwrap_or_else(|| "clear failed".to_string()),
            ));
        }
        warn!("Graph projection cleared");
        Ok(())
    }

    async fn count(&self, query: &str) -> u64 {
        let result = self.executor.execute(query, None).await;
        if !result.success {
            return 0;
        }
        let total = result
            .column_values("total")
            .next()
            .and_then(Value::as_u64)
            .unwrap_or(0);
        total
    }

    /// Global projection totals. Degrades to zeros when unavailable.
    pub async fn stats(&self) -> GraphStats {
        GraphStats {
            vertex_count: self.count("MATCH (v:Entity) RETURN count(v) AS total").await,
            edge_count: self
                .count("MATCH (:Entity)-[r]->(:Entity) RETURN count(r) AS total")
                .await,
        }
    }

    /// Degraded-not-failed health report: an unreachable store yields
    /// `connected = false` with zero counts, never an error.
    pub async fn health(&self) -> HealthStatus {
        let connected = self.executor.check_connectivity().await;
        let stats = if connected {
            self.stats().await
        } else {
            GraphStats {
                vertex_count: 0,
                edge_count: 0,
            }
        };
        HealthStatus {
            connected,
            initialized: self.is_initialized(),
            sync_enabled: self.is_sync_enabled(),
            vertex_count: stats.vertex_count,
            edge_count: stats.edge_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::tests::ScriptedExecutor;
    use relata_core::entity::upsert_entity;
    use relata_core::relationship::{
        create_relationship, Cardinality, CreateRelationship, RelationshipType,
    };
    use serde_json::json;

    fn seeded_pool() -> DbPool {
        let pool = relata_db::init_pool_in_memory().unwrap();
        for id in ["a", "b", "c"] {
            upsert_entity(&pool, id, "object_type", id, &json!({})).unwrap();
        }
        for (s, t) in [("a", "b"), ("b", "c")] {
            create_relationship(
                &pool,
                &CreateRelationship {
                    source_id: s.to_string(),
                    target_id: t.to_string(),
                    relationship_type: RelationshipType::HasMany,
                    cardinality: Cardinality::OneToMany,
                    is_bidirectional: false,
                    rules: None,
                },
            )
            .unwrap();
        }
        pool
    }

    fn ok() -> QueryResult {
        QueryResult::ok(vec![], vec![], 1)
    }

    #[tokio::test]
    async fn test_full_sync_counts() {
        let pool = seeded_pool();
        let executor = Arc::new(ScriptedExecutor::new(vec![ok(), ok(), ok(), ok(), ok()]));
        let manager = SyncManager::new(executor.clone());

        let report = manager.full_sync(&pool).await.unwrap();
        assert_eq!(report.instances_synced, 3);
        assert_eq!(report.relationships_synced, 2);
        assert!(report.errors.is_empty());

        let queries = executor.recorded();
        assert!(queries[0].contains("MERGE (v:Entity {id: 'a'})"));
        assert!(queries[3].contains("MERGE (a)-[r:HAS_MANY {rank: 0}]->(b)"));
    }

    #[tokio::test]
    async fn test_full_sync_rerun_yields_identical_counts() {
        let pool = seeded_pool();
        let executor = Arc::new(ScriptedExecutor::new((0..10).map(|_| ok()).collect()));
        let manager = SyncManager::new(executor);

        let first = manager.full_sync(&pool).await.unwrap();
        let second = manager.full_sync(&pool).await.unwrap();
        assert_eq!(first.instances_synced, second.instances_synced);
        assert_eq!(first.relationships_synced, second.relationships_synced);
    }

    #[tokio::test]
    async fn test_full_sync_collects_partial_failures() {
        let pool = seeded_pool();
        let executor = Arc::new(ScriptedExecutor::new(vec![
            ok(),
            QueryResult::failed("timeout", 1),
            ok(),
            ok(),
            ok(),
        ]));
        let manager = SyncManager::new(executor);

        let report = manager.full_sync(&pool).await.unwrap();
        assert_eq!(report.instances_synced, 2);
        assert_eq!(report.relationships_synced, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("timeout"));
    }

    #[tokio::test]
    async fn test_disabled_sync_is_noop() {
        let pool = seeded_pool();
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let manager = SyncManager::new(executor.clone());

        assert!(manager.is_sync_enabled());
        manager.disable_sync();
        assert!(!manager.is_sync_enabled());

        assert!(!manager.sync_entity(&pool, "a").await.unwrap());
        assert!(!manager.remove_relationship("some-id").await.unwrap());
        assert!(executor.recorded().is_empty());

        manager.enable_sync();
        assert!(manager.is_sync_enabled());
    }

    #[tokio::test]
    async fn test_incremental_sync_issues_upsert() {
        let pool = seeded_pool();
        let executor = Arc::new(ScriptedExecutor::new(vec![ok()]));
        let manager = SyncManager::new(executor.clone());

        assert!(manager.sync_entity(&pool, "a").await.unwrap());
        assert!(executor.recorded()[0].contains("MERGE (v:Entity {id: 'a'})"));
    }

    #[tokio::test]
    async fn test_clear_graph_detaches() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ok()]));
        let manager = SyncManager::new(executor.clone());

        manager.clear_graph().await.unwrap();
        assert!(executor.recorded()[0].contains("DETACH DELETE"));
    }

    #[tokio::test]
    async fn test_health_degrades_when_disconnected() {
        let mut executor = ScriptedExecutor::new(vec![]);
        executor.connected = false;
        let manager = SyncManager::new(Arc::new(executor));

        let health = manager.health().await;
        assert!(!health.connected);
        assert!(!health.initialized);
        assert_eq!(health.vertex_count, 0);
    }

    #[test]
    fn test_unreachable_health_reports_not_initialized() {
        let health = HealthStatus::unreachable();
        assert!(!health.connected);
        assert!(!health.initialized);
        assert!(!health.sync_enabled);
        assert_eq!(health.vertex_count, 0);
        assert_eq!(health.edge_count, 0);
    }
}
