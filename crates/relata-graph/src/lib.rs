//! # Relata Graph
//!
//! Neo4j projection of the relational relationship store.
//!
//! Provides synchronization of SQLite entities and relationships into the
//! graph store, Cypher query execution, graph-native traversal, and the
//! analytics engine.

pub mod analytics;
pub mod client;
pub mod executor;
pub mod model;
pub mod schema;
pub mod sync;
pub mod traversal;

pub use analytics::{Algorithm, AnalyticsItem, AnalyticsOptions, AnalyticsResult, GraphAnalytics};
pub use client::{GraphClient, GraphConfig};
pub use executor::{QueryExecutor, QueryResult};
pub use model::{Direction, GraphEdge, GraphPath, GraphVertex, TraversalResult};
pub use schema::{ensure_schema, SchemaDeclaration, SchemaOutcome};
pub use sync::{GraphStats, HealthStatus, SyncManager, SyncReport};
pub use traversal::{GraphTraversal, TraversalOps};
