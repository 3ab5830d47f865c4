//! Graph-store schema declaration.
//!
//! Declarations are idempotent and report a tri-state outcome per
//! statement instead of string-matching "already exists" error text: the
//! store's catalog is consulted first, so a name that is already present
//! never reaches a CREATE at all.

use crate::executor::QueryExecutor;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of declaring one schema element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

/// A named schema element and what happened to it.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDeclaration {
    pub name: &'static str,
    pub outcome: SchemaOutcome,
}

enum Kind {
    Constraint,
    Index,
}

/// The fixed set of vertex/edge declarations used by the domain.
const DECLARATIONS: &[(&str, Kind, &str)] = &[
    (
        "entity_id",
        Kind::Constraint,
        "CREATE CONSTRAINT entity_id IF NOT EXISTS FOR (e:Entity) REQUIRE e.id IS UNIQUE",
    ),
    (
        "entity_tag",
        Kind::Index,
        "CREATE INDEX entity_tag IF NOT EXISTS FOR (e:Entity) ON (e.tag)",
    ),
    (
        "entity_name",
        Kind::Index,
        "CREATE INDEX entity_name IF NOT EXISTS FOR (e:Entity) ON (e.name)",
    ),
];

async fn existing_names(executor: &dyn QueryExecutor, show: &str) -> HashSet<String> {
    let result = executor.execute(show, None).await;
    if !result.success {
        return HashSet::new();
    }
    result
        .column_values("name")
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Declare every schema element, returning the per-element outcome.
///
/// Safe to run repeatedly; existing elements come back as
/// [`SchemaOutcome::AlreadyExists`].
pub async fn ensure_schema(executor: &dyn QueryExecutor) -> Vec<SchemaDeclaration> {
    let constraints = existing_names(executor, "SHOW CONSTRAINTS YIELD name RETURN name").await;
    let indexes = existing_names(executor, "SHOW INDEXES YIELD name RETURN name").await;

    let mut declarations = Vec::with_capacity(DECLARATIONS.len());
    for (name, kind, statement) in DECLARATIONS {
        let existing = match kind {
            Kind::Constraint => &constraints,
            Kind::Index => &indexes,
        };
        let outcome = if existing.contains(*name) {
            SchemaOutcome::AlreadyExists
        } else {
            let result = executor.execute(statement, None).await;
            if result.success {
                SchemaOutcome::Created
            } else {
                let message = result
                    .error_message
                    .unwrap_or_else(|| "unknown schema failure".to_string());
                warn!(name, error = %message, "Schema declaration failed");
                SchemaOutcome::Failed(message)
            }
        };
        declarations.push(SchemaDeclaration { name: *name, outcome });
    }

    let created = declarations
        .iter()
        .filter(|d| d.outcome == SchemaOutcome::Created)
        .count();
    info!(
        created,
        total = declarations.len(),
        "Graph schema declarations complete"
    );
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::QueryResult;
    use crate::traversal::tests::ScriptedExecutor;
    use serde_json::json;

    fn names(values: &[&str]) -> QueryResult {
        QueryResult::ok(
            vec!["name".into()],
            values.iter().map(|n| vec![json!(n)]).collect(),
            1,
        )
    }

    #[tokio::test]
    async fn test_fresh_store_creates_everything() {
        let executor = ScriptedExecutor::new(vec![
            names(&[]),                         // SHOW CONSTRAINTS
            names(&[]),                         // SHOW INDEXES
            QueryResult::ok(vec![], vec![], 1), // 3 CREATEs
            QueryResult::ok(vec![], vec![], 1),
            QueryResult::ok(vec![], vec![], 1),
        ]);

        let declarations = ensure_schema(&executor).await;
        assert!(declarations
            .iter()
            .all(|d| d.outcome == SchemaOutcome::Created));
    }

    #[tokio::test]
    async fn test_existing_elements_not_recreated() {
        let executor = ScriptedExecutor::new(vec![
            names(&["entity_id"]),
            names(&["entity_tag", "entity_name"]),
        ]);

        let declarations = ensure_schema(&executor).await;
        assert!(declarations
            .iter()
            .all(|d| d.outcome == SchemaOutcome::AlreadyExists));
        // No CREATE statements were issued.
        assert_eq!(executor.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_tri_state_not_error() {
        let executor = ScriptedExecutor::new(vec![
            names(&["entity_id"]),
            names(&["entity_tag"]),
            QueryResult::failed("boom", 1),
        ]);

        let declarations = ensure_schema(&executor).await;
        assert_eq!(declarations[0].outcome, SchemaOutcome::AlreadyExists);
        assert_eq!(declarations[1].outcome, SchemaOutcome::AlreadyExists);
        assert!(matches!(declarations[2].outcome, SchemaOutcome::Failed(_)));
    }
}
