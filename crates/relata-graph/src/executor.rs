//! Graph query execution interface.
//!
//! The rest of this crate talks to the graph store exclusively through
//! [`QueryExecutor`]: raw query text in, tabular [`QueryResult`] out. The
//! production implementation is the Neo4j client; tests substitute
//! scripted executors.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Tabular result of a graph query.
///
/// Connection and execution failures are encoded as `success = false`
/// with `error_message` set, never surfaced as an `Err` — callers with a
/// reasonable empty fallback (health checks, analytics) degrade instead
/// of crashing.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub success: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub execution_time_ms: u64,
    pub error_message: Option<String>,
}

impl QueryResult {
    /// A successful result from columns and rows.
    pub fn ok(columns: Vec<String>, rows: Vec<Vec<Value>>, execution_time_ms: u64) -> Self {
        let row_count = rows.len();
        Self {
            success: true,
            columns,
            rows,
            row_count,
            execution_time_ms,
            error_message: None,
        }
    }

    /// A failed result carrying the error text.
    pub fn failed(message: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            execution_time_ms,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Resolve a column name to its index once; reuse the index per row.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of a named column across all rows.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }
}

/// Interface to the graph-database service.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query with optional named parameters substituted into the
    /// text (see [`substitute_params`]).
    async fn execute(&self, query: &str, params: Option<&HashMap<String, Value>>) -> QueryResult;

    /// Whether the graph store currently answers queries.
    async fn check_connectivity(&self) -> bool;
}

/// Escape a string for inline single-quoted use in query text.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Literal `$name` substitution into query text.
///
/// String parameters are single-quoted with embedded quotes escaped;
/// everything else is stringified. This is textual replacement, not real
/// bind parameters: callers must not pass attacker-controlled strings
/// without validating them upstream.
pub fn substitute_params(query: &str, params: &HashMap<String, Value>) -> String {
    // Longest names first so $name does not clobber $name_longer.
    let mut names: Vec<&String> = params.keys().collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));

    let mut text = query.to_string();
    for name in names {
        let token = format!("${}", name);
        let rendered = match &params[name] {
            Value::String(s) => format!("'{}'", escape_string(s)),
            other => other.to_string(),
        };
        text = text.replace(&token, &rendered);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitute_string_is_quoted() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), json!("abc"));
        let text = substitute_params("MATCH (n {id: $id}) RETURN n", &params);
        assert_eq!(text, "MATCH (n {id: 'abc'}) RETURN n");
    }

    #[test]
    fn test_substitute_escapes_quotes() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), json!("O'Brien"));
        let text = substitute_params("SET n.name = $name", &params);
        assert_eq!(text, "SET n.name = 'O\\'Brien'");
    }

    #[test]
    fn test_substitute_non_strings_stringified() {
        let mut params = HashMap::new();
        params.insert("depth".to_string(), json!(3));
        params.insert("active".to_string(), json!(true));
        let text = substitute_params("WHERE d <= $depth AND a = $active", &params);
        assert_eq!(text, "WHERE d <= 3 AND a = true");
    }

    #[test]
    fn test_substitute_longest_name_first() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), json!("x"));
        params.insert("id_other".to_string(), json!("y"));
        let text = substitute_params("$id $id_other", &params);
        assert_eq!(text, "'x' 'y'");
    }

    #[test]
    fn test_column_index_and_values() {
        let result = QueryResult::ok(
            vec!["id".to_string(), "score".to_string()],
            vec![vec![json!("a"), json!(1)], vec![json!("b"), json!(2)]],
            5,
        );
        assert_eq!(result.column_index("score"), Some(1));
        assert_eq!(result.column_index("missing"), None);
        let ids: Vec<&Value> = result.column_values("id").collect();
        assert_eq!(ids, vec![&json!("a"), &json!("b")]);
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_failed_result_shape() {
        let result = QueryResult::failed("connection refused", 12);
        assert!(!result.success);
        assert_eq!(result.row_count, 0);
        assert_eq!(result.error_message.as_deref(), Some("connection refused"));
    }
}
