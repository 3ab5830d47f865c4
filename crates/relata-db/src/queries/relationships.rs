//! Relationship-related database queries.
//!
//! Every read here is filtered to `is_active = 1`; soft-deleted rows stay
//! in the table for audit but never reach traversal.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::params;

/// Relationship row from database.
#[derive(Debug, Clone)]
pub struct RelationshipRow {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
    pub cardinality: String,
    pub is_bidirectional: bool,
    pub is_active: bool,
    pub rules: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

const REL_COLUMNS: &str = "id, source_id, target_id, relationship_type, cardinality, \
     is_bidirectional, is_active, rules, created_at, updated_at, deleted_at";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RelationshipRow> {
    Ok(RelationshipRow {
        id: row.get(0)?,
        source_id: row.get(1)?,
        target_id: row.get(2)?,
        relationship_type: row.get(3)?,
        cardinality: row.get(4)?,
        is_bidirectional: row.get(5)?,
        is_active: row.get(6)?,
        rules: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        deleted_at: row.get(10)?,
    })
}

/// Insert a new relationship row.
#[allow(clippy::too_many_arguments)]
pub fn insert_relationship(
    pool: &DbPool,
    id: &str,
    source_id: &str,
    target_id: &str,
    relationship_type: &str,
    cardinality: &str,
    is_bidirectional: bool,
    rules: &str,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO relationships
                 (id, source_id, target_id, relationship_type, cardinality,
                  is_bidirectional, rules)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                source_id,
                target_id,
                relationship_type,
                cardinality,
                is_bidirectional,
                rules
            ],
        )?;
        Ok(())
    })
}

/// Get a relationship by id (active or soft-deleted).
pub fn get_relationship(pool: &DbPool, id: &str) -> DbResult<RelationshipRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {REL_COLUMNS} FROM relationships WHERE id = ?1"),
            params![id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("Relationship: {}", id))
            }
            e => DbError::Connection(e),
        })
    })
}

/// Active relationships whose source is the given entity (outgoing edges).
pub fn find_active_by_source(pool: &DbPool, source_id: &str) -> DbResult<Vec<RelationshipRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {REL_COLUMNS} FROM relationships
             WHERE source_id = ?1 AND is_active = 1
             ORDER BY created_at, rowid"
        ))?;
        let rows = stmt.query_map(params![source_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Active relationships whose target is the given entity (incoming edges).
pub fn find_active_by_target(pool: &DbPool, target_id: &str) -> DbResult<Vec<RelationshipRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {REL_COLUMNS} FROM relationships
             WHERE target_id = ?1 AND is_active = 1
             ORDER BY created_at, rowid"
        ))?;
        let rows = stmt.query_map(params![target_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// All active relationships, for sync and bulk snapshots.
pub fn list_active(pool: &DbPool) -> DbResult<Vec<RelationshipRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {REL_COLUMNS} FROM relationships
             WHERE is_active = 1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt.query_map([], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Whether an active relationship already exists for the exact
/// (source, target, type) triple.
pub fn active_triple_exists(
    pool: &DbPool,
    source_id: &str,
    target_id: &str,
    relationship_type: &str,
) -> DbResult<bool> {
    pool.with_conn(|conn| {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM relationships
             WHERE source_id = ?1 AND target_id = ?2
               AND relationship_type = ?3 AND is_active = 1",
            params![source_id, target_id, relationship_type],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    })
}

/// Count active relationships of a given type touching an entity on either
/// endpoint. Used to enforce HAS_ONE / ONE_TO_ONE exclusivity.
pub fn count_active_touching(
    pool: &DbPool,
    entity_id: &str,
    relationship_type: &str,
) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM relationships
             WHERE (source_id = ?1 OR target_id = ?1)
               AND relationship_type = ?2 AND is_active = 1",
            params![entity_id, relationship_type],
            |row| row.get(0),
        )
        .map_err(DbError::from)
    })
}

/// Count active relationships.
pub fn count_active(pool: &DbPool) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM relationships WHERE is_active = 1",
            [],
            |row| row.get(0),
        )
        .map_err(DbError::from)
    })
}

/// Soft-delete a relationship: deactivate and stamp `deleted_at`.
pub fn soft_delete(pool: &DbPool, id: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE relationships
             SET is_active = 0,
                 deleted_at = datetime('now'),
                 updated_at = datetime('now')
             WHERE id = ?1 AND is_active = 1",
            params![id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Relationship: {}", id)));
        }
        Ok(())
    })
}
