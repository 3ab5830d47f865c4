//! Entity-related database queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::params;

/// Entity row from database.
#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: String,
    pub entity_type: String,
    pub name: String,
    pub attributes: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

const ENTITY_COLUMNS: &str =
    "id, entity_type, name, attributes, is_active, created_at, updated_at";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntityRow> {
    Ok(EntityRow {
        id: row.get(0)?,
        entity_type: row.get(1)?,
        name: row.get(2)?,
        attributes: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Insert or update an entity by id.
pub fn upsert_entity(
    pool: &DbPool,
    id: &str,
    entity_type: &str,
    name: &str,
    attributes: &str,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO entities (id, entity_type, name, attributes)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 entity_type = excluded.entity_type,
                 name = excluded.name,
                 attributes = excluded.attributes,
                 updated_at = datetime('now')",
            params![id, entity_type, name, attributes],
        )?;
        Ok(())
    })
}

/// Get an entity by id, `None` when absent.
pub fn get_entity(pool: &DbPool, id: &str) -> DbResult<Option<EntityRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE id = ?1 AND is_active = 1"
        ))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    })
}

/// Get an entity by id, erroring when absent.
pub fn require_entity(pool: &DbPool, id: &str) -> DbResult<EntityRow> {
    get_entity(pool, id)?.ok_or_else(|| DbError::NotFound(format!("Entity: {}", id)))
}

/// List up to `limit` active entities, oldest first for stable snapshots.
pub fn list_entities(pool: &DbPool, limit: u32) -> DbResult<Vec<EntityRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities
             WHERE is_active = 1 ORDER BY created_at, id LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Count active entities.
pub fn count_entities(pool: &DbPool) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE is_active = 1",
            [],
            |row| row.get(0),
        )
        .map_err(DbError::from)
    })
}
