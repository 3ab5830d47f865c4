//! Entity model and lookups.
//!
//! Entities are opaque nodes owned by the wider platform; this crate only
//! needs enough of them to anchor relationships and hydrate traversal
//! results.

use crate::error::{RelataError, RelataResult};
use relata_db::queries::entities as queries;
use relata_db::queries::entities::EntityRow;
use relata_db::DbPool;
use serde::{Deserialize, Serialize};

/// A node in the relationship graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    pub name: String,
    pub attributes: serde_json::Value,
}

impl Entity {
    pub fn from_row(row: EntityRow) -> RelataResult<Self> {
        let attributes = serde_json::from_str(&row.attributes)?;
        Ok(Self {
            id: row.id,
            entity_type: row.entity_type,
            name: row.name,
            attributes,
        })
    }
}

/// Insert or update an entity.
pub fn upsert_entity(
    pool: &DbPool,
    id: &str,
    entity_type: &str,
    name: &str,
    attributes: &serde_json::Value,
) -> RelataResult<Entity> {
    let attrs = serde_json::to_string(attributes)?;
    queries::upsert_entity(pool, id, entity_type, name, &attrs)?;
    require_entity(pool, id)
}

/// Get an entity by id, `None` when absent.
pub fn get_entity(pool: &DbPool, id: &str) -> RelataResult<Option<Entity>> {
    match queries::get_entity(pool, id)? {
        Some(row) => Ok(Some(Entity::from_row(row)?)),
        None => Ok(None),
    }
}

/// Get an entity by id, erroring when absent.
pub fn require_entity(pool: &DbPool, id: &str) -> RelataResult<Entity> {
    get_entity(pool, id)?.ok_or_else(|| RelataError::EntityNotFound(id.to_string()))
}

/// List up to `limit` active entities.
pub fn list_entities(pool: &DbPool, limit: u32) -> RelataResult<Vec<Entity>> {
    let rows = queries::list_entities(pool, limit)?;
    rows.into_iter().map(Entity::from_row).collect()
}
