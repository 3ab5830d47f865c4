//! Relationship lifecycle: creation with invariant validation, lookup,
//! listing, and soft deletion.
//!
//! The invariants enforced here are the source-of-truth guarantees the
//! rest of the system (traversal, graph sync) relies on:
//!
//! - no self-loops
//! - relationship type and cardinality must be a compatible pair
//! - at most one active relationship per (source, target, type) triple
//! - `HAS_ONE` / `ONE_TO_ONE` exclusivity across either endpoint

pub mod model;

use crate::entity;
use crate::error::{RelataError, RelataResult};
use relata_db::queries::relationships as queries;
use relata_db::DbPool;
use tracing::debug;
use uuid::Uuid;

pub use model::{Cardinality, CreateRelationship, Relationship, RelationshipType};

/// Create a relationship after validating every graph invariant.
pub fn create_relationship(pool: &DbPool, req: &CreateRelationship) -> RelataResult<Relationship> {
    validate(pool, req)?;

    let id = Uuid::new_v4().to_string();
    let rules = req
        .rules
        .clone()
        .unwrap_or_else(|| serde_json::json!({}));

    queries::insert_relationship(
        pool,
        &id,
        &req.source_id,
        &req.target_id,
        req.relationship_type.as_str(),
        req.cardinality.as_str(),
        req.is_bidirectional,
        &serde_json::to_string(&rules)?,
    )?;

    debug!(
        source = %req.source_id,
        target = %req.target_id,
        relationship_type = req.relationship_type.as_str(),
        "Relationship created"
    );

    get_relationship(pool, &id)
}

/// Get a relationship by id (active or soft-deleted).
pub fn get_relationship(pool: &DbPool, id: &str) -> RelataResult<Relationship> {
    let row = queries::get_relationship(pool, id).map_err(|e| match e {
        relata_db::DbError::NotFound(_) => RelataError::RelationshipNotFound(id.to_string()),
        e => RelataError::Database(e),
    })?;
    Relationship::from_row(row)
}

/// List all active relationships.
pub fn list_relationships(pool: &DbPool) -> RelataResult<Vec<Relationship>> {
    let rows = queries::list_active(pool)?;
    rows.into_iter().map(Relationship::from_row).collect()
}

/// Active relationships leaving `source_id`.
pub fn outgoing(pool: &DbPool, source_id: &str) -> RelataResult<Vec<Relationship>> {
    let rows = queries::find_active_by_source(pool, source_id)?;
    rows.into_iter().map(Relationship::from_row).collect()
}

/// Active relationships arriving at `target_id`.
pub fn incoming(pool: &DbPool, target_id: &str) -> RelataResult<Vec<Relationship>> {
    let rows = queries::find_active_by_target(pool, target_id)?;
    rows.into_iter().map(Relationship::from_row).collect()
}

/// Soft-delete a relationship; the row is kept for audit.
pub fn delete_relationship(pool: &DbPool, id: &str) -> RelataResult<()> {
    queries::soft_delete(pool, id).map_err(|e| match e {
        relata_db::DbError::NotFound(_) => RelataError::RelationshipNotFound(id.to_string()),
        e => RelataError::Database(e),
    })
}

fn validate(pool: &DbPool, req: &CreateRelationship) -> RelataResult<()> {
    if req.source_id == req.target_id {
        return Err(RelataError::SelfReference(req.source_id.clone()));
    }

    if !req
        .relationship_type
        .compatible_cardinalities()
        .contains(&req.cardinality)
    {
        return Err(RelataError::IncompatibleCardinality {
            relationship_type: req.relationship_type.as_str().to_string(),
            cardinality: req.cardinality.as_str().to_string(),
        });
    }

    entity::require_entity(pool, &req.source_id)?;
    entity::require_entity(pool, &req.target_id)?;

    if queries::active_triple_exists(
        pool,
        &req.source_id,
        &req.target_id,
        req.relationship_type.as_str(),
    )? {
        return Err(RelataError::DuplicateRelationship {
            source_id: req.source_id.clone(),
            target_id: req.target_id.clone(),
            relationship_type: req.relationship_type.as_str().to_string(),
        });
    }

    // ONE_TO_ONE (and therefore HAS_ONE) edges are exclusive: no other
    // active edge of the same type may touch either endpoint.
    if req.cardinality == Cardinality::OneToOne
        || req.relationship_type == RelationshipType::HasOne
    {
        for endpoint in [&req.source_id, &req.target_id] {
            let touching =
                queries::count_active_touching(pool, endpoint, req.relationship_type.as_str())?;
            if touching > 0 {
                return Err(RelataError::CardinalityViolation(format!(
                    "entity {} already has an active {} relationship",
                    endpoint,
                    req.relationship_type.as_str()
                )));
            }
        }
    }

    Ok(())
}
