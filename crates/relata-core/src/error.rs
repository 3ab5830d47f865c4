//! Centralized error types for Relata.

use thiserror::Error;

/// Main error type for Relata operations.
#[derive(Error, Debug)]
pub enum RelataError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("Duplicate relationship: {source_id} -[{relationship_type}]-> {target_id} already exists")]
    DuplicateRelationship {
        source_id: String,
        target_id: String,
        relationship_type: String,
    },

    #[error("Self-referencing relationship: {0} cannot relate to itself")]
    SelfReference(String),

    #[error("Incompatible cardinality: {relationship_type} cannot be {cardinality}")]
    IncompatibleCardinality {
        relationship_type: String,
        cardinality: String,
    },

    #[error("Cardinality violation: {0}")]
    CardinalityViolation(String),

    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] relata_db::DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Relata operations.
pub type RelataResult<T> = Result<T, RelataError>;

impl RelataError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether this error is a conflict (duplicate, self-reference, or
    /// cardinality violation) as opposed to bad input or infrastructure.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRelationship { .. }
                | Self::SelfReference(_)
                | Self::CardinalityViolation(_)
        )
    }
}
