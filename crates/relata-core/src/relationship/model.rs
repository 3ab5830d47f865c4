//! Relationship and cardinality models.

use crate::error::{RelataError, RelataResult};
use relata_db::queries::relationships::RelationshipRow;
use serde::{Deserialize, Serialize};

/// Typed connection kinds between entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    ParentOf,
    ChildOf,
    HasOne,
    HasMany,
    BelongsTo,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::ParentOf => "PARENT_OF",
            RelationshipType::ChildOf => "CHILD_OF",
            RelationshipType::HasOne => "HAS_ONE",
            RelationshipType::HasMany => "HAS_MANY",
            RelationshipType::BelongsTo => "BELONGS_TO",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PARENT_OF" => Some(RelationshipType::ParentOf),
            "CHILD_OF" => Some(RelationshipType::ChildOf),
            "HAS_ONE" => Some(RelationshipType::HasOne),
            "HAS_MANY" => Some(RelationshipType::HasMany),
            "BELONGS_TO" => Some(RelationshipType::BelongsTo),
            _ => None,
        }
    }

    /// Cardinalities this relationship type may carry.
    pub fn compatible_cardinalities(&self) -> &'static [Cardinality] {
        match self {
            RelationshipType::HasOne => &[Cardinality::OneToOne],
            RelationshipType::HasMany => &[Cardinality::OneToMany, Cardinality::ManyToMany],
            RelationshipType::BelongsTo => &[Cardinality::OneToOne, Cardinality::OneToMany],
            RelationshipType::ParentOf | RelationshipType::ChildOf => {
                &[Cardinality::OneToOne, Cardinality::OneToMany]
            }
        }
    }
}

/// Cardinality constraint on a relationship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "ONE_TO_ONE",
            Cardinality::OneToMany => "ONE_TO_MANY",
            Cardinality::ManyToMany => "MANY_TO_MANY",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ONE_TO_ONE" => Some(Cardinality::OneToOne),
            "ONE_TO_MANY" => Some(Cardinality::OneToMany),
            "MANY_TO_MANY" => Some(Cardinality::ManyToMany),
            _ => None,
        }
    }
}

/// A directed, typed relationship between two entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
    pub cardinality: Cardinality,
    pub is_bidirectional: bool,
    pub is_active: bool,
    pub rules: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl Relationship {
    /// Build a domain relationship from a database row.
    pub fn from_row(row: RelationshipRow) -> RelataResult<Self> {
        let relationship_type = RelationshipType::from_str(&row.relationship_type)
            .ok_or_else(|| {
                RelataError::invalid_argument(format!(
                    "unknown relationship type '{}'",
                    row.relationship_type
                ))
            })?;
        let cardinality = Cardinality::from_str(&row.cardinality).ok_or_else(|| {
            RelataError::invalid_argument(format!("unknown cardinality '{}'", row.cardinality))
        })?;
        let rules = serde_json::from_str(&row.rules)?;

        Ok(Self {
            id: row.id,
            source_id: row.source_id,
            target_id: row.target_id,
            relationship_type,
            cardinality,
            is_bidirectional: row.is_bidirectional,
            is_active: row.is_active,
            rules,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Request to create a new relationship.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub is_bidirectional: bool,
    #[serde(default)]
    pub rules: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip() {
        for t in [
            RelationshipType::ParentOf,
            RelationshipType::ChildOf,
            RelationshipType::HasOne,
            RelationshipType::HasMany,
            RelationshipType::BelongsTo,
        ] {
            assert_eq!(RelationshipType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(RelationshipType::from_str("LINKS_TO"), None);
    }

    #[test]
    fn test_has_one_only_one_to_one() {
        assert_eq!(
            RelationshipType::HasOne.compatible_cardinalities(),
            &[Cardinality::OneToOne]
        );
        assert!(!RelationshipType::HasMany
            .compatible_cardinalities()
            .contains(&Cardinality::OneToOne));
    }
}
