//! Relationship lifecycle CLI commands.

use crate::output;
use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use relata_core::relationship::{Cardinality, CreateRelationship, RelationshipType};
use relata_db::DbPool;

#[derive(Subcommand)]
pub enum RelCommands {
    /// Create a relationship between two entities
    Create {
        /// Source entity ID
        source: String,

        /// Target entity ID
        target: String,

        /// Relationship type (PARENT_OF, CHILD_OF, HAS_ONE, HAS_MANY, BELONGS_TO)
        #[arg(long = "type")]
        relationship_type: String,

        /// Cardinality (ONE_TO_ONE, ONE_TO_MANY, MANY_TO_MANY)
        #[arg(long)]
        cardinality: String,

        /// Mark the relationship as bidirectional
        #[arg(long)]
        bidirectional: bool,

        /// Validation rules as a JSON object
        #[arg(long)]
        rules: Option<String>,
    },

    /// Show a relationship by ID
    Show {
        /// Relationship ID
        id: String,
    },

    /// List active relationships
    List {
        /// Only relationships leaving this entity
        #[arg(long)]
        source: Option<String>,

        /// Only relationships entering this entity
        #[arg(long)]
        target: Option<String>,
    },

    /// Soft-delete a relationship
    Delete {
        /// Relationship ID
        id: String,
    },
}

pub fn execute(cmd: RelCommands, pool: &DbPool) -> Result<()> {
    match cmd {
        RelCommands::Create {
            source,
            target,
            relationship_type,
            cardinality,
            bidirectional,
            rules,
        } => {
            let relationship_type = RelationshipType::from_str(&relationship_type.to_uppercase())
                .ok_or_else(|| anyhow!("unknown relationship type: {relationship_type}"))?;
            let cardinality = Cardinality::from_str(&cardinality.to_uppercase())
                .ok_or_else(|| anyhow!("unknown cardinality: {cardinality}"))?;
            let rules = rules
                .map(|r| serde_json::from_str(&r).context("parsing --rules as JSON"))
                .transpose()?;

            let req = CreateRelationship {
                source_id: source,
                target_id: target,
                relationship_type,
                cardinality,
                is_bidirectional: bidirectional,
                rules,
            };
            let relationship = relata_core::relationship::create_relationship(pool, &req)?;

            println!("{} {}", "Created".green().bold(), relationship.id);
            output::print_relationship(&relationship);
            Ok(())
        }
        RelCommands::Show { id } => {
            let relationship = relata_core::relationship::get_relationship(pool, &id)?;
            output::print_relationship(&relationship);
            Ok(())
        }
        RelCommands::List { source, target } => {
            let relationships = match (source, target) {
                (Some(source), None) => relata_core::relationship::outgoing(pool, &source)?,
                (None, Some(target)) => relata_core::relationship::incoming(pool, &target)?,
                (None, None) => relata_core::relationship::list_relationships(pool)?,
                (Some(_), Some(_)) => {
                    return Err(anyhow!("--source and --target are mutually exclusive"))
                }
            };
            output::print_relationships_table(&relationships);
            Ok(())
        }
        RelCommands::Delete { id } => {
            relata_core::relationship::delete_relationship(pool, &id)?;
            println!("{} {}", "Deleted".yellow().bold(), id);
            Ok(())
        }
    }
}
