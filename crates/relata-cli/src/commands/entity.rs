//! Entity CLI commands.
//!
//! Entities are owned by the wider platform; the surface here is just
//! enough to anchor relationships from the command line.

use crate::output;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use relata_db::DbPool;

#[derive(Subcommand)]
pub enum EntityCommands {
    /// Insert or update an entity
    Add {
        /// Entity ID
        id: String,

        /// Entity type label
        #[arg(long = "type", default_value = "Entity")]
        entity_type: String,

        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,

        /// Attributes as a JSON object
        #[arg(long, default_value = "{}")]
        attributes: String,
    },

    /// Show a single entity
    Show {
        /// Entity ID
        id: String,
    },

    /// List entities
    List {
        /// Maximum rows
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

pub fn execute(cmd: EntityCommands, pool: &DbPool) -> Result<()> {
    match cmd {
        EntityCommands::Add {
            id,
            entity_type,
            name,
            attributes,
        } => {
            let attrs: serde_json::Value =
                serde_json::from_str(&attributes).context("parsing --attributes as JSON")?;
            let name = name.unwrap_or_else(|| id.clone());
            let entity = relata_core::entity::upsert_entity(pool, &id, &entity_type, &name, &attrs)?;
            println!("{} {}", "Upserted".green().bold(), entity.id);
            Ok(())
        }
        EntityCommands::Show { id } => {
            match relata_core::entity::get_entity(pool, &id)? {
                Some(entity) => output::print_entity(&entity),
                None => println!("{}", "Entity not found.".dimmed()),
            }
            Ok(())
        }
        EntityCommands::List { limit } => {
            let entities = relata_core::entity::list_entities(pool, limit)?;
            output::print_entities_table(&entities);
            Ok(())
        }
    }
}
