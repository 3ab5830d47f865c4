//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relata_db::DbPool;

pub mod entity;
pub mod graph;
pub mod rel;
pub mod traverse;

/// Relata - relationship graph engine
#[derive(Parser)]
#[command(name = "relata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the SQLite database file
    #[arg(long, global = true, env = "RELATA_DB", default_value = "relata.db")]
    pub db: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Entity lookups and upserts (relationship endpoints)
    #[command(subcommand)]
    Entity(entity::EntityCommands),

    /// Relationship lifecycle (create, inspect, soft-delete)
    #[command(subcommand)]
    Rel(rel::RelCommands),

    /// Traversal over the relational store
    #[command(subcommand)]
    Traverse(traverse::TraverseCommands),

    /// Graph-store projection: sync, traversal, analytics
    #[command(subcommand)]
    Graph(graph::GraphCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let pool = open_pool(&self.db)?;

        match self.command {
            Commands::Entity(cmd) => entity::execute(cmd, &pool),
            Commands::Rel(cmd) => rel::execute(cmd, &pool),
            Commands::Traverse(cmd) => traverse::execute(cmd, &pool),
            Commands::Graph(cmd) => graph::execute(cmd, &pool).await,
        }
    }
}

fn open_pool(path: &str) -> Result<DbPool> {
    relata_db::init_pool(path).with_context(|| format!("opening database at {path}"))
}
