//! Relational traversal CLI commands.
//!
//! These run directly against SQLite; no graph store involved.

use crate::output;
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use relata_db::DbPool;

#[derive(Subcommand)]
pub enum TraverseCommands {
    /// Breadth-first traversal over outgoing relationships
    Bfs {
        /// Start entity ID
        start: String,

        /// Depth bound (1..=1000)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Depth-first traversal over outgoing relationships
    Dfs {
        /// Start entity ID
        start: String,

        /// Depth bound (1..=1000)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Entities reachable by walking incoming relationships
    Ancestors {
        /// Entity ID
        id: String,

        /// Depth bound (1..=1000)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Entities reachable by walking outgoing relationships
    Descendants {
        /// Entity ID
        id: String,

        /// Depth bound (1..=1000)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// Minimum-hop path between two entities
    Path {
        /// Source entity ID
        source: String,

        /// Target entity ID
        target: String,

        /// Depth bound (1..=1000)
        #[arg(long, default_value_t = 50)]
        max_depth: usize,
    },

    /// Detect a directed cycle reachable from an entity
    Cycles {
        /// Start entity ID
        start: String,

        /// Depth bound (1..=1000)
        #[arg(long, default_value_t = 100)]
        max_depth: usize,
    },

    /// Bounded snapshot of entities and active relationships
    Structure {
        /// Node cap (1..=10000)
        #[arg(long, default_value_t = 500)]
        max_nodes: u32,
    },
}

pub fn execute(cmd: TraverseCommands, pool: &DbPool) -> Result<()> {
    match cmd {
        TraverseCommands::Bfs { start, max_depth } => {
            let nodes = relata_core::traversal::breadth_first_search(pool, &start, max_depth)?;
            println!("{} from {}", "BFS".bold(), start.cyan());
            output::print_traversal_nodes(&nodes);
        }
        TraverseCommands::Dfs { start, max_depth } => {
            let nodes = relata_core::traversal::depth_first_search(pool, &start, max_depth)?;
            println!("{} from {}", "DFS".bold(), start.cyan());
            output::print_traversal_nodes(&nodes);
        }
        TraverseCommands::Ancestors { id, max_depth } => {
            let nodes = relata_core::traversal::find_ancestors(pool, &id, max_depth)?;
            println!("{} of {}", "Ancestors".bold(), id.cyan());
            output::print_traversal_nodes(&nodes);
        }
        TraverseCommands::Descendants { id, max_depth } => {
            let nodes = relata_core::traversal::find_descendants(pool, &id, max_depth)?;
            println!("{} of {}", "Descendants".bold(), id.cyan());
            output::print_traversal_nodes(&nodes);
        }
        TraverseCommands::Path {
            source,
            target,
            max_depth,
        } => {
            let path =
                relata_core::traversal::find_shortest_path(pool, &source, &target, max_depth)?;
            output::print_shortest_path(path.as_ref());
        }
        TraverseCommands::Cycles { start, max_depth } => {
            let report =
                relata_core::traversal::detect_circular_references(pool, &start, max_depth)?;
            output::print_cycle_report(&report);
        }
        TraverseCommands::Structure { max_nodes } => {
            let structure = relata_core::traversal::get_graph_structure(pool, max_nodes)?;
            output::print_graph_structure(&structure);
        }
    }
    Ok(())
}
