//! Relata CLI - relationship graph engine.
//!
//! Relational source of truth in SQLite, projected into Neo4j for
//! graph-native traversal and analytics.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::Cli;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "relata=debug,relata_core=debug,relata_graph=debug"
    } else {
        "relata=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute().await
}
