//! Relata Database Layer
//!
//! SQLite-backed persistence for entities and relationships. This crate is
//! the single source of truth for the relationship graph; the Neo4j
//! projection in `relata-graph` is derived from it and never authoritative.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult};

/// Open a pool at the given path and bring the schema up to date.
pub fn init_pool(path: &str) -> DbResult<DbPool> {
    let pool = DbPool::open(path)?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}

/// Open an in-memory pool with the schema applied. Used by tests and demos.
pub fn init_pool_in_memory() -> DbResult<DbPool> {
    let pool = DbPool::in_memory()?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
