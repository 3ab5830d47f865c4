//! Row-level query helpers for the relationship graph tables.

pub mod entities;
pub mod relationships;
