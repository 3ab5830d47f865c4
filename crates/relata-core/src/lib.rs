//! Relata Core Library
//!
//! Domain models and business logic for the relationship graph: typed,
//! cardinality-constrained relationships over a relational store, plus the
//! traversal algorithms that operate directly on that store.

pub mod entity;
pub mod error;
pub mod relationship;
pub mod traversal;

pub use error::{RelataError, RelataResult};
