//! Domain model for referenced scientific artifacts.
//!
//! # Responsibility
//! - Define the in-memory shapes adapters decode into.
//! - Define the path reference persisted in database columns.
//!
//! # Invariants
//! - Model types never touch the filesystem.

pub mod array;
pub mod artifact;
pub mod mesh;
