//! Test infrastructure for the search compiler.
//!
//! Provides the catalog fixtures and an in-memory SQLite index that compiled
//! queries can be executed against.

#![allow(dead_code)]

pub mod database;
pub mod fixtures;

pub use database::*;
pub use fixtures::*;
