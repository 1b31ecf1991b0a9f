//! SQL compilation of search expressions.
//!
//! - [`query_builder`] - top-level query assembly and pagination
//! - [`params`] - parameter binding and placeholder naming
//! - [`cte`] - common table expressions for chained predicates
//! - [`composite`] - composite component ordering and correlation
//! - [`schema`] - index table and column names
//!
//! The expression visitor itself is internal; [`QueryBuilder`] is the entry
//! point.

mod compiler;
pub mod composite;
pub mod cte;
pub mod params;
pub mod query_builder;
pub mod schema;

pub use composite::{ComponentStep, CompositeCursor};
pub use cte::{CteDefinition, CteRegistry};
pub use params::{ParameterBinder, SqlDbType, SqlParam, SqlParameterCollection};
pub use query_builder::{CompiledQuery, QueryBuilder};
