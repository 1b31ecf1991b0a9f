//! Helios SQL Search Compiler
//!
//! This crate compiles FHIR search expression trees into parameterized SQL
//! over a relational search index. The index stores each resource version in
//! a `Resource` table and one row per extracted search value in a per-type
//! index table (`TokenSearchParam`, `DateSearchParam`, ...). Resource types
//! and search parameters are referred to by compact `i16` ids resolved
//! through caller-supplied catalogs.
//!
//! # Features
//!
//! - **All value types**: number, date, string, token, reference, quantity, URI
//! - **Composite parameters**: per-component subqueries correlated on
//!   `CompositeCorrelationId`
//! - **Chained search**: nested predicates hoisted into common table expressions
//! - **Injection safety**: every literal is bound as a named parameter
//! - **Dialects**: SQL Server (`OFFSET`/`FETCH`) and SQLite (`LIMIT`/`OFFSET`)
//!
//! # Architecture
//!
//! - [`types`] - search parameter metadata and the expression tree
//! - [`catalog`] - compact id lookups
//! - [`config`] - dialect, schema and chain depth settings
//! - [`search`] - the compiler, CTE registry and parameter binding
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use helios_sql_search::types::{
//!     Expression, FieldName, SearchParamType, SearchParameterInfo, StringOperator,
//! };
//! use helios_sql_search::{QueryBuilder, QueryBuilderConfig};
//!
//! let resource_types: HashMap<String, i16> = HashMap::from([
//!     ("Observation".to_string(), 2),
//!     ("Patient".to_string(), 1),
//! ]);
//! let search_params: HashMap<(String, Option<u8>), i16> = HashMap::from([
//!     (("http://hl7.org/fhir/SearchParameter/Observation-subject".to_string(), None), 20),
//!     (("http://hl7.org/fhir/SearchParameter/individual-family".to_string(), None), 21),
//! ]);
//!
//! let subject = Arc::new(SearchParameterInfo::new(
//!     "subject",
//!     "http://hl7.org/fhir/SearchParameter/Observation-subject",
//!     SearchParamType::Reference,
//! ));
//! let family = Arc::new(SearchParameterInfo::new(
//!     "family",
//!     "http://hl7.org/fhir/SearchParameter/individual-family",
//!     SearchParamType::String,
//! ));
//!
//! // Observation?subject:Patient.family=Smith
//! let expression = Expression::chained(
//!     subject,
//!     "Patient",
//!     Expression::parameter(
//!         family,
//!         Expression::string(FieldName::String, StringOperator::StartsWith, "Smith"),
//!     ),
//! );
//!
//! let builder =
//!     QueryBuilder::new(&resource_types, &search_params).with_config(QueryBuilderConfig::sqlite());
//! let query = builder.build(Some(&expression), 20, 0).unwrap();
//!
//! assert!(query.sql.starts_with("WITH cte_subject_Patient_0(Id)"));
//! assert!(query.sql.ends_with("LIMIT @p6 OFFSET @p5\n"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod types;

// Re-export commonly used types at crate root
pub use catalog::{Catalogs, ResourceTypeCatalog, SearchParameterCatalog};
pub use config::{QueryBuilderConfig, SqlDialect};
pub use error::{SearchQueryError, SearchQueryResult};
pub use search::{
    CompiledQuery, CteRegistry, ParameterBinder, QueryBuilder, SqlDbType, SqlParam,
    SqlParameterCollection,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
