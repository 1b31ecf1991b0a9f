//! Query builder configuration.
//!
//! # Example
//!
//! ```
//! use helios_sql_search::{QueryBuilderConfig, SqlDialect};
//!
//! // SQL Server with the default `dbo` schema
//! let config = QueryBuilderConfig::default();
//! assert_eq!(config.dialect, SqlDialect::SqlServer);
//! assert_eq!(config.qualify("Resource"), "dbo.Resource");
//!
//! // SQLite, unqualified table names
//! let config = QueryBuilderConfig::sqlite();
//! assert_eq!(config.qualify("Resource"), "Resource");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SearchQueryError, SearchQueryResult};

/// SQL dialect of the generated query.
///
/// Both dialects support common table expressions; they differ in how the
/// page window is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// `OFFSET n ROWS FETCH NEXT m ROWS ONLY`.
    #[default]
    SqlServer,
    /// `LIMIT m OFFSET n`.
    Sqlite,
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::SqlServer => write!(f, "sqlserver"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Configuration for [`QueryBuilder`](crate::QueryBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBuilderConfig {
    /// Dialect used for the page window clause.
    #[serde(default)]
    pub dialect: SqlDialect,

    /// Schema qualifying every table name. `None` emits bare table names.
    #[serde(default = "default_schema")]
    pub schema: Option<String>,

    /// Maximum nesting of chained predicates. `None` leaves chains unbounded.
    #[serde(default)]
    pub max_chain_depth: Option<usize>,
}

fn default_schema() -> Option<String> {
    Some("dbo".to_string())
}

impl Default for QueryBuilderConfig {
    fn default() -> Self {
        Self {
            dialect: SqlDialect::default(),
            schema: default_schema(),
            max_chain_depth: None,
        }
    }
}

impl QueryBuilderConfig {
    /// Configuration for an SQLite store with unqualified table names.
    pub fn sqlite() -> Self {
        Self {
            dialect: SqlDialect::Sqlite,
            schema: None,
            max_chain_depth: None,
        }
    }

    /// Sets the maximum chain depth.
    pub fn with_max_chain_depth(mut self, max: usize) -> Self {
        self.max_chain_depth = Some(max);
        self
    }

    /// Qualifies `table` with the configured schema.
    pub fn qualify(&self, table: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, table),
            None => table.to_string(),
        }
    }

    /// Validates the configuration.
    ///
    /// The schema is written into SQL text, so it must be a plain identifier.
    pub fn validate(&self) -> SearchQueryResult<()> {
        if let Some(schema) = &self.schema {
            let valid = !schema.is_empty()
                && !schema.starts_with(|c: char| c.is_ascii_digit())
                && schema.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(SearchQueryError::InvalidConfiguration {
                    message: format!("schema '{}' is not a plain identifier", schema),
                });
            }
        }
        Ok(())
    }
}
