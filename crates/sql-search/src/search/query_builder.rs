//! Top-level search query assembly.
//!
//! [`QueryBuilder`] compiles an optional expression into a complete paged
//! `SELECT` over the resource table:
//!
//! ```text
//! WITH <chained CTEs, dependencies first>
//! SELECT r.ResourceTypePK, r.Id, r.Version, r.LastUpdated, r.RawResource
//! FROM Resource r
//! WHERE <predicate> AND <latest version only>
//! ORDER BY r.ResourcePK
//! <page window>
//! ```

use crate::catalog::{Catalogs, ResourceTypeCatalog, SearchParameterCatalog};
use crate::config::{QueryBuilderConfig, SqlDialect};
use crate::error::{SearchQueryError, SearchQueryResult};
use crate::types::{Expression, Literal};

use super::compiler::{ExpressionCompiler, write_latest_version_filter};
use super::cte::CteRegistry;
use super::params::{ParameterBinder, SqlParameterCollection};
use super::schema::RESOURCE_TABLE;

/// Columns returned for every matching resource.
const SELECT_COLUMNS: &str = "r.ResourceTypePK, r.Id, r.Version, r.LastUpdated, r.RawResource";

/// A compiled search query and its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// SQL text with named placeholders.
    pub sql: String,
    /// Values for every placeholder in `sql`, in binding order.
    pub parameters: SqlParameterCollection,
}

/// Compiles search expressions into paged SQL queries.
///
/// A builder only borrows the catalogs and holds no per-query state, so one
/// instance can serve any number of compiles.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// use helios_sql_search::QueryBuilder;
/// use helios_sql_search::types::{Expression, FieldName, SearchParamType, SearchParameterInfo};
///
/// let resource_types: HashMap<String, i16> = HashMap::from([("Observation".to_string(), 2)]);
/// let search_params: HashMap<(String, Option<u8>), i16> = HashMap::from([(
///     ("http://hl7.org/fhir/SearchParameter/clinical-code".to_string(), None),
///     7,
/// )]);
///
/// let code = Arc::new(SearchParameterInfo::new(
///     "code",
///     "http://hl7.org/fhir/SearchParameter/clinical-code",
///     SearchParamType::Token,
/// ));
/// let expression = Expression::parameter(code, Expression::eq(FieldName::TokenCode, "8480-6"));
///
/// let builder = QueryBuilder::new(&resource_types, &search_params);
/// let query = builder.build(Some(&expression), 10, 0).unwrap();
///
/// assert!(query.sql.contains("i.Code = @p0"));
/// assert!(!query.sql.contains("8480-6"));
/// assert_eq!(query.parameters.len(), 4);
/// ```
pub struct QueryBuilder<'a> {
    catalogs: Catalogs<'a>,
    config: QueryBuilderConfig,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder with the default (SQL Server) configuration.
    pub fn new(
        resource_types: &'a dyn ResourceTypeCatalog,
        search_parameters: &'a dyn SearchParameterCatalog,
    ) -> Self {
        Self {
            catalogs: Catalogs::new(resource_types, search_parameters),
            config: QueryBuilderConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: QueryBuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &QueryBuilderConfig {
        &self.config
    }

    /// Compiles a page of the search.
    ///
    /// `page_number` is 0-based; the page starts at row
    /// `page_number * page_size`. With no expression the query returns every
    /// resource's latest version.
    pub fn build(
        &self,
        expression: Option<&Expression>,
        page_size: u32,
        page_number: u32,
    ) -> SearchQueryResult<CompiledQuery> {
        let mut parameters = SqlParameterCollection::new();
        let sql = self.build_with_binder(expression, page_size, page_number, &mut parameters)?;
        tracing::trace!(parameters = parameters.len(), "bound search query parameters");
        Ok(CompiledQuery { sql, parameters })
    }

    /// Compiles a page of the search, binding values through `binder`.
    ///
    /// Values are bound in text order except that an index subquery's
    /// predicate binds before its search parameter id; the page offset and
    /// size are always the last two values bound.
    pub fn build_with_binder(
        &self,
        expression: Option<&Expression>,
        page_size: u32,
        page_number: u32,
        binder: &mut dyn ParameterBinder,
    ) -> SearchQueryResult<String> {
        self.config.validate()?;
        let offset = i64::from(page_number)
            .checked_mul(i64::from(page_size))
            .ok_or(SearchQueryError::PaginationOverflow {
                page_number,
                page_size,
            })?;

        let mut ctes = CteRegistry::new();
        let mut predicate = String::new();
        if let Some(expression) = expression {
            let mut compiler =
                ExpressionCompiler::new(self.catalogs, &self.config, &mut *binder, &mut ctes);
            compiler.compile_root(expression, &mut predicate)?;

            if !predicate.ends_with(char::is_whitespace) {
                predicate.push('\n');
            }
            predicate.push_str("AND ");
        }

        let mut sql = String::new();
        ctes.write_preamble(&mut sql);
        sql.push_str(&format!(
            "SELECT {}\nFROM {} r\nWHERE ",
            SELECT_COLUMNS,
            self.config.qualify(RESOURCE_TABLE)
        ));
        sql.push_str(&predicate);
        write_latest_version_filter(&self.config, &mut sql);
        sql.push_str("ORDER BY r.ResourcePK\n");
        self.write_page_window(offset, page_size, binder, &mut sql);

        tracing::debug!(
            dialect = %self.config.dialect,
            ctes = ctes.len(),
            page_size,
            page_number,
            "compiled search query"
        );

        Ok(sql)
    }

    fn write_page_window(
        &self,
        offset: i64,
        page_size: u32,
        binder: &mut dyn ParameterBinder,
        out: &mut String,
    ) {
        let offset = binder.bind(Literal::Integer(offset), None);
        let size = binder.bind(Literal::Integer(i64::from(page_size)), None);

        match self.config.dialect {
            SqlDialect::SqlServer => out.push_str(&format!(
                "OFFSET {} ROWS\nFETCH NEXT {} ROWS ONLY\n",
                offset, size
            )),
            SqlDialect::Sqlite => out.push_str(&format!("LIMIT {} OFFSET {}\n", size, offset)),
        }
    }
}
