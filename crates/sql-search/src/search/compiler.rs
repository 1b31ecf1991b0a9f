//! Expression tree to SQL predicate compiler.
//!
//! [`ExpressionCompiler`] walks an [`Expression`] depth-first and appends SQL
//! to a buffer. What a field predicate refers to (which index table, which
//! alias) is carried in a [`Scope`] passed by value down the recursion, so
//! entering a parameter or composite component never mutates shared state.
//!
//! The only state shared between the top-level compiler and the nested
//! compilers spawned for chained predicates is the [`CteRegistry`] and the
//! [`ParameterBinder`], both borrowed mutably for the duration of a compile.

use std::fmt;

use crate::catalog::Catalogs;
use crate::config::QueryBuilderConfig;
use crate::error::{SearchQueryError, SearchQueryResult};
use crate::types::{
    BinaryOperator, Expression, FieldName, GroupOperator, Literal, SearchParamType,
    SearchParameterInfo, StringOperator,
};

use super::composite::CompositeCursor;
use super::cte::CteRegistry;
use super::params::{ParameterBinder, SqlDbType};
use super::schema::{self, CORRELATION_COLUMN, RESOURCE_TABLE, TOKEN_TEXT_TABLE, URI_TABLE};

/// Table alias of the subquery being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Alias {
    /// The resource row of the enclosing query (`r`).
    Resource,
    /// A parameter's index row (`i`).
    Index,
    /// Composite component `n` (`c{n}`).
    Component(u8),
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alias::Resource => write!(f, "r"),
            Alias::Index => write!(f, "i"),
            Alias::Component(index) => write!(f, "c{}", index),
        }
    }
}

/// Builder context for one level of the recursion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'e> {
    /// The parameter in scope; for a composite component, the composite itself.
    parameter: Option<&'e SearchParameterInfo>,
    /// The type whose index table and columns field predicates address.
    param_type: Option<SearchParamType>,
    alias: Alias,
}

impl<'e> Scope<'e> {
    /// Scope outside any parameter: the resource row.
    pub(crate) fn root() -> Self {
        Self {
            parameter: None,
            param_type: None,
            alias: Alias::Resource,
        }
    }

    fn parameter(parameter: &'e SearchParameterInfo) -> Self {
        Self {
            parameter: Some(parameter),
            param_type: Some(parameter.param_type),
            alias: Alias::Index,
        }
    }

    fn component(
        composite: &'e SearchParameterInfo,
        component_index: u8,
        param_type: SearchParamType,
    ) -> Self {
        Self {
            parameter: Some(composite),
            param_type: Some(param_type),
            alias: Alias::Component(component_index),
        }
    }

    fn is_resource_type(&self) -> bool {
        self.parameter.is_some_and(|p| p.is_resource_type())
    }

    fn composite_parent(&self) -> Option<&'e SearchParameterInfo> {
        match (self.parameter, self.param_type) {
            (Some(parameter), Some(SearchParamType::Composite)) => Some(parameter),
            _ => None,
        }
    }

    fn scoped_type(&self, field: FieldName) -> SearchQueryResult<SearchParamType> {
        self.param_type
            .ok_or_else(|| SearchQueryError::UnsupportedExpression {
                message: format!("field {} used outside a search parameter", field),
            })
    }

    fn column(&self, field: FieldName) -> SearchQueryResult<&'static str> {
        schema::column_name(self.scoped_type(field)?, field)
    }

    fn table(&self) -> SearchQueryResult<&'static str> {
        let param_type = self
            .param_type
            .ok_or_else(|| SearchQueryError::UnsupportedExpression {
                message: "index subquery outside a search parameter".to_string(),
            })?;
        schema::index_table(param_type)
    }
}

/// Writes the predicate keeping only the latest version of each resource `r`.
pub(crate) fn write_latest_version_filter(config: &QueryBuilderConfig, out: &mut String) {
    out.push_str(&format!(
        "NOT EXISTS (\nSELECT *\nFROM {} r2\nWHERE r2.ResourcePK = r.ResourcePK\nAND r2.Version > r.Version\n)\n",
        config.qualify(RESOURCE_TABLE)
    ));
}

/// Recursive visitor rendering expressions as SQL predicates over `r`.
pub(crate) struct ExpressionCompiler<'c, 'm> {
    catalogs: Catalogs<'c>,
    config: &'c QueryBuilderConfig,
    binder: &'m mut dyn ParameterBinder,
    ctes: &'m mut CteRegistry,
    /// One cursor per composite parameter currently being rendered.
    composites: Vec<CompositeCursor>,
    chain_depth: usize,
}

impl<'c, 'm> ExpressionCompiler<'c, 'm> {
    pub(crate) fn new(
        catalogs: Catalogs<'c>,
        config: &'c QueryBuilderConfig,
        binder: &'m mut dyn ParameterBinder,
        ctes: &'m mut CteRegistry,
    ) -> Self {
        Self {
            catalogs,
            config,
            binder,
            ctes,
            composites: Vec::new(),
            chain_depth: 0,
        }
    }

    /// A compiler for a chained predicate's body, sharing the registry and binder.
    fn nested(&mut self) -> ExpressionCompiler<'c, '_> {
        ExpressionCompiler {
            catalogs: self.catalogs,
            config: self.config,
            binder: &mut *self.binder,
            ctes: &mut *self.ctes,
            composites: Vec::new(),
            chain_depth: self.chain_depth + 1,
        }
    }

    /// Compiles a root expression evaluated against the resource row `r`.
    pub(crate) fn compile_root(
        &mut self,
        expression: &Expression,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        self.compile(expression, Scope::root(), out)
    }

    fn compile<'e>(
        &mut self,
        expression: &'e Expression,
        scope: Scope<'e>,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        match expression {
            Expression::Parameter {
                parameter,
                expression,
            } => self.compile_parameter(parameter, expression, out),
            Expression::CompositeComponent {
                component_index,
                expression,
            } => self.compile_component(*component_index, expression, scope, out),
            Expression::Comparison {
                field,
                operator,
                value,
            } => self.compile_comparison(*field, *operator, value, scope, out),
            Expression::StringMatch {
                field,
                operator,
                value,
            } => self.compile_string(*field, *operator, value, scope, out),
            Expression::MissingField { field } => {
                let column = scope.column(*field)?;
                out.push_str(&format!("{}.{} IS NULL", scope.alias, column));
                Ok(())
            }
            Expression::MissingParameter {
                parameter,
                is_missing,
            } => self.compile_missing_parameter(parameter, *is_missing, out),
            Expression::Chained {
                parameter,
                target_resource_type,
                expression,
            } => self.compile_chained(parameter, target_resource_type, expression, out),
            Expression::Group {
                operator,
                expressions,
            } => self.compile_group(*operator, expressions, scope, out),
        }
    }

    fn compile_parameter<'e>(
        &mut self,
        parameter: &'e SearchParameterInfo,
        inner: &'e Expression,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        let scope = Scope::parameter(parameter);

        if parameter.is_resource_type() {
            self.compile(inner, scope, out)?;
        } else if parameter.is_composite() {
            // Components open and close their own subqueries.
            self.composites.push(CompositeCursor::new(parameter));
            let result = self.compile(inner, scope, out);
            let cursor = self.composites.pop();
            result?;
            if let Some(cursor) = cursor {
                cursor.finish()?;
            }
        } else {
            let search_param_id = self.catalogs.search_parameter_id(&parameter.url, None)?;
            self.write_exists(scope, search_param_id, Some(inner), true, out)?;
        }

        out.push('\n');
        Ok(())
    }

    fn compile_component<'e>(
        &mut self,
        component_index: u8,
        inner: &'e Expression,
        scope: Scope<'e>,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        let outside = SearchQueryError::CompositeComponentOutsideComposite { component_index };
        let composite = scope.composite_parent().ok_or_else(|| outside.clone())?;
        let cursor = self.composites.last_mut().ok_or(outside)?;
        let step = cursor.enter(component_index)?;

        let component = composite.component(component_index).ok_or_else(|| {
            SearchQueryError::CompositeComponentOutOfRange {
                parameter: composite.name.clone(),
                component_index,
                component_count: composite.components.len(),
            }
        })?;
        let search_param_id = self
            .catalogs
            .search_parameter_id(&composite.url, Some(component_index))?;

        let component_scope = Scope::component(composite, component_index, component.param_type);
        self.write_exists(component_scope, search_param_id, Some(inner), false, out)?;

        if step.correlate {
            out.push_str(&format!(
                " AND {first}.{column} = {alias}.{column}\n)\n",
                first = Alias::Component(0),
                alias = component_scope.alias,
                column = CORRELATION_COLUMN,
            ));
        }
        if step.close_group {
            out.push_str(")\n");
        }
        Ok(())
    }

    fn compile_comparison(
        &mut self,
        field: FieldName,
        operator: BinaryOperator,
        value: &Literal,
        scope: Scope<'_>,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        if scope.is_resource_type() {
            if operator != BinaryOperator::Equal {
                return Err(SearchQueryError::UnsupportedOperator {
                    operator: operator.to_string(),
                    field,
                });
            }
            let resource_type =
                value
                    .as_str()
                    .ok_or_else(|| SearchQueryError::UnsupportedExpression {
                        message: format!("resource type comparison against {}", value),
                    })?;
            return self.write_resource_type(resource_type, out);
        }

        let column = scope.column(field)?;
        let placeholder = self.binder.bind(value.clone(), None);
        out.push_str(&format!(
            "{}.{} {} {}",
            scope.alias,
            column,
            operator.sql(),
            placeholder
        ));
        Ok(())
    }

    fn compile_string(
        &mut self,
        field: FieldName,
        operator: StringOperator,
        value: &str,
        scope: Scope<'_>,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        let unsupported = || SearchQueryError::UnsupportedOperator {
            operator: operator.to_string(),
            field,
        };

        if scope.is_resource_type() {
            if operator != StringOperator::Equals {
                return Err(unsupported());
            }
            return self.write_resource_type(value, out);
        }

        let column = scope.column(field)?;
        let alias = scope.alias;

        match field {
            FieldName::TokenText => {
                if operator.is_negated() {
                    return Err(unsupported());
                }
                let text_alias = format!("{}t", alias);
                let placeholder = self
                    .binder
                    .bind(Literal::String(format!("%{}%", value)), None);
                out.push_str(&format!(
                    "EXISTS (\nSELECT *\nFROM {table} {text_alias}\nWHERE {alias}.{column} = {text_alias}.Hash\nAND {text_alias}.Text LIKE {placeholder}\n)\n",
                    table = self.config.qualify(TOKEN_TEXT_TABLE),
                ));
                return Ok(());
            }
            FieldName::ReferenceBaseUri => {
                if operator != StringOperator::Equals {
                    return Err(unsupported());
                }
                let uri_alias = format!("{}u", alias);
                let placeholder = self.binder.bind(Literal::from(value), None);
                out.push_str(&format!(
                    "EXISTS (\nSELECT *\nFROM {table} {uri_alias}\nWHERE {alias}.{column} = {uri_alias}.UriPK\nAND {uri_alias}.Uri = {placeholder}\n)\n",
                    table = self.config.qualify(URI_TABLE),
                ));
                return Ok(());
            }
            _ => {}
        }

        match operator.like_pattern(value) {
            None => {
                let placeholder = match field {
                    FieldName::ReferenceResourceType => {
                        let type_id = self.catalogs.resource_type_id(value)?;
                        self.bind_compact_id(type_id)
                    }
                    FieldName::ReferenceResourceId => self
                        .binder
                        .bind(Literal::from(value), Some(SqlDbType::VarChar)),
                    _ => self.binder.bind(Literal::from(value), None),
                };
                out.push_str(&format!("{}.{} = {}\n", alias, column, placeholder));
            }
            Some(pattern) => {
                let placeholder = self.binder.bind(Literal::String(pattern), None);
                let not = if operator.is_negated() { "NOT " } else { "" };
                out.push_str(&format!("{}.{} {}LIKE {}", alias, column, not, placeholder));
            }
        }
        Ok(())
    }

    fn compile_missing_parameter(
        &mut self,
        parameter: &SearchParameterInfo,
        is_missing: bool,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        let scope = Scope::parameter(parameter);
        let search_param_id = self.catalogs.search_parameter_id(&parameter.url, None)?;

        if is_missing {
            out.push_str(" NOT");
        }
        self.write_exists(scope, search_param_id, None, true, out)
    }

    fn compile_group<'e>(
        &mut self,
        operator: GroupOperator,
        expressions: &'e [Expression],
        scope: Scope<'e>,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        if expressions.is_empty() {
            out.push_str(match operator {
                GroupOperator::And => "1 = 1",
                GroupOperator::Or => "1 = 0",
            });
            return Ok(());
        }

        if operator == GroupOperator::Or {
            out.push('(');
        }

        for (i, expression) in expressions.iter().enumerate() {
            if i > 0 {
                if !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(operator.keyword());
                out.push(' ');
            }
            self.compile(expression, scope, out)?;
        }

        if operator == GroupOperator::Or {
            out.push(')');
        }
        Ok(())
    }

    fn compile_chained(
        &mut self,
        parameter: &SearchParameterInfo,
        target_resource_type: &str,
        inner: &Expression,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        if parameter.param_type != SearchParamType::Reference {
            return Err(SearchQueryError::UnsupportedExpression {
                message: format!(
                    "chained search through {} parameter {}",
                    parameter.param_type, parameter.name
                ),
            });
        }

        let depth = self.chain_depth + 1;
        if let Some(max) = self.config.max_chain_depth {
            if depth > max {
                return Err(SearchQueryError::ChainDepthExceeded { depth, max });
            }
        }

        let search_param_id = self.catalogs.search_parameter_id(&parameter.url, None)?;
        let target_type_id = self.catalogs.resource_type_id(target_resource_type)?;

        let (slot, cte_name) = self.ctes.reserve(&parameter.name, target_resource_type);
        tracing::trace!(cte = %cte_name, depth, "registered chained search CTE");

        let type_placeholder = self.bind_compact_id(target_type_id);
        let mut body = format!(
            "SELECT Id FROM {} r\nWHERE r.ResourceTypePK = {}\nAND ",
            self.config.qualify(RESOURCE_TABLE),
            type_placeholder
        );
        self.nested().compile_root(inner, &mut body)?;
        if !body.ends_with(char::is_whitespace) {
            body.push('\n');
        }
        body.push_str("AND ");
        write_latest_version_filter(self.config, &mut body);
        self.ctes.define(slot, body);

        let scope = Scope::parameter(parameter);
        let criteria = Expression::and(vec![
            Expression::missing_field(FieldName::ReferenceBaseUri),
            Expression::string_equals(FieldName::ReferenceResourceType, target_resource_type),
        ]);
        self.write_exists(scope, search_param_id, Some(&criteria), false, out)?;

        let target_id_column =
            schema::column_name(SearchParamType::Reference, FieldName::ReferenceResourceId)?;
        out.push_str(&format!(
            "AND EXISTS(SELECT * FROM {cte} WHERE {cte}.Id = {alias}.{column})\n)\n",
            cte = cte_name,
            alias = scope.alias,
            column = target_id_column,
        ));
        Ok(())
    }

    /// `r.ResourceTypePK = <id>` for the `_type` parameter.
    fn write_resource_type(&mut self, resource_type: &str, out: &mut String) -> SearchQueryResult<()> {
        let type_id = self.catalogs.resource_type_id(resource_type)?;
        let placeholder = self.bind_compact_id(type_id);
        out.push_str(&format!(
            "{}.ResourceTypePK = {}\n",
            Alias::Resource,
            placeholder
        ));
        Ok(())
    }

    /// Writes an `EXISTS` over the index table of `scope`, correlated to `r`
    /// and filtered to one search parameter.
    ///
    /// The inner predicate is compiled before the parameter id is bound. With
    /// `close == false` the subquery is left open for the caller to extend.
    fn write_exists<'e>(
        &mut self,
        scope: Scope<'e>,
        search_param_id: i16,
        inner: Option<&'e Expression>,
        close: bool,
        out: &mut String,
    ) -> SearchQueryResult<()> {
        let table = self.config.qualify(scope.table()?);

        let predicate = match inner {
            Some(expression) => {
                let mut predicate = String::new();
                self.compile(expression, scope, &mut predicate)?;
                Some(predicate)
            }
            None => None,
        };
        let id_placeholder = self.bind_compact_id(search_param_id);

        let alias = scope.alias;
        out.push_str(&format!(
            " EXISTS(\nSELECT *\nFROM {table} {alias}\nWHERE {alias}.ResourcePK = r.ResourcePK\nAND {alias}.SearchParamPK = {id_placeholder}\n"
        ));
        if let Some(predicate) = predicate {
            out.push_str("AND ");
            out.push_str(&predicate);
        }
        if close {
            out.push(')');
        }
        Ok(())
    }

    fn bind_compact_id(&mut self, id: i16) -> String {
        self.binder.bind(Literal::from(id), Some(SqlDbType::SmallInt))
    }
}
