//! Search expression tree.
//!
//! Expressions are produced upstream by the search parameter parser and are
//! assumed to be validated against the catalogs. The compiler only reads them.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use helios_sql_search::types::{Expression, FieldName, SearchParamType, SearchParameterInfo};
//!
//! let code = Arc::new(SearchParameterInfo::new(
//!     "code",
//!     "http://hl7.org/fhir/SearchParameter/clinical-code",
//!     SearchParamType::Token,
//! ));
//!
//! // Observation?code=1234-5
//! let expr = Expression::parameter(code, Expression::eq(FieldName::TokenCode, "1234-5"));
//! assert!(matches!(expr, Expression::Parameter { .. }));
//! ```

// Field and variant names mirror the FHIR search model
#![allow(missing_docs)]

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::search_params::SearchParameterInfo;

/// Abstract field of an index row.
///
/// Fields are resolved to physical columns per search parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Number,
    DateTimeStart,
    DateTimeEnd,
    String,
    TokenSystem,
    TokenCode,
    /// Hash of the token display text; matched through the token text table.
    TokenText,
    /// Interned base URI of an absolute reference.
    ReferenceBaseUri,
    ReferenceResourceType,
    ReferenceResourceId,
    Quantity,
    QuantityCode,
    QuantitySystem,
    Uri,
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldName::Number => "number",
            FieldName::DateTimeStart => "dateTimeStart",
            FieldName::DateTimeEnd => "dateTimeEnd",
            FieldName::String => "string",
            FieldName::TokenSystem => "tokenSystem",
            FieldName::TokenCode => "tokenCode",
            FieldName::TokenText => "tokenText",
            FieldName::ReferenceBaseUri => "referenceBaseUri",
            FieldName::ReferenceResourceType => "referenceResourceType",
            FieldName::ReferenceResourceId => "referenceResourceId",
            FieldName::Quantity => "quantity",
            FieldName::QuantityCode => "quantityCode",
            FieldName::QuantitySystem => "quantitySystem",
            FieldName::Uri => "uri",
        };
        f.write_str(name)
    }
}

/// Relational operator of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOperator {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    NotEqual,
}

impl BinaryOperator {
    /// The SQL operator token.
    pub fn sql(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::NotEqual => "<>",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// Operator of a string match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringOperator {
    Equals,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
}

impl StringOperator {
    /// Returns true for the negated operators.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            StringOperator::NotContains | StringOperator::NotStartsWith | StringOperator::NotEndsWith
        )
    }

    /// Builds the LIKE pattern for `value`.
    ///
    /// Returns `None` for [`StringOperator::Equals`], which is rendered as `=`.
    pub fn like_pattern(&self, value: &str) -> Option<String> {
        match self {
            StringOperator::Equals => None,
            StringOperator::Contains | StringOperator::NotContains => Some(format!("%{}%", value)),
            StringOperator::StartsWith | StringOperator::NotStartsWith => {
                Some(format!("{}%", value))
            }
            StringOperator::EndsWith | StringOperator::NotEndsWith => Some(format!("%{}", value)),
        }
    }
}

impl fmt::Display for StringOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StringOperator::Equals => "equals",
            StringOperator::Contains => "contains",
            StringOperator::NotContains => "not-contains",
            StringOperator::StartsWith => "starts-with",
            StringOperator::NotStartsWith => "not-starts-with",
            StringOperator::EndsWith => "ends-with",
            StringOperator::NotEndsWith => "not-ends-with",
        };
        f.write_str(name)
    }
}

/// Boolean operator of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    And,
    Or,
}

impl GroupOperator {
    /// The SQL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            GroupOperator::And => "AND",
            GroupOperator::Or => "OR",
        }
    }
}

/// A literal value carried by an expression.
///
/// Literals are never written into SQL text; they are always bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(Decimal),
    DateTime(DateTime<Utc>),
}

impl Literal {
    /// Returns the string value, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{}", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<i16> for Literal {
    fn from(i: i16) -> Self {
        Literal::Integer(i64::from(i))
    }
}

impl From<Decimal> for Literal {
    fn from(d: Decimal) -> Self {
        Literal::Decimal(d)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(dt: DateTime<Utc>) -> Self {
        Literal::DateTime(dt)
    }
}

/// A node of the search expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A predicate evaluated against the index rows of one search parameter.
    Parameter {
        parameter: Arc<SearchParameterInfo>,
        expression: Box<Expression>,
    },
    /// One component (0-based) of the enclosing composite parameter.
    CompositeComponent {
        component_index: u8,
        expression: Box<Expression>,
    },
    /// `field <op> value`.
    Comparison {
        field: FieldName,
        operator: BinaryOperator,
        value: Literal,
    },
    /// String equality or LIKE match.
    StringMatch {
        field: FieldName,
        operator: StringOperator,
        value: String,
    },
    /// The field's column is null.
    MissingField { field: FieldName },
    /// Presence (`is_missing == false`) or absence of any index row for a parameter.
    MissingParameter {
        parameter: Arc<SearchParameterInfo>,
        is_missing: bool,
    },
    /// A predicate on resources of `target_resource_type` reached through a reference.
    Chained {
        parameter: Arc<SearchParameterInfo>,
        target_resource_type: String,
        expression: Box<Expression>,
    },
    /// AND/OR over child expressions, in order.
    Group {
        operator: GroupOperator,
        expressions: Vec<Expression>,
    },
}

impl Expression {
    /// Wraps `expression` in a search parameter predicate.
    pub fn parameter(parameter: Arc<SearchParameterInfo>, expression: Expression) -> Self {
        Expression::Parameter {
            parameter,
            expression: Box::new(expression),
        }
    }

    /// Wraps `expression` as component `component_index` of the enclosing composite.
    pub fn composite_component(component_index: u8, expression: Expression) -> Self {
        Expression::CompositeComponent {
            component_index,
            expression: Box::new(expression),
        }
    }

    /// `field <operator> value`.
    pub fn compare(field: FieldName, operator: BinaryOperator, value: impl Into<Literal>) -> Self {
        Expression::Comparison {
            field,
            operator,
            value: value.into(),
        }
    }

    /// `field = value`.
    pub fn eq(field: FieldName, value: impl Into<Literal>) -> Self {
        Self::compare(field, BinaryOperator::Equal, value)
    }

    /// String match on `field`.
    pub fn string(field: FieldName, operator: StringOperator, value: impl Into<String>) -> Self {
        Expression::StringMatch {
            field,
            operator,
            value: value.into(),
        }
    }

    /// String equality on `field`.
    pub fn string_equals(field: FieldName, value: impl Into<String>) -> Self {
        Self::string(field, StringOperator::Equals, value)
    }

    /// `field IS NULL`.
    pub fn missing_field(field: FieldName) -> Self {
        Expression::MissingField { field }
    }

    /// `:missing` on a search parameter.
    pub fn missing_parameter(parameter: Arc<SearchParameterInfo>, is_missing: bool) -> Self {
        Expression::MissingParameter {
            parameter,
            is_missing,
        }
    }

    /// Chained predicate through a reference parameter.
    pub fn chained(
        parameter: Arc<SearchParameterInfo>,
        target_resource_type: impl Into<String>,
        expression: Expression,
    ) -> Self {
        Expression::Chained {
            parameter,
            target_resource_type: target_resource_type.into(),
            expression: Box::new(expression),
        }
    }

    /// Conjunction of `expressions`.
    pub fn and(expressions: Vec<Expression>) -> Self {
        Expression::Group {
            operator: GroupOperator::And,
            expressions,
        }
    }

    /// Disjunction of `expressions`.
    pub fn or(expressions: Vec<Expression>) -> Self {
        Expression::Group {
            operator: GroupOperator::Or,
            expressions,
        }
    }
}
