//! Bound SQL parameters.
//!
//! The compiler never writes a literal into SQL text. Every value goes through
//! a [`ParameterBinder`], which records it and hands back the placeholder to
//! emit in its place.

use std::fmt;

use crate::types::Literal;

/// Explicit storage type for a bound parameter.
///
/// When absent, the execution layer infers the type from the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDbType {
    /// Non-unicode string.
    VarChar,
    /// Unicode string.
    NVarChar,
    /// 16-bit integer; the storage type of compact ids.
    SmallInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Exact decimal.
    Decimal,
    /// Date and time.
    DateTime2,
}

impl fmt::Display for SqlDbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlDbType::VarChar => "varchar",
            SqlDbType::NVarChar => "nvarchar",
            SqlDbType::SmallInt => "smallint",
            SqlDbType::Int => "int",
            SqlDbType::BigInt => "bigint",
            SqlDbType::Decimal => "decimal",
            SqlDbType::DateTime2 => "datetime2",
        };
        f.write_str(name)
    }
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    /// Placeholder name as it appears in the SQL text (e.g. `@p0`).
    pub name: String,
    /// The bound value.
    pub value: Literal,
    /// Explicit storage type, if any.
    pub db_type: Option<SqlDbType>,
}

/// Records literal values and returns the placeholder to emit for each.
pub trait ParameterBinder {
    /// Binds `value` and returns its placeholder.
    fn bind(&mut self, value: Literal, db_type: Option<SqlDbType>) -> String;
}

/// Ordered, append-only parameter collection for one query.
///
/// Placeholders are `@p0`, `@p1`, ... in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlParameterCollection {
    params: Vec<SqlParam>,
}

impl SqlParameterCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if nothing has been bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Looks up a parameter by placeholder name.
    pub fn get(&self, name: &str) -> Option<&SqlParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns the bound value for a placeholder.
    pub fn value(&self, name: &str) -> Option<&Literal> {
        self.get(name).map(|p| &p.value)
    }

    /// Iterates in binding order.
    pub fn iter(&self) -> std::slice::Iter<'_, SqlParam> {
        self.params.iter()
    }
}

impl ParameterBinder for SqlParameterCollection {
    fn bind(&mut self, value: Literal, db_type: Option<SqlDbType>) -> String {
        let name = format!("@p{}", self.params.len());
        self.params.push(SqlParam {
            name: name.clone(),
            value,
            db_type,
        });
        name
    }
}

impl IntoIterator for SqlParameterCollection {
    type Item = SqlParam;
    type IntoIter = std::vec::IntoIter<SqlParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<'a> IntoIterator for &'a SqlParameterCollection {
    type Item = &'a SqlParam;
    type IntoIter = std::slice::Iter<'a, SqlParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
