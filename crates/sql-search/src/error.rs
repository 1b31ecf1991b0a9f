//! Error types for search query compilation.
//!
//! Every error here is fatal for the compile that raised it: the expression
//! tree is pre-validated upstream, so a failure means the tree, the catalogs
//! and the physical schema disagree. No partial SQL is ever returned and
//! retrying the same input fails the same way.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::types::{FieldName, SearchParamType};

/// The error type for all query compilation operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchQueryError {
    /// The resource type is not present in the resource type catalog.
    #[error("unknown resource type: {resource_type}")]
    UnknownResourceType { resource_type: String },

    /// The search parameter (or one of its components) is not in the catalog.
    #[error("unknown search parameter: {url}{}", component_suffix(.component_index))]
    UnknownSearchParameter {
        url: String,
        component_index: Option<u8>,
    },

    /// The field has no column for parameters of this type.
    #[error("unsupported field {field} for {param_type} search parameter")]
    UnsupportedField {
        field: FieldName,
        param_type: SearchParamType,
    },

    /// Parameters of this type have no index table of their own.
    #[error("{param_type} search parameters have no index table")]
    NoIndexTable { param_type: SearchParamType },

    /// The operator cannot be applied to the field.
    #[error("unsupported operator {operator} for field {field}")]
    UnsupportedOperator { operator: String, field: FieldName },

    /// The expression is not valid where it appears in the tree.
    #[error("unsupported expression: {message}")]
    UnsupportedExpression { message: String },

    /// A composite component appeared without a composite parameter around it.
    #[error("composite component {component_index} is not inside a composite search parameter")]
    CompositeComponentOutsideComposite { component_index: u8 },

    /// The component index exceeds the parameter's declared components.
    #[error(
        "component {component_index} out of range for composite parameter {parameter} with {component_count} components"
    )]
    CompositeComponentOutOfRange {
        parameter: String,
        component_index: u8,
        component_count: usize,
    },

    /// Components were not visited in increasing order without gaps.
    #[error("composite parameter {parameter}: expected component {expected}, found {found}")]
    CompositeComponentOutOfOrder {
        parameter: String,
        expected: u8,
        found: u8,
    },

    /// A composite group ended before its last component.
    #[error(
        "composite parameter {parameter}: {rendered} of {component_count} components rendered"
    )]
    IncompleteComposite {
        parameter: String,
        rendered: usize,
        component_count: usize,
    },

    /// Chained predicates are nested deeper than the configured maximum.
    #[error("chain depth {depth} exceeds maximum allowed depth {max}")]
    ChainDepthExceeded { depth: usize, max: usize },

    /// The page window offset does not fit a 64-bit row count.
    #[error("page {page_number} with page size {page_size} overflows the row offset")]
    PaginationOverflow { page_number: u32, page_size: u32 },

    /// The builder configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

fn component_suffix(component_index: &Option<u8>) -> String {
    match component_index {
        Some(index) => format!(" (component {})", index),
        None => String::new(),
    }
}

/// Result type alias for query compilation.
pub type SearchQueryResult<T> = Result<T, SearchQueryError>;
