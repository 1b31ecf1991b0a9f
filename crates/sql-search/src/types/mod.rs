//! Core types for search compilation.
//!
//! - `search_params` - search parameter metadata (type, URL, composite components)
//! - `expression` - the search expression tree consumed by the compiler

mod expression;
mod search_params;

pub use expression::{
    BinaryOperator, Expression, FieldName, GroupOperator, Literal, StringOperator,
};
pub use search_params::{
    CompositeComponentInfo, RESOURCE_TYPE_PARAMETER, RESOURCE_TYPE_PARAMETER_URL,
    SearchParamType, SearchParameterInfo,
};
