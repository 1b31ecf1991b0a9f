//! Physical schema the compiled SQL addresses.
//!
//! One index table per search parameter value type, keyed by `ResourcePK`
//! and `SearchParamPK`, plus two interning side tables for token display
//! text and base URIs.

use crate::error::{SearchQueryError, SearchQueryResult};
use crate::types::{FieldName, SearchParamType};

/// Versioned resource table.
pub const RESOURCE_TABLE: &str = "Resource";

/// Token display text, keyed by the hash stored in `TokenSearchParam.TextHash`.
pub const TOKEN_TEXT_TABLE: &str = "TokenText";

/// Interned URIs, keyed by the id stored in `ReferenceSearchParam.BaseUriPK`.
pub const URI_TABLE: &str = "Uri";

/// Column tying the component rows of one composite value together.
pub const CORRELATION_COLUMN: &str = "CompositeCorrelationId";

/// Returns the index table for a parameter type.
///
/// Composite parameters have no table; each component uses its own.
pub fn index_table(param_type: SearchParamType) -> SearchQueryResult<&'static str> {
    match param_type {
        SearchParamType::Number => Ok("NumberSearchParam"),
        SearchParamType::Date => Ok("DateSearchParam"),
        SearchParamType::String => Ok("StringSearchParam"),
        SearchParamType::Token => Ok("TokenSearchParam"),
        SearchParamType::Reference => Ok("ReferenceSearchParam"),
        SearchParamType::Quantity => Ok("QuantitySearchParam"),
        SearchParamType::Uri => Ok("UriSearchParam"),
        SearchParamType::Composite => Err(SearchQueryError::NoIndexTable { param_type }),
    }
}

/// Resolves a field to its column in the index table of `param_type`.
pub fn column_name(param_type: SearchParamType, field: FieldName) -> SearchQueryResult<&'static str> {
    let column = match (param_type, field) {
        (SearchParamType::Number, FieldName::Number) => "Number",

        (SearchParamType::Date, FieldName::DateTimeStart) => "StartTime",
        (SearchParamType::Date, FieldName::DateTimeEnd) => "EndTime",

        (SearchParamType::String, FieldName::String) => "Value",

        (SearchParamType::Token, FieldName::TokenSystem) => "System",
        (SearchParamType::Token, FieldName::TokenCode) => "Code",
        (SearchParamType::Token, FieldName::TokenText) => "TextHash",

        (SearchParamType::Reference, FieldName::ReferenceBaseUri) => "BaseUriPK",
        (SearchParamType::Reference, FieldName::ReferenceResourceType) => {
            "ReferenceResourceTypePK"
        }
        (SearchParamType::Reference, FieldName::ReferenceResourceId) => "ReferenceResourceId",

        (SearchParamType::Quantity, FieldName::Quantity) => "Quantity",
        (SearchParamType::Quantity, FieldName::QuantityCode) => "Code",
        (SearchParamType::Quantity, FieldName::QuantitySystem) => "System",

        (SearchParamType::Uri, FieldName::Uri) => "Uri",

        _ => return Err(SearchQueryError::UnsupportedField { field, param_type }),
    };
    Ok(column)
}
