//! FHIR search parameter definitions.
//!
//! This module defines the parameter metadata the compiler needs: the value
//! type (which selects the index table and columns), the canonical URL used
//! for catalog lookups, and the component layout of composite parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Code of the synthetic parameter that matches on resource type.
pub const RESOURCE_TYPE_PARAMETER: &str = "_type";

/// Canonical URL of the synthetic resource type parameter.
pub const RESOURCE_TYPE_PARAMETER_URL: &str = "http://hl7.org/fhir/SearchParameter/Resource-type";

/// FHIR search parameter types.
///
/// See: https://build.fhir.org/search.html#ptypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchParamType {
    /// A simple string, like a name or description.
    String,
    /// A search against a URI.
    Uri,
    /// A search for a number.
    Number,
    /// A search for a date, dateTime, or period.
    Date,
    /// A quantity, with a number and units.
    Quantity,
    /// A code from a code system or value set.
    Token,
    /// A reference to another resource.
    Reference,
    /// A composite search parameter that combines others.
    Composite,
}

impl fmt::Display for SearchParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchParamType::String => write!(f, "string"),
            SearchParamType::Uri => write!(f, "uri"),
            SearchParamType::Number => write!(f, "number"),
            SearchParamType::Date => write!(f, "date"),
            SearchParamType::Quantity => write!(f, "quantity"),
            SearchParamType::Token => write!(f, "token"),
            SearchParamType::Reference => write!(f, "reference"),
            SearchParamType::Composite => write!(f, "composite"),
        }
    }
}

impl FromStr for SearchParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(SearchParamType::String),
            "uri" => Ok(SearchParamType::Uri),
            "number" => Ok(SearchParamType::Number),
            "date" => Ok(SearchParamType::Date),
            "quantity" => Ok(SearchParamType::Quantity),
            "token" => Ok(SearchParamType::Token),
            "reference" => Ok(SearchParamType::Reference),
            "composite" => Ok(SearchParamType::Composite),
            _ => Err(format!("unknown search parameter type: {}", s)),
        }
    }
}

/// One component of a composite search parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeComponentInfo {
    /// Definition URL of the component parameter.
    pub definition: String,
    /// Value type of the component; selects its index table.
    pub param_type: SearchParamType,
}

impl CompositeComponentInfo {
    /// Creates a component definition.
    pub fn new(definition: impl Into<String>, param_type: SearchParamType) -> Self {
        Self {
            definition: definition.into(),
            param_type,
        }
    }
}

/// A search parameter as referenced from an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameterInfo {
    /// Parameter code (e.g., "code", "subject").
    pub name: String,
    /// Canonical URL; the search parameter catalog is keyed by it.
    pub url: String,
    /// The parameter type.
    pub param_type: SearchParamType,
    /// Components, in declaration order (composite parameters only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<CompositeComponentInfo>,
}

impl SearchParameterInfo {
    /// Creates a non-composite search parameter.
    pub fn new(name: impl Into<String>, url: impl Into<String>, param_type: SearchParamType) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            param_type,
            components: Vec::new(),
        }
    }

    /// Creates a composite search parameter from its components.
    pub fn composite(
        name: impl Into<String>,
        url: impl Into<String>,
        components: Vec<CompositeComponentInfo>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            param_type: SearchParamType::Composite,
            components,
        }
    }

    /// The synthetic `_type` parameter.
    pub fn resource_type() -> Self {
        Self::new(
            RESOURCE_TYPE_PARAMETER,
            RESOURCE_TYPE_PARAMETER_URL,
            SearchParamType::Token,
        )
    }

    /// Returns true for the synthetic `_type` parameter.
    pub fn is_resource_type(&self) -> bool {
        self.name == RESOURCE_TYPE_PARAMETER
    }

    /// Returns true if this is a composite parameter.
    pub fn is_composite(&self) -> bool {
        self.param_type == SearchParamType::Composite
    }

    /// Returns the component at `index`, if declared.
    pub fn component(&self, index: u8) -> Option<&CompositeComponentInfo> {
        self.components.get(usize::from(index))
    }
}
