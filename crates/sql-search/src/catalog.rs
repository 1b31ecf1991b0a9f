//! Compact id catalogs.
//!
//! Resource type names and search parameter URLs are stored in the index
//! tables as small integers. The catalogs mapping names to those ids are
//! owned by the storage layer and pre-populated; the compiler only reads them
//! and may share them across any number of concurrent compiles.

use std::collections::HashMap;

use crate::error::{SearchQueryError, SearchQueryResult};

/// Resource type name to compact id.
pub trait ResourceTypeCatalog: Send + Sync {
    /// Returns the compact id of `resource_type`.
    fn resource_type_id(&self, resource_type: &str) -> Option<i16>;
}

/// (search parameter URL, composite component index) to compact id.
///
/// Non-composite parameters and the composite parameter itself are keyed with
/// `None`; each composite component is keyed with its 0-based index.
pub trait SearchParameterCatalog: Send + Sync {
    /// Returns the compact id of the parameter (or component).
    fn search_parameter_id(&self, url: &str, component_index: Option<u8>) -> Option<i16>;
}

impl ResourceTypeCatalog for HashMap<String, i16> {
    fn resource_type_id(&self, resource_type: &str) -> Option<i16> {
        self.get(resource_type).copied()
    }
}

impl SearchParameterCatalog for HashMap<(String, Option<u8>), i16> {
    fn search_parameter_id(&self, url: &str, component_index: Option<u8>) -> Option<i16> {
        self.get(&(url.to_string(), component_index)).copied()
    }
}

/// The pair of catalogs consulted during one compile.
#[derive(Clone, Copy)]
pub struct Catalogs<'a> {
    resource_types: &'a dyn ResourceTypeCatalog,
    search_parameters: &'a dyn SearchParameterCatalog,
}

impl<'a> Catalogs<'a> {
    /// Bundles the two catalogs.
    pub fn new(
        resource_types: &'a dyn ResourceTypeCatalog,
        search_parameters: &'a dyn SearchParameterCatalog,
    ) -> Self {
        Self {
            resource_types,
            search_parameters,
        }
    }

    /// Looks up a resource type, failing if it is not catalogued.
    pub fn resource_type_id(&self, resource_type: &str) -> SearchQueryResult<i16> {
        self.resource_types
            .resource_type_id(resource_type)
            .ok_or_else(|| SearchQueryError::UnknownResourceType {
                resource_type: resource_type.to_string(),
            })
    }

    /// Looks up a search parameter or component, failing if it is not catalogued.
    pub fn search_parameter_id(
        &self,
        url: &str,
        component_index: Option<u8>,
    ) -> SearchQueryResult<i16> {
        self.search_parameters
            .search_parameter_id(url, component_index)
            .ok_or_else(|| SearchQueryError::UnknownSearchParameter {
                url: url.to_string(),
                component_index,
            })
    }
}

impl std::fmt::Debug for Catalogs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalogs").finish_non_exhaustive()
    }
}
