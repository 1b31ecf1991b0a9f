//! Catalogs and search parameter definitions shared by the integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use helios_sql_search::types::{CompositeComponentInfo, SearchParamType, SearchParameterInfo};

/// Compact id of `Patient`.
pub const PATIENT: i16 = 1;
/// Compact id of `Observation`.
pub const OBSERVATION: i16 = 2;
/// Compact id of `Organization`.
pub const ORGANIZATION: i16 = 3;
/// Compact id of `Practitioner`.
pub const PRACTITIONER: i16 = 4;

/// Compact search parameter ids.
pub mod sp {
    pub const CODE: i16 = 10;
    pub const NAME: i16 = 11;
    pub const VALUE_QUANTITY: i16 = 12;
    pub const SUBJECT: i16 = 13;
    pub const ORGANIZATION: i16 = 14;
    pub const GENERAL_PRACTITIONER: i16 = 15;
    pub const BIRTHDATE: i16 = 16;
    pub const URL: i16 = 17;
    pub const CODE_VALUE_QUANTITY: i16 = 18;
    pub const CODE_VALUE_QUANTITY_CODE: i16 = 19;
    pub const CODE_VALUE_QUANTITY_VALUE: i16 = 20;
}

const BASE: &str = "http://hl7.org/fhir/SearchParameter";

/// Search parameter definitions with their catalogs.
pub struct TestFixtures {
    pub resource_types: HashMap<String, i16>,
    pub search_params: HashMap<(String, Option<u8>), i16>,
    pub code: Arc<SearchParameterInfo>,
    pub name: Arc<SearchParameterInfo>,
    pub value_quantity: Arc<SearchParameterInfo>,
    pub subject: Arc<SearchParameterInfo>,
    pub organization: Arc<SearchParameterInfo>,
    pub general_practitioner: Arc<SearchParameterInfo>,
    pub birthdate: Arc<SearchParameterInfo>,
    pub url: Arc<SearchParameterInfo>,
    pub code_value_quantity: Arc<SearchParameterInfo>,
    pub resource_type: Arc<SearchParameterInfo>,
}

impl TestFixtures {
    /// Builds the fixture set.
    pub fn new() -> Self {
        let param = |name: &str, code: &str, param_type| {
            Arc::new(SearchParameterInfo::new(
                name,
                format!("{}/{}", BASE, code),
                param_type,
            ))
        };

        let code = param("code", "clinical-code", SearchParamType::Token);
        let name = param("name", "Patient-name", SearchParamType::String);
        let value_quantity = param(
            "value-quantity",
            "Observation-value-quantity",
            SearchParamType::Quantity,
        );
        let subject = param("subject", "Observation-subject", SearchParamType::Reference);
        let organization = param(
            "organization",
            "Patient-organization",
            SearchParamType::Reference,
        );
        let general_practitioner = param(
            "general-practitioner",
            "Patient-general-practitioner",
            SearchParamType::Reference,
        );
        let birthdate = param("birthdate", "individual-birthdate", SearchParamType::Date);
        let url = param("url", "conformance-url", SearchParamType::Uri);
        let code_value_quantity = Arc::new(SearchParameterInfo::composite(
            "code-value-quantity",
            format!("{}/Observation-code-value-quantity", BASE),
            vec![
                CompositeComponentInfo::new(
                    format!("{}/clinical-code", BASE),
                    SearchParamType::Token,
                ),
                CompositeComponentInfo::new(
                    format!("{}/Observation-value-quantity", BASE),
                    SearchParamType::Quantity,
                ),
            ],
        ));

        let resource_types = HashMap::from([
            ("Patient".to_string(), PATIENT),
            ("Observation".to_string(), OBSERVATION),
            ("Organization".to_string(), ORGANIZATION),
            ("Practitioner".to_string(), PRACTITIONER),
        ]);

        let search_params = HashMap::from([
            ((code.url.clone(), None), sp::CODE),
            ((name.url.clone(), None), sp::NAME),
            ((value_quantity.url.clone(), None), sp::VALUE_QUANTITY),
            ((subject.url.clone(), None), sp::SUBJECT),
            ((organization.url.clone(), None), sp::ORGANIZATION),
            (
                (general_practitioner.url.clone(), None),
                sp::GENERAL_PRACTITIONER,
            ),
            ((birthdate.url.clone(), None), sp::BIRTHDATE),
            ((url.url.clone(), None), sp::URL),
            ((code_value_quantity.url.clone(), None), sp::CODE_VALUE_QUANTITY),
            (
                (code_value_quantity.url.clone(), Some(0)),
                sp::CODE_VALUE_QUANTITY_CODE,
            ),
            (
                (code_value_quantity.url.clone(), Some(1)),
                sp::CODE_VALUE_QUANTITY_VALUE,
            ),
        ]);

        Self {
            resource_types,
            search_params,
            code,
            name,
            value_quantity,
            subject,
            organization,
            general_practitioner,
            birthdate,
            url,
            code_value_quantity,
            resource_type: Arc::new(SearchParameterInfo::resource_type()),
        }
    }
}

impl Default for TestFixtures {
    fn default() -> Self {
        Self::new()
    }
}
