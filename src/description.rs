//! Service descriptions: the named admin operations of one API version and
//! the HTTP request template behind each of them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Descriptions bundled with the crate, keyed by resource name.
const RESOURCES: &[(&str, &str)] = &[(
    "keycloak-1_0",
    include_str!("../resources/keycloak-1_0.json"),
)];

/// Resource name for an API version: `"1.0"` becomes `"keycloak-1_0"`.
pub fn resource_name(version: &str) -> String {
    format!("keycloak-{}", version.replace('.', "_"))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescription {
    pub name: String,
    pub api_version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub operations: BTreeMap<String, Operation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub http_method: String,
    pub uri: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
    /// Where parameters the operation does not declare are sent, if anywhere
    #[serde(default)]
    pub additional_parameters: Option<AdditionalParameters>,
    /// The server answers with an empty body on success (201/204)
    #[serde(default)]
    pub empty_response: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub location: Location,
    #[serde(default, rename = "type")]
    pub kind: Option<ParameterType>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    /// Name on the wire when it differs from the parameter name
    #[serde(default)]
    pub sent_as: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Parameter {
    pub fn wire_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.sent_as.as_deref().unwrap_or(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdditionalParameters {
    pub location: Location,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Uri,
    Query,
    Json,
    Header,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Integer => value.is_i64() || value.is_u64(),
            ParameterType::Number => value.is_number(),
            ParameterType::Boolean => value.is_boolean(),
            ParameterType::Array => value.is_array(),
            ParameterType::Object => value.is_object(),
        }
    }
}

impl ServiceDescription {
    /// Load the bundled description for an API version.
    pub fn for_version(version: &str) -> Result<Self> {
        let name = resource_name(version);
        let raw = RESOURCES
            .iter()
            .find(|(resource, _)| *resource == name)
            .map(|(_, raw)| *raw)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "Unsupported API version {:?}: no service description {}",
                    version, name
                ))
            })?;

        log::debug!("Loading service description {}", name);
        Self::from_json(raw)
    }

    /// Parse and validate a description document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let description: ServiceDescription = serde_json::from_str(raw).map_err(|e| {
            Error::Configuration(format!("Invalid service description: {}", e))
        })?;
        description.validate()?;
        Ok(description)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        for (name, operation) in &self.operations {
            operation.method().map_err(|e| {
                Error::Configuration(format!("Operation {} has an invalid method: {}", name, e))
            })?;
        }
        Ok(())
    }
}

impl Operation {
    pub fn method(&self) -> std::result::Result<reqwest::Method, String> {
        self.http_method
            .to_ascii_uppercase()
            .parse::<reqwest::Method>()
            .map_err(|e| format!("{:?}: {}", self.http_method, e))
    }
}
