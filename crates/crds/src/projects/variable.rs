//! Variable Custom Resource Definition
//!
//! A project CI/CD variable. The external name is the variable key; the
//! environment scope narrows which variable with that key is managed.

use crate::common::{impl_managed, Condition, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "Variable",
    status = "VariableStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: VariableParameters,
}

/// How the runner exposes the variable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    EnvVar,
    File,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::EnvVar => "env_var",
            VariableType::File => "file",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "env_var" => Some(VariableType::EnvVar),
            "file" => Some(VariableType::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    /// Variable key; immutable
    pub key: String,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,

    /// Treat the value as a raw string (no variable expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,

    /// Environment scope, `*` when omitted; immutable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The value is never mirrored into status
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableObservation {
    pub key: String,
    pub variable_type: String,
    pub protected: bool,
    pub masked: bool,
    pub raw: bool,
    pub environment_scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<VariableObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(Variable, "Variable");
