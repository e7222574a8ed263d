//! DeployToken Custom Resource Definition
//!
//! Project deploy tokens are immutable; the token value is only returned by
//! GitLab at creation and is published to the connection secret under `token`.

use crate::common::{impl_managed, Condition, ResourceSpec};
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "DeployToken",
    status = "DeployTokenStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DeployTokenSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: DeployTokenParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployTokenParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    pub name: String,

    /// Defaults to `gitlab+deploy-token-{n}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// e.g. `read_repository`, `read_registry`, `write_package_registry`
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployTokenObservation {
    pub id: i64,
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub revoked: bool,
    pub expired: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployTokenStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<DeployTokenObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(DeployToken, "DeployToken");
