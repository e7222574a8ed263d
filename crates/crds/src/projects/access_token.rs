//! AccessToken Custom Resource Definition
//!
//! Project access tokens are immutable; the token value is only returned at
//! creation and is published to the connection secret under `token`.

use crate::common::{impl_managed, AccessLevel, Condition, ResourceSpec};
use chrono::{DateTime, NaiveDate, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "AccessToken",
    status = "AccessTokenStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: AccessTokenParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,

    pub name: String,

    /// e.g. `api`, `read_api`, `read_repository`, `write_repository`
    pub scopes: Vec<String>,

    /// Role of the token's bot user; maintainer when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,

    /// Expiry date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenObservation {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub active: bool,
    pub revoked: bool,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub access_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<AccessTokenObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(AccessToken, "AccessToken");
