//! SamlGroupLink Custom Resource Definition
//!
//! Links a SAML group to a GitLab group. The external name is the SAML group
//! name.

use crate::common::{impl_managed, AccessLevel, Condition, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "groups.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "SamlGroupLink",
    status = "SamlGroupLinkStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SamlGroupLinkSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: SamlGroupLinkParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamlGroupLinkParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,

    /// SAML group name; immutable
    pub name: String,

    pub access_level: AccessLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamlGroupLinkObservation {
    pub name: String,
    pub access_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamlGroupLinkStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<SamlGroupLinkObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(SamlGroupLink, "SamlGroupLink");
