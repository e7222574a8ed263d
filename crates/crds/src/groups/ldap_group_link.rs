//! LdapGroupLink Custom Resource Definition
//!
//! Links an LDAP group (by CN) to a GitLab group. The external name is the CN.

use crate::common::{impl_managed, AccessLevel, Condition, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "groups.gitlab.crossplane.io",
    version = "v1alpha1",
    kind = "LdapGroupLink",
    status = "LdapGroupLinkStatus",
    category = "gitlab",
    printcolumn = r#"{"name":"READY","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"SYNCED","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LdapGroupLinkSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub for_provider: LdapGroupLinkParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LdapGroupLinkParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,

    /// LDAP group common name; immutable
    pub cn: String,

    pub group_access: AccessLevel,

    /// LDAP provider ID (e.g. `ldapmain`); immutable
    pub ldap_provider: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LdapGroupLinkObservation {
    pub cn: String,
    pub group_access: i64,
    pub ldap_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LdapGroupLinkStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<LdapGroupLinkObservation>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl_managed!(LdapGroupLink, "LdapGroupLink");
