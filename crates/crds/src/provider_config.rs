//! ProviderConfig Custom Resource Definition
//!
//! Tells the controller which GitLab instance to talk to and where its
//! credentials come from. Cluster scoped; managed resources select one with
//! `providerConfigRef`, falling back to the one named `default`.

use crate::common::SecretKeySelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.crossplane.io",
    version = "v1beta1",
    kind = "ProviderConfig",
    category = "gitlab"
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// GitLab instance URL, e.g. `https://gitlab.com`
    #[serde(rename = "baseURL")]
    pub base_url: String,

    pub credentials: ProviderCredentials,
}

/// Where the credential material is read from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum CredentialsSource {
    None,
    Secret,
    InjectedIdentity,
    Environment,
    Filesystem,
}

/// How the credential material authenticates against GitLab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum CredentialsMethod {
    /// `username:password`, exchanged for an OAuth token
    BasicAuth,
    JobToken,
    OAuthToken,
    #[default]
    PersonalAccessToken,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EnvSelector {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FsSelector {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    pub source: CredentialsSource,

    #[serde(default)]
    pub method: CredentialsMethod,

    /// Used with source `Secret`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,

    /// Used with source `Environment`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvSelector>,

    /// Used with source `Filesystem`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsSelector>,
}
