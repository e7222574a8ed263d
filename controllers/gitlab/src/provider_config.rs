//! ProviderConfig resolution.
//!
//! Reads the ProviderConfig a managed object points at, extracts the
//! credential from its source and builds an authenticated [`GitLabClient`].

use crate::error::ControllerError;
use crds::{CredentialsMethod, CredentialsSource, ProviderConfig, ProviderCredentials, ResourceSpec};
use gitlab_client::{Auth, GitLabClient};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

/// Resolves ProviderConfigs into GitLab clients
#[derive(Clone)]
pub struct ProviderConfigResolver {
    client: Client,
}

impl std::fmt::Debug for ProviderConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfigResolver").finish_non_exhaustive()
    }
}

impl ProviderConfigResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client for the ProviderConfig referenced by `spec`
    pub async fn gitlab_client(&self, spec: &ResourceSpec) -> Result<GitLabClient, ControllerError> {
        let name = spec.provider_config_name();
        let api: Api<ProviderConfig> = Api::all(self.client.clone());
        let pc = api
            .get_opt(name)
            .await?
            .ok_or_else(|| ControllerError::ProviderConfig(format!("ProviderConfig {} not found", name)))?;

        debug!("Using ProviderConfig {} ({})", name, pc.spec.base_url);
        let credential = self.extract_credential(&pc.spec.credentials).await?;
        build_client(&pc.spec.base_url, pc.spec.credentials.method, credential).await
    }

    /// Credential material, `None` for anonymous access
    async fn extract_credential(&self, creds: &ProviderCredentials) -> Result<Option<String>, ControllerError> {
        match creds.source {
            CredentialsSource::None => Ok(None),
            CredentialsSource::Secret => {
                let selector = creds.secret_ref.as_ref().ok_or_else(|| {
                    ControllerError::ProviderConfig("credentials.secretRef is required for source Secret".to_string())
                })?;
                let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &selector.namespace);
                let secret = secrets.get_opt(&selector.name).await?.ok_or_else(|| {
                    ControllerError::ProviderConfig(format!(
                        "credentials secret {}/{} not found",
                        selector.namespace, selector.name
                    ))
                })?;
                let value = secret
                    .data
                    .and_then(|mut d| d.remove(&selector.key))
                    .ok_or_else(|| {
                        ControllerError::ProviderConfig(format!(
                            "key {} not found in secret {}/{}",
                            selector.key, selector.namespace, selector.name
                        ))
                    })?;
                let value = String::from_utf8(value.0).map_err(|_| {
                    ControllerError::ProviderConfig(format!("key {} of secret {} is not UTF-8", selector.key, selector.name))
                })?;
                Ok(Some(value.trim().to_string()))
            }
            CredentialsSource::Environment => {
                let selector = creds.env.as_ref().ok_or_else(|| {
                    ControllerError::ProviderConfig("credentials.env is required for source Environment".to_string())
                })?;
                std::env::var(&selector.name).map(Some).map_err(|_| {
                    ControllerError::ProviderConfig(format!("environment variable {} is not set", selector.name))
                })
            }
            CredentialsSource::Filesystem => {
                let selector = creds.fs.as_ref().ok_or_else(|| {
                    ControllerError::ProviderConfig("credentials.fs is required for source Filesystem".to_string())
                })?;
                let value = tokio::fs::read_to_string(&selector.path).await.map_err(|e| {
                    ControllerError::ProviderConfig(format!("cannot read credentials file {}: {}", selector.path, e))
                })?;
                Ok(Some(value.trim().to_string()))
            }
            CredentialsSource::InjectedIdentity => Err(ControllerError::ProviderConfig(
                "credentials source InjectedIdentity is not supported".to_string(),
            )),
        }
    }
}

/// Build a client for `base_url` from the extracted credential
pub async fn build_client(
    base_url: &str,
    method: CredentialsMethod,
    credential: Option<String>,
) -> Result<GitLabClient, ControllerError> {
    let Some(credential) = credential else {
        return Ok(GitLabClient::new(base_url, Auth::None)?);
    };
    match method {
        CredentialsMethod::BasicAuth => {
            let (username, password) = split_basic_auth(&credential)?;
            Ok(GitLabClient::with_basic_auth(base_url, username, password).await?)
        }
        other => Ok(GitLabClient::new(base_url, token_auth(other, credential))?),
    }
}

/// Auth for the token-based methods
pub fn token_auth(method: CredentialsMethod, token: String) -> Auth {
    match method {
        CredentialsMethod::PersonalAccessToken => Auth::PrivateToken(token),
        CredentialsMethod::OAuthToken => Auth::OAuthToken(token),
        CredentialsMethod::JobToken => Auth::JobToken(token),
        // exchanged for an OAuth token before a client exists
        CredentialsMethod::BasicAuth => Auth::OAuthToken(token),
    }
}

/// `username:password`; the password may itself contain colons
pub fn split_basic_auth(credential: &str) -> Result<(&str, &str), ControllerError> {
    match credential.split_once(':') {
        Some((user, pass)) if !user.is_empty() => Ok((user, pass)),
        _ => Err(ControllerError::ProviderConfig(
            "BasicAuth credentials must have the form username:password".to_string(),
        )),
    }
}
