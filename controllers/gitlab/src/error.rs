//! Controller-specific error types.
//!
//! Adapter failures carry a stable sentinel (see [`ControllerError::reason`])
//! that ends up as the `reason` of the `Synced` condition, so users can tell
//! a bad spec from an unreachable GitLab without reading logs.

use gitlab_client::GitLabError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the GitLab Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Adapter was handed a managed resource of another kind
    #[error("managed resource is not of the expected kind")]
    WrongKind,

    /// External name of an integer-keyed kind does not parse
    #[error("external name is not an integer: {0:?}")]
    IdNotInt(String),

    #[error("external name is not set")]
    MissingExternalName,

    #[error("groupId is not set")]
    MissingGroupId,

    #[error("projectId is not set")]
    MissingProjectId,

    #[error("cannot get GitLab object: {0}")]
    GetFailed(#[source] GitLabError),

    #[error("cannot create GitLab object: {0}")]
    CreateFailed(#[source] GitLabError),

    #[error("cannot update GitLab object: {0}")]
    UpdateFailed(#[source] GitLabError),

    #[error("cannot delete GitLab object: {0}")]
    DeleteFailed(#[source] GitLabError),

    /// Remote value cannot be written back into the desired parameters
    #[error("cannot late-initialize {field}: {message}")]
    LateInitialize { field: &'static str, message: String },

    /// A token that is only returned once would have nowhere to go
    #[error("writeConnectionSecretToRef is required")]
    MissingConnectionSecret,

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// GitLab API error outside of the CRUD verbs (token exchange, validation)
    #[error("GitLab error: {0}")]
    GitLab(#[from] GitLabError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// ProviderConfig missing or unusable
    #[error("ProviderConfig error: {0}")]
    ProviderConfig(String),

    /// Adding or removing the finalizer failed
    #[error("Finalizer error: {0}")]
    Finalizer(#[source] KubeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource watch stopped or panicked
    #[error("Resource watch failed: {0}")]
    Watch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControllerError {
    /// Stable sentinel used as the `Synced` condition reason
    pub fn reason(&self) -> &'static str {
        match self {
            ControllerError::WrongKind => "WrongKind",
            ControllerError::IdNotInt(_) => "IDNotInt",
            ControllerError::MissingExternalName => "MissingExternalName",
            ControllerError::MissingGroupId => "MissingGroupID",
            ControllerError::MissingProjectId => "MissingProjectID",
            ControllerError::GetFailed(_) => "GetFailed",
            ControllerError::CreateFailed(_) => "CreateFailed",
            ControllerError::UpdateFailed(_) => "UpdateFailed",
            ControllerError::DeleteFailed(_) => "DeleteFailed",
            ControllerError::LateInitialize { .. } => "LateInitializeFailed",
            ControllerError::MissingConnectionSecret => "MissingConnectionSecret",
            ControllerError::Kube(_) => "KubernetesError",
            ControllerError::GitLab(_) => "GitLabError",
            ControllerError::InvalidConfig(_) => "InvalidConfig",
            ControllerError::ProviderConfig(_) => "ProviderConfigError",
            ControllerError::Finalizer(_) => "FinalizerError",
            ControllerError::Serialization(_) => "SerializationError",
            ControllerError::Watch(_) => "WatchFailed",
            ControllerError::Io(_) => "IOError",
        }
    }
}
