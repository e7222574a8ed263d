//! Managed-resource lifecycle contract.
//!
//! Every GitLab kind is reconciled through the same four verbs. A
//! [`Connector`] turns a managed object into an [`ExternalClient`] bound to
//! the right GitLab instance; the generic [`reconciler`] then drives
//! observe, create, update and delete on it.
//!
//! A fresh external client is built for every reconcile, so adapters may
//! cache what they read during `observe` and reuse it in the verb that
//! follows without any locking.

pub mod compare;
pub mod reconciler;

use crate::error::ControllerError;
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::Managed;
use gitlab_client::{GitLabClient, GitLabError};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Keys and values published to the connection secret
pub type ConnectionDetails = BTreeMap<String, String>;

/// Result of looking at the remote object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalObservation {
    pub resource_exists: bool,
    pub resource_up_to_date: bool,
    /// `spec.forProvider` was filled from remote values and must be persisted
    pub resource_late_initialized: bool,
    pub connection_details: ConnectionDetails,
}

impl ExternalObservation {
    /// The remote object does not exist (or must be treated as gone)
    pub fn absent() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalCreation {
    pub connection_details: ConnectionDetails,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalUpdate {
    pub connection_details: ConnectionDetails,
}

/// Lifecycle verbs of one managed kind against GitLab
///
/// `observe` may late-initialize `spec.forProvider` and writes
/// `status.atProvider` and the `Ready` condition. `create` must set the
/// external name on success.
#[async_trait]
pub trait ExternalClient: Send {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError>;
    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError>;
    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError>;
    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError>;
}

/// Builds an [`ExternalClient`] for a managed object
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, mg: &dyn Managed) -> Result<Box<dyn ExternalClient>, ControllerError>;
}

/// Connector for kind `K`: checks the kind, resolves the ProviderConfig and
/// hands the authenticated client to the kind's adapter.
pub struct KindConnector<K> {
    resolver: Arc<ProviderConfigResolver>,
    make: fn(GitLabClient) -> Box<dyn ExternalClient>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KindConnector<K> {
    pub fn new(resolver: Arc<ProviderConfigResolver>, make: fn(GitLabClient) -> Box<dyn ExternalClient>) -> Self {
        Self {
            resolver,
            make,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: Managed> Connector for KindConnector<K> {
    async fn connect(&self, mg: &dyn Managed) -> Result<Box<dyn ExternalClient>, ControllerError> {
        if !mg.as_any().is::<K>() {
            return Err(ControllerError::WrongKind);
        }
        let client = self.resolver.gitlab_client(mg.resource_spec()).await?;
        Ok((self.make)(client))
    }
}

/// Downcast to the adapter's own kind
pub fn downcast_mut<K: Managed>(mg: &mut dyn Managed) -> Result<&mut K, ControllerError> {
    mg.as_any_mut()
        .downcast_mut::<K>()
        .ok_or(ControllerError::WrongKind)
}

/// Parse the external name of an integer-keyed kind
pub fn parse_id(external_name: &str) -> Result<i64, ControllerError> {
    external_name
        .parse::<i64>()
        .map_err(|_| ControllerError::IdNotInt(external_name.to_string()))
}

/// External name as an integer id, for verbs that need an existing object
pub fn require_id(mg: &dyn Managed) -> Result<i64, ControllerError> {
    match mg.external_name() {
        "" => Err(ControllerError::MissingExternalName),
        name => parse_id(name),
    }
}

/// External name as-is, for string-keyed kinds
pub fn require_name(mg: &dyn Managed) -> Result<String, ControllerError> {
    match mg.external_name() {
        "" => Err(ControllerError::MissingExternalName),
        name => Ok(name.to_string()),
    }
}

/// GitLab refuses to mark an already pending group or project again; for a
/// delete that is as good as success.
pub fn is_already_marked_for_deletion(err: &GitLabError) -> bool {
    match err {
        GitLabError::Api { status, message } if *status == 400 => {
            let message = message.to_lowercase();
            message.contains("already") && message.contains("marked for deletion")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("my-group"), Err(ControllerError::IdNotInt(s)) if s == "my-group"));
        assert!(matches!(parse_id(""), Err(ControllerError::IdNotInt(_))));
    }

    #[test]
    fn test_already_marked_detection() {
        assert!(is_already_marked_for_deletion(&GitLabError::Api {
            status: 400,
            message: "Group has been already marked for deletion".into(),
        }));
        assert!(is_already_marked_for_deletion(&GitLabError::Api {
            status: 400,
            message: r#"{"message":"Project has already been marked for deletion"}"#.into(),
        }));
        assert!(!is_already_marked_for_deletion(&GitLabError::Api {
            status: 400,
            message: "Group must be marked for deletion first.".into(),
        }));
        assert!(!is_already_marked_for_deletion(&GitLabError::NotFound("x".into())));
    }
}
