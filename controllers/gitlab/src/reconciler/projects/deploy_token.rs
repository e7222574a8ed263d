//! DeployToken adapter
//!
//! External name is the numeric token id. Deploy tokens cannot be edited, and
//! the secret is only returned by the creation call, so it is published under
//! `token` from Create and never from Observe.

use crate::error::ControllerError;
use crate::managed::compare::late_init_str;
use crate::managed::{
    downcast_mut, parse_id, require_id, ConnectionDetails, ExternalClient, ExternalCreation, ExternalObservation,
    ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{Condition, DeployToken, DeployTokenObservation, DeployTokenParameters, Managed};
use gitlab_client::{self as gitlab, is_not_found, DeployTokenClient, GitLabClient};
use std::sync::Arc;
use tracing::{info, warn};

/// Connection detail key of the token secret
pub const TOKEN_KEY: &str = "token";

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<DeployToken> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(DeployTokenExternal::new(client))
}

pub struct DeployTokenExternal<C> {
    client: C,
}

impl<C: DeployTokenClient> DeployTokenExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn project_id(p: &DeployTokenParameters) -> Result<i64, ControllerError> {
    p.project_id.ok_or(ControllerError::MissingProjectId)
}

pub fn generate_observation(t: &gitlab::DeployToken) -> DeployTokenObservation {
    DeployTokenObservation {
        id: t.id,
        name: t.name.clone(),
        username: t.username.clone(),
        expires_at: t.expires_at,
        scopes: t.scopes.clone(),
        revoked: t.revoked,
        expired: t.expired,
    }
}

pub fn generate_create_options(p: &DeployTokenParameters) -> gitlab::CreateDeployTokenOptions {
    gitlab::CreateDeployTokenOptions {
        name: p.name.clone(),
        scopes: p.scopes.clone(),
        expires_at: p.expires_at,
        username: p.username.clone(),
    }
}

#[async_trait]
impl<C: DeployTokenClient> ExternalClient for DeployTokenExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<DeployToken>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = parse_id(cr.external_name())?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let token = match self.client.get_project_deploy_token(project_id, id).await {
            Ok(t) => t,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };

        let late_initialized = late_init_str(&mut cr.spec.for_provider.username, &token.username);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&token));
        if token.revoked || token.expired {
            warn!("Deploy token {} of project {} is no longer valid", id, project_id);
            cr.set_condition(Condition::unavailable("deploy token is revoked or expired"));
        } else {
            cr.set_condition(Condition::available());
        }

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: true,
            resource_late_initialized: late_initialized,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<DeployToken>(mg)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let token = self
            .client
            .create_project_deploy_token(project_id, &generate_create_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Created deploy token {} for project {}", token.id, project_id);
        cr.set_external_name(token.id.to_string());

        let mut connection_details = ConnectionDetails::new();
        if let Some(secret) = token.token {
            connection_details.insert(TOKEN_KEY.to_string(), secret);
        }
        Ok(ExternalCreation { connection_details })
    }

    /// Deploy tokens are immutable
    async fn update(&mut self, _mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<DeployToken>(mg)?;
        let id = require_id(&*cr)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        match self.client.delete_project_deploy_token(project_id, id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
