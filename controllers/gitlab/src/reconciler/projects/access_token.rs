//! AccessToken adapter
//!
//! External name is the numeric token id. A revoked token stays visible in
//! GitLab but is reported as absent so a fresh one gets created.

use crate::error::ControllerError;
use crate::managed::compare::late_init;
use crate::managed::{
    downcast_mut, parse_id, require_id, ConnectionDetails, ExternalClient, ExternalCreation, ExternalObservation,
    ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{AccessLevel, AccessToken, AccessTokenObservation, AccessTokenParameters, Condition, Managed};
use gitlab_client::{self as gitlab, is_not_found, AccessTokenClient, GitLabClient};
use std::sync::Arc;
use tracing::info;

/// Connection detail key of the token secret
pub const TOKEN_KEY: &str = "token";

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<AccessToken> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(AccessTokenExternal::new(client))
}

pub struct AccessTokenExternal<C> {
    client: C,
}

impl<C: AccessTokenClient> AccessTokenExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn project_id(p: &AccessTokenParameters) -> Result<i64, ControllerError> {
    p.project_id.ok_or(ControllerError::MissingProjectId)
}

pub fn generate_observation(t: &gitlab::ProjectAccessToken) -> AccessTokenObservation {
    AccessTokenObservation {
        id: t.id,
        name: t.name.clone(),
        user_id: t.user_id,
        active: t.active,
        revoked: t.revoked,
        scopes: t.scopes.clone(),
        access_level: t.access_level,
        expires_at: t.expires_at,
        created_at: t.created_at,
        last_used_at: t.last_used_at,
    }
}

pub fn generate_create_options(p: &AccessTokenParameters) -> gitlab::CreateProjectAccessTokenOptions {
    gitlab::CreateProjectAccessTokenOptions {
        name: p.name.clone(),
        scopes: p.scopes.clone(),
        access_level: p.access_level.map(AccessLevel::value),
        expires_at: p.expires_at,
    }
}

/// Access level and expiry are filled from the token GitLab issued
pub fn late_initialize(p: &mut AccessTokenParameters, t: &gitlab::ProjectAccessToken) -> Result<bool, ControllerError> {
    let mut changed = late_init(&mut p.expires_at, t.expires_at);
    if p.access_level.is_none() && t.access_level != 0 {
        let level = AccessLevel::try_from(t.access_level).map_err(|message| ControllerError::LateInitialize {
            field: "accessLevel",
            message,
        })?;
        p.access_level = Some(level);
        changed = true;
    }
    Ok(changed)
}

#[async_trait]
impl<C: AccessTokenClient> ExternalClient for AccessTokenExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<AccessToken>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = parse_id(cr.external_name())?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let token = match self.client.get_project_access_token(project_id, id).await {
            Ok(t) => t,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&token));
        if token.revoked {
            info!("Access token {} of project {} was revoked", id, project_id);
            return Ok(ExternalObservation::absent());
        }

        let late_initialized = late_initialize(&mut cr.spec.for_provider, &token)?;
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: true,
            resource_late_initialized: late_initialized,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<AccessToken>(mg)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        let token = self
            .client
            .create_project_access_token(project_id, &generate_create_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Created access token {} for project {}", token.id, project_id);
        cr.set_external_name(token.id.to_string());

        let mut connection_details = ConnectionDetails::new();
        if let Some(secret) = token.token {
            connection_details.insert(TOKEN_KEY.to_string(), secret);
        }
        Ok(ExternalCreation { connection_details })
    }

    /// Access tokens are immutable
    async fn update(&mut self, _mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<AccessToken>(mg)?;
        let id = require_id(&*cr)?;
        let project_id = project_id(&cr.spec.for_provider)?;

        match self.client.revoke_project_access_token(project_id, id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
