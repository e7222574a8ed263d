//! SamlGroupLink adapter
//!
//! External name is the SAML group name. GitLab has no edit endpoint for
//! SAML links, so drift is repaired by deleting and re-adding the link.

use crate::error::ControllerError;
use crate::managed::compare::late_init;
use crate::managed::{
    downcast_mut, require_name, ExternalClient, ExternalCreation, ExternalObservation, ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{Condition, Managed, SamlGroupLink, SamlGroupLinkObservation, SamlGroupLinkParameters};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, SamlGroupLinkClient};
use std::sync::Arc;
use tracing::{debug, info};

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<SamlGroupLink> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(SamlGroupLinkExternal::new(client))
}

pub struct SamlGroupLinkExternal<C> {
    client: C,
}

impl<C: SamlGroupLinkClient> SamlGroupLinkExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn group_id(p: &SamlGroupLinkParameters) -> Result<i64, ControllerError> {
    p.group_id.ok_or(ControllerError::MissingGroupId)
}

pub fn generate_observation(l: &gitlab::SamlGroupLink) -> SamlGroupLinkObservation {
    SamlGroupLinkObservation {
        name: l.name.clone(),
        access_level: l.access_level,
        member_role_id: l.member_role_id,
    }
}

pub fn generate_add_options(p: &SamlGroupLinkParameters) -> gitlab::AddSamlGroupLinkOptions {
    gitlab::AddSamlGroupLinkOptions {
        saml_group_name: p.name.clone(),
        access_level: p.access_level.value(),
        member_role_id: p.member_role_id,
    }
}

pub fn is_up_to_date(p: &SamlGroupLinkParameters, l: &gitlab::SamlGroupLink) -> bool {
    if p.access_level.value() != l.access_level {
        debug!("accessLevel changed: {} != {}", p.access_level.value(), l.access_level);
        return false;
    }
    if p.member_role_id.is_some() && p.member_role_id != l.member_role_id {
        debug!("memberRoleId changed");
        return false;
    }
    true
}

#[async_trait]
impl<C: SamlGroupLinkClient> ExternalClient for SamlGroupLinkExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<SamlGroupLink>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let group_id = group_id(&cr.spec.for_provider)?;

        let link = match self.client.get_saml_group_link(group_id, cr.external_name()).await {
            Ok(l) => l,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };

        let late_initialized = late_init(&mut cr.spec.for_provider.member_role_id, link.member_role_id);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &link);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&link));
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: Default::default(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<SamlGroupLink>(mg)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        let link = self
            .client
            .add_saml_group_link(group_id, &generate_add_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Linked SAML group {} to group {}", link.name, group_id);
        cr.set_external_name(link.name);
        Ok(ExternalCreation::default())
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<SamlGroupLink>(mg)?;
        let name = require_name(&*cr)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        debug!("Re-linking SAML group {} on group {}", name, group_id);
        match self.client.delete_saml_group_link(group_id, &name).await {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => {}
            Err(e) => return Err(ControllerError::UpdateFailed(e)),
        }
        self.client
            .add_saml_group_link(group_id, &generate_add_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::UpdateFailed)?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<SamlGroupLink>(mg)?;
        let name = require_name(&*cr)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        match self.client.delete_saml_group_link(group_id, &name).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
