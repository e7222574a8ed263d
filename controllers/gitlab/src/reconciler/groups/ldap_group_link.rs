//! LdapGroupLink adapter
//!
//! External name is the LDAP common name. GitLab only lists the links of a
//! group, so Observe lists and picks the link by CN and provider. Access
//! level drift is repaired by re-linking.

use crate::error::ControllerError;
use crate::managed::{
    downcast_mut, require_name, ExternalClient, ExternalCreation, ExternalObservation, ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{Condition, LdapGroupLink, LdapGroupLinkObservation, LdapGroupLinkParameters, Managed};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, LdapGroupLinkClient};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<LdapGroupLink> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(LdapGroupLinkExternal::new(client))
}

pub struct LdapGroupLinkExternal<C> {
    client: C,
}

impl<C: LdapGroupLinkClient> LdapGroupLinkExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn group_id(p: &LdapGroupLinkParameters) -> Result<i64, ControllerError> {
    p.group_id.ok_or(ControllerError::MissingGroupId)
}

pub fn generate_observation(l: &gitlab::LdapGroupLink) -> LdapGroupLinkObservation {
    LdapGroupLinkObservation {
        cn: l.cn.clone(),
        group_access: l.group_access,
        ldap_provider: l.provider.clone(),
        filter: l.filter.clone(),
    }
}

pub fn generate_add_options(p: &LdapGroupLinkParameters) -> gitlab::AddLdapGroupLinkOptions {
    gitlab::AddLdapGroupLinkOptions {
        cn: p.cn.clone(),
        group_access: p.group_access.value(),
        provider: p.ldap_provider.clone(),
    }
}

pub fn is_up_to_date(p: &LdapGroupLinkParameters, l: &gitlab::LdapGroupLink) -> bool {
    if p.group_access.value() != l.group_access {
        debug!("groupAccess changed: {} != {}", p.group_access.value(), l.group_access);
        return false;
    }
    true
}

/// Link with common name `cn`; links of other LDAP providers are ignored
/// unless no provider is known for the remote entry.
pub fn find_link<'a>(links: &'a [gitlab::LdapGroupLink], cn: &str, provider: &str) -> Option<&'a gitlab::LdapGroupLink> {
    links
        .iter()
        .find(|l| l.cn == cn && (l.provider.is_empty() || l.provider == provider))
}

#[async_trait]
impl<C: LdapGroupLinkClient> ExternalClient for LdapGroupLinkExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<LdapGroupLink>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let group_id = group_id(&cr.spec.for_provider)?;

        let links = match self.client.list_ldap_group_links(group_id).await {
            Ok(links) => links,
            Err(e) if is_not_found(&e) => {
                warn!("Group {} not found while listing LDAP links", group_id);
                return Ok(ExternalObservation::absent());
            }
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };
        let Some(link) = find_link(&links, cr.external_name(), &cr.spec.for_provider.ldap_provider) else {
            return Ok(ExternalObservation::absent());
        };

        let up_to_date = is_up_to_date(&cr.spec.for_provider, link);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(link));
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: false,
            connection_details: Default::default(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<LdapGroupLink>(mg)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        let link = self
            .client
            .add_ldap_group_link(group_id, &generate_add_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Linked LDAP group {} ({}) to group {}", link.cn, link.provider, group_id);
        cr.set_external_name(link.cn);
        Ok(ExternalCreation::default())
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<LdapGroupLink>(mg)?;
        let cn = require_name(&*cr)?;
        let group_id = group_id(&cr.spec.for_provider)?;
        let p = &cr.spec.for_provider;

        debug!("Re-linking LDAP group {} on group {}", cn, group_id);
        match self.client.delete_ldap_group_link(group_id, &p.ldap_provider, &cn).await {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => {}
            Err(e) => return Err(ControllerError::UpdateFailed(e)),
        }
        self.client
            .add_ldap_group_link(group_id, &generate_add_options(p))
            .await
            .map_err(ControllerError::UpdateFailed)?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<LdapGroupLink>(mg)?;
        let cn = require_name(&*cr)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        match self
            .client
            .delete_ldap_group_link(group_id, &cr.spec.for_provider.ldap_provider, &cn)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
