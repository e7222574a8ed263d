//! GroupMember adapter
//!
//! External name is the user id. `groupId` must be resolved before the member
//! can be observed.

use crate::error::ControllerError;
use crate::managed::compare::*;
use crate::managed::{
    downcast_mut, parse_id, require_id, ExternalClient, ExternalCreation, ExternalObservation, ExternalUpdate,
    KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{Condition, GroupMember, GroupMemberObservation, GroupMemberParameters, Managed};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, GroupMemberClient};
use std::sync::Arc;
use tracing::{debug, info};

/// Wire format of membership expiry dates
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<GroupMember> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(GroupMemberExternal::new(client))
}

pub struct GroupMemberExternal<C> {
    client: C,
}

impl<C: GroupMemberClient> GroupMemberExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn group_id(p: &GroupMemberParameters) -> Result<i64, ControllerError> {
    p.group_id.ok_or(ControllerError::MissingGroupId)
}

pub fn generate_observation(m: &gitlab::GroupMember) -> GroupMemberObservation {
    GroupMemberObservation {
        id: m.id,
        username: m.username.clone(),
        name: m.name.clone(),
        state: m.state.clone(),
        web_url: m.web_url.clone(),
        access_level: m.access_level,
        avatar_url: m.avatar_url.clone(),
        expires_at: m.expires_at,
        created_at: m.created_at,
        member_role_id: m.member_role.as_ref().map(|r| r.id),
    }
}

pub fn generate_add_options(p: &GroupMemberParameters) -> gitlab::AddGroupMemberOptions {
    gitlab::AddGroupMemberOptions {
        user_id: p.user_id,
        access_level: p.access_level.value(),
        expires_at: p.expires_at.clone(),
        member_role_id: p.member_role_id,
    }
}

pub fn generate_edit_options(p: &GroupMemberParameters) -> gitlab::EditGroupMemberOptions {
    gitlab::EditGroupMemberOptions {
        access_level: p.access_level.value(),
        expires_at: p.expires_at.clone(),
        member_role_id: p.member_role_id,
    }
}

pub fn is_up_to_date(p: &GroupMemberParameters, m: &gitlab::GroupMember) -> bool {
    if p.access_level.value() != m.access_level {
        debug!("accessLevel changed: {} != {}", p.access_level.value(), m.access_level);
        return false;
    }
    let remote_expiry = m.expires_at.map(|d| d.format(DATE_FORMAT).to_string());
    if !equal_optional_str(&p.expires_at, remote_expiry.as_deref()) {
        debug!("expiresAt changed: {:?} != {:?}", p.expires_at, remote_expiry);
        return false;
    }
    if p.member_role_id.is_some() && p.member_role_id != m.member_role.as_ref().map(|r| r.id) {
        debug!("memberRoleId changed");
        return false;
    }
    true
}

pub fn late_initialize(p: &mut GroupMemberParameters, m: &gitlab::GroupMember) -> bool {
    let mut changed = late_init(&mut p.expires_at, m.expires_at.map(|d| d.format(DATE_FORMAT).to_string()));
    changed |= late_init(&mut p.member_role_id, m.member_role.as_ref().map(|r| r.id));
    changed
}

#[async_trait]
impl<C: GroupMemberClient> ExternalClient for GroupMemberExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<GroupMember>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let user_id = parse_id(cr.external_name())?;
        let group_id = group_id(&cr.spec.for_provider)?;

        let member = match self.client.get_group_member(group_id, user_id).await {
            Ok(m) => m,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };

        let late_initialized = late_initialize(&mut cr.spec.for_provider, &member);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &member);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&member));
        cr.set_condition(Condition::available());

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: Default::default(),
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<GroupMember>(mg)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        let member = self
            .client
            .add_group_member(group_id, &generate_add_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        info!("Added user {} to group {}", member.id, group_id);
        cr.set_external_name(member.id.to_string());
        Ok(ExternalCreation::default())
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<GroupMember>(mg)?;
        let user_id = require_id(&*cr)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        self.client
            .edit_group_member(group_id, user_id, &generate_edit_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::UpdateFailed)?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<GroupMember>(mg)?;
        let user_id = require_id(&*cr)?;
        let group_id = group_id(&cr.spec.for_provider)?;

        match self.client.remove_group_member(group_id, user_id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
