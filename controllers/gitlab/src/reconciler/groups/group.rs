//! Group adapter
//!
//! External name is the numeric group id. Sharing edges listed in
//! `sharedWithGroups` are reconciled as a set; an edge whose access level or
//! expiry changed is removed and added again.

use crate::error::ControllerError;
use crate::managed::compare::*;
use crate::managed::{
    downcast_mut, is_already_marked_for_deletion, parse_id, require_id, ConnectionDetails, ExternalClient,
    ExternalCreation, ExternalObservation, ExternalUpdate, KindConnector,
};
use crate::provider_config::ProviderConfigResolver;
use async_trait::async_trait;
use crds::{
    Condition, Group, GroupObservation, GroupParameters, Managed, SharedWithGroup, SharedWithGroupObservation,
};
use gitlab_client::{self as gitlab, is_not_found, GitLabClient, GroupClient};
use std::sync::Arc;
use tracing::{debug, info};

/// Connection detail key of the group runners registration token
pub const RUNNERS_TOKEN_KEY: &str = "runnersToken";

pub fn connector(resolver: Arc<ProviderConfigResolver>) -> KindConnector<Group> {
    KindConnector::new(resolver, external)
}

fn external(client: GitLabClient) -> Box<dyn ExternalClient> {
    Box::new(GroupExternal::new(client))
}

pub struct GroupExternal<C> {
    client: C,
    /// Group read by `observe` in this pass
    observed: Option<gitlab::Group>,
}

impl<C: GroupClient> GroupExternal<C> {
    pub fn new(client: C) -> Self {
        Self { client, observed: None }
    }
}

pub fn generate_observation(g: &gitlab::Group) -> GroupObservation {
    GroupObservation {
        id: g.id,
        name: g.name.clone(),
        path: g.path.clone(),
        full_name: g.full_name.clone(),
        full_path: g.full_path.clone(),
        web_url: g.web_url.clone(),
        description: g.description.clone(),
        visibility: g.visibility.clone(),
        avatar_url: g.avatar_url.clone(),
        parent_id: g.parent_id,
        created_at: g.created_at,
        marked_for_deletion_on: g.marked_for_deletion_on,
        shared_with_groups: g
            .shared_with_groups
            .iter()
            .map(|s| SharedWithGroupObservation {
                group_id: s.group_id,
                group_name: s.group_name.clone(),
                group_full_path: s.group_full_path.clone(),
                group_access_level: s.group_access_level,
                expires_at: s.expires_at,
            })
            .collect(),
    }
}

pub fn generate_create_options(p: &GroupParameters) -> gitlab::CreateGroupOptions {
    gitlab::CreateGroupOptions {
        name: p.name.clone(),
        path: p.path.clone(),
        description: p.description.clone(),
        visibility: p.visibility.map(|v| v.as_str().to_string()),
        parent_id: p.parent_id,
        membership_lock: p.membership_lock,
        share_with_group_lock: p.share_with_group_lock,
        require_two_factor_authentication: p.require_two_factor_authentication,
        two_factor_grace_period: p.two_factor_grace_period,
        project_creation_level: p.project_creation_level.map(|v| v.as_str().to_string()),
        subgroup_creation_level: p.subgroup_creation_level.map(|v| v.as_str().to_string()),
        auto_devops_enabled: p.auto_devops_enabled,
        emails_disabled: p.emails_disabled,
        mentions_disabled: p.mentions_disabled,
        lfs_enabled: p.lfs_enabled,
        request_access_enabled: p.request_access_enabled,
        shared_runners_minutes_limit: p.shared_runners_minutes_limit,
        extra_shared_runners_minutes_limit: p.extra_shared_runners_minutes_limit,
    }
}

/// `parentId` is immutable and never sent on update
pub fn generate_update_options(p: &GroupParameters) -> gitlab::UpdateGroupOptions {
    gitlab::UpdateGroupOptions {
        name: Some(p.name.clone()),
        path: Some(p.path.clone()),
        description: p.description.clone(),
        visibility: p.visibility.map(|v| v.as_str().to_string()),
        membership_lock: p.membership_lock,
        share_with_group_lock: p.share_with_group_lock,
        require_two_factor_authentication: p.require_two_factor_authentication,
        two_factor_grace_period: p.two_factor_grace_period,
        project_creation_level: p.project_creation_level.map(|v| v.as_str().to_string()),
        subgroup_creation_level: p.subgroup_creation_level.map(|v| v.as_str().to_string()),
        auto_devops_enabled: p.auto_devops_enabled,
        emails_disabled: p.emails_disabled,
        mentions_disabled: p.mentions_disabled,
        lfs_enabled: p.lfs_enabled,
        request_access_enabled: p.request_access_enabled,
        shared_runners_minutes_limit: p.shared_runners_minutes_limit,
        extra_shared_runners_minutes_limit: p.extra_shared_runners_minutes_limit,
    }
}

fn share_matches(desired: &SharedWithGroup, remote: &gitlab::SharedGroup) -> bool {
    desired.group_access.value() == remote.group_access_level
        && desired.expires_at.map_or(true, |e| Some(e) == remote.expires_at)
}

/// Edges to remove and edges to add so that the remote set matches `desired`
pub fn share_diff<'a>(
    desired: &'a [SharedWithGroup],
    remote: &[gitlab::SharedGroup],
) -> (Vec<i64>, Vec<&'a SharedWithGroup>) {
    let to_remove = remote
        .iter()
        .filter(|r| !desired.iter().any(|d| d.group_id == r.group_id && share_matches(d, r)))
        .map(|r| r.group_id)
        .collect();
    let to_add = desired
        .iter()
        .filter(|d| !remote.iter().any(|r| d.group_id == r.group_id && share_matches(d, r)))
        .collect();
    (to_remove, to_add)
}

pub fn is_up_to_date(p: &GroupParameters, g: &gitlab::Group) -> bool {
    if p.name != g.name {
        debug!("name changed: {} != {}", p.name, g.name);
        return false;
    }
    if p.path != g.path {
        debug!("path changed: {} != {}", p.path, g.path);
        return false;
    }
    if !equal_optional_str(&p.description, Some(g.description.as_str())) {
        debug!("description changed: {:?} != {:?}", p.description, g.description);
        return false;
    }
    if !equal_optional_enum(&p.visibility, &g.visibility) {
        debug!("visibility changed: {:?} != {}", p.visibility, g.visibility);
        return false;
    }
    if !equal_optional(&p.membership_lock, &g.membership_lock) {
        debug!("membershipLock changed");
        return false;
    }
    if !equal_optional(&p.share_with_group_lock, &g.share_with_group_lock) {
        debug!("shareWithGroupLock changed");
        return false;
    }
    if !equal_optional(&p.require_two_factor_authentication, &g.require_two_factor_authentication) {
        debug!("requireTwoFactorAuthentication changed");
        return false;
    }
    if !equal_optional(&p.two_factor_grace_period, &g.two_factor_grace_period) {
        debug!("twoFactorGracePeriod changed");
        return false;
    }
    if !equal_optional_enum(&p.project_creation_level, &g.project_creation_level) {
        debug!("projectCreationLevel changed: {:?} != {}", p.project_creation_level, g.project_creation_level);
        return false;
    }
    if !equal_optional_enum(&p.subgroup_creation_level, &g.subgroup_creation_level) {
        debug!("subgroupCreationLevel changed: {:?} != {}", p.subgroup_creation_level, g.subgroup_creation_level);
        return false;
    }
    if p.auto_devops_enabled.is_some() && p.auto_devops_enabled != g.auto_devops_enabled {
        debug!("autoDevopsEnabled changed");
        return false;
    }
    if p.emails_disabled.is_some() && p.emails_disabled != g.emails_disabled {
        debug!("emailsDisabled changed");
        return false;
    }
    if p.mentions_disabled.is_some() && p.mentions_disabled != g.mentions_disabled {
        debug!("mentionsDisabled changed");
        return false;
    }
    if !equal_optional(&p.lfs_enabled, &g.lfs_enabled) {
        debug!("lfsEnabled changed");
        return false;
    }
    if !equal_optional(&p.request_access_enabled, &g.request_access_enabled) {
        debug!("requestAccessEnabled changed");
        return false;
    }
    if p.shared_runners_minutes_limit.is_some() && p.shared_runners_minutes_limit != g.shared_runners_minutes_limit {
        debug!("sharedRunnersMinutesLimit changed");
        return false;
    }
    if p.extra_shared_runners_minutes_limit.is_some()
        && p.extra_shared_runners_minutes_limit != g.extra_shared_runners_minutes_limit
    {
        debug!("extraSharedRunnersMinutesLimit changed");
        return false;
    }
    if let Some(desired) = &p.shared_with_groups {
        let (to_remove, to_add) = share_diff(desired, &g.shared_with_groups);
        if !to_remove.is_empty() || !to_add.is_empty() {
            debug!("sharedWithGroups changed: remove {:?}, add {} edge(s)", to_remove, to_add.len());
            return false;
        }
    }
    true
}

/// Fill unset parameters from the remote group; sharing edges are never
/// adopted, an omitted list stays unmanaged.
pub fn late_initialize(p: &mut GroupParameters, g: &gitlab::Group) -> bool {
    let mut changed = false;
    changed |= late_init_str(&mut p.description, &g.description);
    changed |= late_init_enum(&mut p.visibility, &g.visibility);
    changed |= late_init(&mut p.parent_id, g.parent_id);
    changed |= late_init(&mut p.membership_lock, Some(g.membership_lock));
    changed |= late_init(&mut p.share_with_group_lock, Some(g.share_with_group_lock));
    changed |= late_init(
        &mut p.require_two_factor_authentication,
        Some(g.require_two_factor_authentication),
    );
    changed |= late_init_int(&mut p.two_factor_grace_period, g.two_factor_grace_period);
    changed |= late_init_enum(&mut p.project_creation_level, &g.project_creation_level);
    changed |= late_init_enum(&mut p.subgroup_creation_level, &g.subgroup_creation_level);
    changed |= late_init(&mut p.auto_devops_enabled, g.auto_devops_enabled);
    changed |= late_init(&mut p.emails_disabled, g.emails_disabled);
    changed |= late_init(&mut p.mentions_disabled, g.mentions_disabled);
    changed |= late_init(&mut p.lfs_enabled, Some(g.lfs_enabled));
    changed |= late_init(&mut p.request_access_enabled, Some(g.request_access_enabled));
    changed |= late_init(&mut p.shared_runners_minutes_limit, g.shared_runners_minutes_limit);
    changed |= late_init(
        &mut p.extra_shared_runners_minutes_limit,
        g.extra_shared_runners_minutes_limit,
    );
    changed
}

fn connection_details(g: &gitlab::Group) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    if let Some(token) = &g.runners_token {
        details.insert(RUNNERS_TOKEN_KEY.to_string(), token.clone());
    }
    details
}

#[async_trait]
impl<C: GroupClient> ExternalClient for GroupExternal<C> {
    async fn observe(&mut self, mg: &mut dyn Managed) -> Result<ExternalObservation, ControllerError> {
        let cr = downcast_mut::<Group>(mg)?;
        if cr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = parse_id(cr.external_name())?;

        let group = match self.client.get_group(id).await {
            Ok(g) => g,
            Err(e) if is_not_found(&e) => return Ok(ExternalObservation::absent()),
            Err(e) => return Err(ControllerError::GetFailed(e)),
        };
        let details = connection_details(&group);
        cr.status.get_or_insert_with(Default::default).at_provider = Some(generate_observation(&group));

        if let Some(since) = group.marked_for_deletion_on {
            cr.set_condition(Condition::unavailable(format!("group is marked for deletion on {}", since)));
            let release = cr.spec.for_provider.remove_finalizer_on_pending_deletion == Some(true);
            self.observed = Some(group);
            if cr.is_being_deleted() && release {
                return Ok(ExternalObservation::absent());
            }
            return Ok(ExternalObservation {
                resource_exists: true,
                resource_up_to_date: true,
                resource_late_initialized: false,
                connection_details: details,
            });
        }

        let late_initialized = late_initialize(&mut cr.spec.for_provider, &group);
        let up_to_date = is_up_to_date(&cr.spec.for_provider, &group);
        cr.set_condition(Condition::available());
        self.observed = Some(group);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details: details,
        })
    }

    async fn create(&mut self, mg: &mut dyn Managed) -> Result<ExternalCreation, ControllerError> {
        let cr = downcast_mut::<Group>(mg)?;
        let group = self
            .client
            .create_group(&generate_create_options(&cr.spec.for_provider))
            .await
            .map_err(ControllerError::CreateFailed)?;
        cr.set_external_name(group.id.to_string());

        Ok(ExternalCreation {
            connection_details: connection_details(&group),
        })
    }

    async fn update(&mut self, mg: &mut dyn Managed) -> Result<ExternalUpdate, ControllerError> {
        let cr = downcast_mut::<Group>(mg)?;
        let id = require_id(&*cr)?;
        let p = &cr.spec.for_provider;

        self.client
            .update_group(id, &generate_update_options(p))
            .await
            .map_err(ControllerError::UpdateFailed)?;

        if let Some(desired) = &p.shared_with_groups {
            let remote = match &self.observed {
                Some(g) => g.shared_with_groups.clone(),
                None => {
                    self.client
                        .get_group(id)
                        .await
                        .map_err(ControllerError::GetFailed)?
                        .shared_with_groups
                }
            };
            let (to_remove, to_add) = share_diff(desired, &remote);
            for shared_group_id in to_remove {
                debug!("Unsharing group {} from group {}", id, shared_group_id);
                match self.client.unshare_group_from_group(id, shared_group_id).await {
                    Ok(()) => {}
                    Err(e) if is_not_found(&e) => {}
                    Err(e) => return Err(ControllerError::UpdateFailed(e)),
                }
            }
            for share in to_add {
                debug!("Sharing group {} with group {}", id, share.group_id);
                self.client
                    .share_group_with_group(
                        id,
                        &gitlab::ShareGroupWithGroupOptions {
                            group_id: share.group_id,
                            group_access: share.group_access.value(),
                            expires_at: share.expires_at,
                        },
                    )
                    .await
                    .map_err(ControllerError::UpdateFailed)?;
            }
        }
        Ok(ExternalUpdate::default())
    }

    async fn delete(&mut self, mg: &mut dyn Managed) -> Result<(), ControllerError> {
        let cr = downcast_mut::<Group>(mg)?;
        let id = require_id(&*cr)?;

        match self.client.delete_group(id, &gitlab::DeleteGroupOptions::default()).await {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => return Ok(()),
            Err(e) if is_already_marked_for_deletion(&e) => {}
            Err(e) => return Err(ControllerError::DeleteFailed(e)),
        }

        // only subgroups can skip the delayed deletion period
        let p = &cr.spec.for_provider;
        if p.permanently_remove != Some(true) || p.parent_id.is_none() {
            return Ok(());
        }
        let full_path = self
            .observed
            .as_ref()
            .map(|g| g.full_path.clone())
            .or_else(|| cr.status.as_ref()?.at_provider.as_ref().map(|o| o.full_path.clone()))
            .filter(|path| !path.is_empty());
        let Some(full_path) = full_path else {
            return Ok(());
        };
        info!("Permanently removing group {} ({})", id, full_path);
        let opts = gitlab::DeleteGroupOptions {
            permanently_remove: Some(true),
            full_path: Some(full_path),
        };
        match self.client.delete_group(id, &opts).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(ControllerError::DeleteFailed(e)),
        }
    }
}
