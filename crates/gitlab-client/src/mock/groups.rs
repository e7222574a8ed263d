//! Group operations for MockGitLabClient
//!
//! Handles groups, sharing edges, members, SAML and LDAP group links

use super::{not_found, MockGitLabClient};
use crate::error::GitLabError;
use crate::models::*;

pub async fn get_group(client: &MockGitLabClient, id: i64) -> Result<Group, GitLabError> {
    client.record("get_group", id)?;
    client
        .groups
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("Group"))
}

pub async fn create_group(client: &MockGitLabClient, opts: &CreateGroupOptions) -> Result<Group, GitLabError> {
    client.record("create_group", &opts.path)?;

    let full_path = match opts.parent_id {
        Some(parent) => {
            let groups = client.groups.lock().unwrap();
            let parent = groups.get(&parent).ok_or_else(|| not_found("Parent Group"))?;
            format!("{}/{}", parent.full_path, opts.path)
        }
        None => opts.path.clone(),
    };
    if client
        .groups
        .lock()
        .unwrap()
        .values()
        .any(|g| g.full_path == full_path)
    {
        return Err(GitLabError::Api {
            status: 400,
            message: r#"{"path":["has already been taken"]}"#.to_string(),
        });
    }

    let id = client.next_id();
    let group = Group {
        id,
        name: opts.name.clone(),
        path: opts.path.clone(),
        description: opts.description.clone().unwrap_or_default(),
        visibility: opts.visibility.clone().unwrap_or_else(|| "private".to_string()),
        full_name: opts.name.clone(),
        full_path: full_path.clone(),
        web_url: format!("https://gitlab.example.com/groups/{}", full_path),
        parent_id: opts.parent_id,
        membership_lock: opts.membership_lock.unwrap_or_default(),
        share_with_group_lock: opts.share_with_group_lock.unwrap_or_default(),
        require_two_factor_authentication: opts.require_two_factor_authentication.unwrap_or_default(),
        two_factor_grace_period: opts.two_factor_grace_period.unwrap_or(48),
        project_creation_level: opts
            .project_creation_level
            .clone()
            .unwrap_or_else(|| "developer".to_string()),
        subgroup_creation_level: opts
            .subgroup_creation_level
            .clone()
            .unwrap_or_else(|| "maintainer".to_string()),
        auto_devops_enabled: opts.auto_devops_enabled,
        emails_disabled: opts.emails_disabled,
        mentions_disabled: opts.mentions_disabled,
        lfs_enabled: opts.lfs_enabled.unwrap_or(true),
        request_access_enabled: opts.request_access_enabled.unwrap_or(true),
        shared_runners_minutes_limit: opts.shared_runners_minutes_limit,
        extra_shared_runners_minutes_limit: opts.extra_shared_runners_minutes_limit,
        runners_token: Some(format!("GR1348941runners{}", id)),
        created_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    client.groups.lock().unwrap().insert(id, group.clone());
    Ok(group)
}

pub async fn update_group(client: &MockGitLabClient, id: i64, opts: &UpdateGroupOptions) -> Result<Group, GitLabError> {
    client.record("update_group", id)?;
    let mut groups = client.groups.lock().unwrap();
    let group = groups.get_mut(&id).ok_or_else(|| not_found("Group"))?;

    if let Some(v) = &opts.name {
        group.name = v.clone();
    }
    if let Some(v) = &opts.path {
        group.path = v.clone();
    }
    if let Some(v) = &opts.description {
        group.description = v.clone();
    }
    if let Some(v) = &opts.visibility {
        group.visibility = v.clone();
    }
    if let Some(v) = opts.membership_lock {
        group.membership_lock = v;
    }
    if let Some(v) = opts.share_with_group_lock {
        group.share_with_group_lock = v;
    }
    if let Some(v) = opts.require_two_factor_authentication {
        group.require_two_factor_authentication = v;
    }
    if let Some(v) = opts.two_factor_grace_period {
        group.two_factor_grace_period = v;
    }
    if let Some(v) = &opts.project_creation_level {
        group.project_creation_level = v.clone();
    }
    if let Some(v) = &opts.subgroup_creation_level {
        group.subgroup_creation_level = v.clone();
    }
    if opts.auto_devops_enabled.is_some() {
        group.auto_devops_enabled = opts.auto_devops_enabled;
    }
    if opts.emails_disabled.is_some() {
        group.emails_disabled = opts.emails_disabled;
    }
    if opts.mentions_disabled.is_some() {
        group.mentions_disabled = opts.mentions_disabled;
    }
    if let Some(v) = opts.lfs_enabled {
        group.lfs_enabled = v;
    }
    if let Some(v) = opts.request_access_enabled {
        group.request_access_enabled = v;
    }
    if opts.shared_runners_minutes_limit.is_some() {
        group.shared_runners_minutes_limit = opts.shared_runners_minutes_limit;
    }
    if opts.extra_shared_runners_minutes_limit.is_some() {
        group.extra_shared_runners_minutes_limit = opts.extra_shared_runners_minutes_limit;
    }
    Ok(group.clone())
}

pub async fn delete_group(client: &MockGitLabClient, id: i64, opts: &DeleteGroupOptions) -> Result<(), GitLabError> {
    client.record("delete_group", id)?;
    let delayed = client.delayed();
    let mut groups = client.groups.lock().unwrap();
    let group = groups.get_mut(&id).ok_or_else(|| not_found("Group"))?;

    if opts.permanently_remove == Some(true) {
        if group.marked_for_deletion_on.is_none() {
            return Err(GitLabError::Api {
                status: 400,
                message: "Group must be marked for deletion first.".to_string(),
            });
        }
        if opts.full_path.as_deref() != Some(group.full_path.as_str()) {
            return Err(GitLabError::Api {
                status: 400,
                message: "`full_path` is incorrect. You must enter the complete path for the subgroup.".to_string(),
            });
        }
        groups.remove(&id);
        return Ok(());
    }

    if !delayed {
        groups.remove(&id);
        return Ok(());
    }
    if group.marked_for_deletion_on.is_some() {
        return Err(GitLabError::Api {
            status: 400,
            message: "Group has been already marked for deletion".to_string(),
        });
    }
    group.marked_for_deletion_on = Some(chrono::Utc::now().date_naive());
    Ok(())
}

pub async fn share_group_with_group(client: &MockGitLabClient, id: i64, opts: &ShareGroupWithGroupOptions) -> Result<Group, GitLabError> {
    client.record("share_group_with_group", format!("{}:{}", id, opts.group_id))?;
    let mut groups = client.groups.lock().unwrap();
    let group = groups.get_mut(&id).ok_or_else(|| not_found("Group"))?;

    if group.shared_with_groups.iter().any(|s| s.group_id == opts.group_id) {
        return Err(GitLabError::Api {
            status: 409,
            message: "Shared group The group has already been shared with this group".to_string(),
        });
    }
    group.shared_with_groups.push(SharedGroup {
        group_id: opts.group_id,
        group_access_level: opts.group_access,
        expires_at: opts.expires_at,
        ..Default::default()
    });
    Ok(group.clone())
}

pub async fn unshare_group_from_group(client: &MockGitLabClient, id: i64, shared_group_id: i64) -> Result<(), GitLabError> {
    client.record("unshare_group_from_group", format!("{}:{}", id, shared_group_id))?;
    let mut groups = client.groups.lock().unwrap();
    let group = groups.get_mut(&id).ok_or_else(|| not_found("Group"))?;

    let before = group.shared_with_groups.len();
    group.shared_with_groups.retain(|s| s.group_id != shared_group_id);
    if group.shared_with_groups.len() == before {
        return Err(not_found("Group Link"));
    }
    Ok(())
}

pub async fn get_group_member(client: &MockGitLabClient, group_id: i64, user_id: i64) -> Result<GroupMember, GitLabError> {
    client.record("get_group_member", format!("{}:{}", group_id, user_id))?;
    client
        .group_members
        .lock()
        .unwrap()
        .get(&(group_id, user_id))
        .cloned()
        .ok_or_else(|| not_found("Member"))
}

pub async fn add_group_member(client: &MockGitLabClient, group_id: i64, opts: &AddGroupMemberOptions) -> Result<GroupMember, GitLabError> {
    client.record("add_group_member", format!("{}:{}", group_id, opts.user_id))?;
    let mut members = client.group_members.lock().unwrap();
    if members.contains_key(&(group_id, opts.user_id)) {
        return Err(GitLabError::Api {
            status: 409,
            message: "Member already exists".to_string(),
        });
    }
    let member = GroupMember {
        id: opts.user_id,
        username: format!("user{}", opts.user_id),
        name: format!("User {}", opts.user_id),
        state: "active".to_string(),
        access_level: opts.access_level,
        expires_at: parse_date(&opts.expires_at),
        member_role: opts.member_role_id.map(|id| MemberRole {
            id,
            ..Default::default()
        }),
        created_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    members.insert((group_id, opts.user_id), member.clone());
    Ok(member)
}

pub async fn edit_group_member(client: &MockGitLabClient, group_id: i64, user_id: i64, opts: &EditGroupMemberOptions) -> Result<GroupMember, GitLabError> {
    client.record("edit_group_member", format!("{}:{}", group_id, user_id))?;
    let mut members = client.group_members.lock().unwrap();
    let member = members
        .get_mut(&(group_id, user_id))
        .ok_or_else(|| not_found("Member"))?;
    member.access_level = opts.access_level;
    if opts.expires_at.is_some() {
        member.expires_at = parse_date(&opts.expires_at);
    }
    if let Some(id) = opts.member_role_id {
        member.member_role = Some(MemberRole {
            id,
            ..Default::default()
        });
    }
    Ok(member.clone())
}

pub async fn remove_group_member(client: &MockGitLabClient, group_id: i64, user_id: i64) -> Result<(), GitLabError> {
    client.record("remove_group_member", format!("{}:{}", group_id, user_id))?;
    client
        .group_members
        .lock()
        .unwrap()
        .remove(&(group_id, user_id))
        .map(|_| ())
        .ok_or_else(|| not_found("Member"))
}

pub async fn get_saml_group_link(client: &MockGitLabClient, group_id: i64, name: &str) -> Result<SamlGroupLink, GitLabError> {
    client.record("get_saml_group_link", format!("{}:{}", group_id, name))?;
    client
        .saml_links
        .lock()
        .unwrap()
        .get(&(group_id, name.to_string()))
        .cloned()
        .ok_or_else(|| not_found("SAML Group Link"))
}

pub async fn add_saml_group_link(client: &MockGitLabClient, group_id: i64, opts: &AddSamlGroupLinkOptions) -> Result<SamlGroupLink, GitLabError> {
    client.record("add_saml_group_link", format!("{}:{}", group_id, opts.saml_group_name))?;
    let link = SamlGroupLink {
        name: opts.saml_group_name.clone(),
        access_level: opts.access_level,
        member_role_id: opts.member_role_id,
    };
    client
        .saml_links
        .lock()
        .unwrap()
        .insert((group_id, link.name.clone()), link.clone());
    Ok(link)
}

pub async fn delete_saml_group_link(client: &MockGitLabClient, group_id: i64, name: &str) -> Result<(), GitLabError> {
    client.record("delete_saml_group_link", format!("{}:{}", group_id, name))?;
    client
        .saml_links
        .lock()
        .unwrap()
        .remove(&(group_id, name.to_string()))
        .map(|_| ())
        .ok_or_else(|| not_found("SAML Group Link"))
}

pub async fn list_ldap_group_links(client: &MockGitLabClient, group_id: i64) -> Result<Vec<LdapGroupLink>, GitLabError> {
    client.record("list_ldap_group_links", group_id)?;
    if !client.groups.lock().unwrap().contains_key(&group_id) {
        return Err(not_found("Group"));
    }
    Ok(client
        .ldap_links
        .lock()
        .unwrap()
        .get(&group_id)
        .cloned()
        .unwrap_or_default())
}

pub async fn add_ldap_group_link(client: &MockGitLabClient, group_id: i64, opts: &AddLdapGroupLinkOptions) -> Result<LdapGroupLink, GitLabError> {
    client.record("add_ldap_group_link", format!("{}:{}", group_id, opts.cn))?;
    let link = LdapGroupLink {
        cn: opts.cn.clone(),
        group_access: opts.group_access,
        provider: opts.provider.clone(),
        filter: None,
    };
    client
        .ldap_links
        .lock()
        .unwrap()
        .entry(group_id)
        .or_default()
        .push(link.clone());
    Ok(link)
}

pub async fn delete_ldap_group_link(client: &MockGitLabClient, group_id: i64, provider: &str, cn: &str) -> Result<(), GitLabError> {
    client.record("delete_ldap_group_link", format!("{}:{}:{}", group_id, provider, cn))?;
    let mut links = client.ldap_links.lock().unwrap();
    let entries = links.get_mut(&group_id).ok_or_else(|| not_found("Linked LDAP group"))?;
    let before = entries.len();
    entries.retain(|l| !(l.cn == cn && l.provider == provider));
    if entries.len() == before {
        return Err(not_found("Linked LDAP group"));
    }
    Ok(())
}

fn parse_date(value: &Option<String>) -> Option<chrono::NaiveDate> {
    value
        .as_deref()
        .and_then(|v| chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}
