//! Test utilities for unit testing adapters
//!
//! This module provides helpers for creating managed objects with sensible
//! parameters and for putting them into interesting lifecycle states.

#[cfg(test)]
use crds::*;
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

#[cfg(test)]
fn resource() -> ResourceSpec {
    ResourceSpec::default()
}

/// Helper to create a test Group CRD
#[cfg(test)]
pub fn create_test_group(name: &str, params: GroupParameters) -> Group {
    Group::new(
        name,
        GroupSpec {
            resource: resource(),
            for_provider: params,
        },
    )
}

/// Helper to create a test Project CRD
#[cfg(test)]
pub fn create_test_project(name: &str, params: ProjectParameters) -> Project {
    Project::new(
        name,
        ProjectSpec {
            resource: resource(),
            for_provider: params,
        },
    )
}

#[cfg(test)]
pub fn create_test_group_member(name: &str, group_id: Option<i64>, user_id: i64, level: AccessLevel) -> GroupMember {
    GroupMember::new(
        name,
        GroupMemberSpec {
            resource: resource(),
            for_provider: GroupMemberParameters {
                group_id,
                user_id,
                access_level: level,
                expires_at: None,
                member_role_id: None,
            },
        },
    )
}

#[cfg(test)]
pub fn create_test_saml_group_link(name: &str, group_id: Option<i64>, saml_name: &str, level: AccessLevel) -> SamlGroupLink {
    SamlGroupLink::new(
        name,
        SamlGroupLinkSpec {
            resource: resource(),
            for_provider: SamlGroupLinkParameters {
                group_id,
                name: saml_name.to_string(),
                access_level: level,
                member_role_id: None,
            },
        },
    )
}

#[cfg(test)]
pub fn create_test_ldap_group_link(name: &str, group_id: Option<i64>, cn: &str, level: AccessLevel) -> LdapGroupLink {
    LdapGroupLink::new(
        name,
        LdapGroupLinkSpec {
            resource: resource(),
            for_provider: LdapGroupLinkParameters {
                group_id,
                cn: cn.to_string(),
                group_access: level,
                ldap_provider: "ldapmain".to_string(),
            },
        },
    )
}

#[cfg(test)]
pub fn create_test_deploy_token(name: &str, project_id: Option<i64>) -> DeployToken {
    DeployToken::new(
        name,
        DeployTokenSpec {
            resource: resource(),
            for_provider: DeployTokenParameters {
                project_id,
                name: name.to_string(),
                username: None,
                expires_at: None,
                scopes: vec!["read_repository".to_string()],
            },
        },
    )
}

#[cfg(test)]
pub fn create_test_access_token(name: &str, project_id: Option<i64>) -> AccessToken {
    AccessToken::new(
        name,
        AccessTokenSpec {
            resource: resource(),
            for_provider: AccessTokenParameters {
                project_id,
                name: name.to_string(),
                scopes: vec!["read_api".to_string()],
                access_level: None,
                expires_at: None,
            },
        },
    )
}

#[cfg(test)]
pub fn create_test_variable(name: &str, project_id: Option<i64>, key: &str, value: &str) -> Variable {
    Variable::new(
        name,
        VariableSpec {
            resource: resource(),
            for_provider: VariableParameters {
                project_id,
                key: key.to_string(),
                value: value.to_string(),
                variable_type: None,
                protected: None,
                masked: None,
                raw: None,
                environment_scope: None,
                description: None,
            },
        },
    )
}

#[cfg(test)]
pub fn create_test_pipeline_schedule(name: &str, project_id: Option<i64>) -> PipelineSchedule {
    PipelineSchedule::new(
        name,
        PipelineScheduleSpec {
            resource: resource(),
            for_provider: PipelineScheduleParameters {
                project_id,
                description: "nightly".to_string(),
                git_ref: "main".to_string(),
                cron: "0 1 * * *".to_string(),
                cron_timezone: None,
                active: None,
                variables: None,
            },
        },
    )
}

/// Project runner with a connection secret reference
#[cfg(test)]
pub fn create_test_runner(name: &str) -> Runner {
    Runner::new(
        name,
        RunnerSpec {
            resource: ResourceSpec {
                write_connection_secret_to_ref: Some(SecretReference {
                    name: format!("{}-conn", name),
                    namespace: Some("ci".to_string()),
                }),
                ..resource()
            },
            for_provider: RunnerParameters {
                runner_type: RunnerType::ProjectType,
                group_id: None,
                project_id: Some(7),
                description: None,
                paused: None,
                locked: None,
                run_untagged: None,
                tag_list: None,
                access_level: None,
                maximum_timeout: None,
                maintenance_note: None,
            },
        },
    )
}

/// Set the external-name annotation
#[cfg(test)]
pub fn with_external_name<K: Managed>(mut mg: K, name: &str) -> K {
    mg.set_external_name(name.to_string());
    mg
}

/// Put the object into the deleting state
#[cfg(test)]
pub fn mark_deleting<K: Managed>(mg: &mut K) {
    let timestamp: Time = serde_json::from_value(serde_json::json!("2024-05-01T12:00:00Z")).unwrap();
    mg.meta_mut().deletion_timestamp = Some(timestamp);
}

/// Apply a JSON merge patch the way the API server does
#[cfg(test)]
pub fn apply_merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) {
    use serde_json::Value;

    let Value::Object(changes) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(fields) = target {
        for (key, value) in changes {
            if value.is_null() {
                fields.remove(key);
            } else {
                apply_merge_patch(fields.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
