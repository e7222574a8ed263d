use super::project::*;
use crate::error::ControllerError;
use crate::managed::{ExternalClient, ExternalObservation};
use crate::managed::reconciler::status_merge_patch;
use crate::test_utils::{apply_merge_patch, create_test_project, mark_deleting, with_external_name};
use crds::{ConditionStatus, Managed, ProjectParameters, PushRules, Visibility};
use gitlab_client::{self as gitlab, MockGitLabClient};

fn params(name: &str) -> ProjectParameters {
    ProjectParameters {
        name: name.to_string(),
        ..Default::default()
    }
}

fn remote_project(id: i64, name: &str) -> gitlab::Project {
    gitlab::Project {
        id,
        name: name.to_string(),
        path: name.to_lowercase(),
        path_with_namespace: format!("platform/{}", name.to_lowercase()),
        visibility: "private".to_string(),
        ..Default::default()
    }
}

fn remote_rules(project_id: i64, commit_message_regex: &str) -> gitlab::ProjectPushRules {
    gitlab::ProjectPushRules {
        id: 1,
        project_id,
        commit_message_regex: Some(commit_message_regex.to_string()),
        ..Default::default()
    }
}

fn jira_rules() -> PushRules {
    PushRules {
        commit_message_regex: Some("^JIRA-\\d+".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_publishes_runners_token() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_project("app", params("App"));

    let created = ProjectExternal::new(mock.clone()).create(&mut cr).await.unwrap();

    assert_eq!(cr.external_name(), "1000");
    assert_eq!(
        created.connection_details.get(RUNNERS_TOKEN_KEY).map(String::as_str),
        Some("GR1348941project1000")
    );
    assert_eq!(mock.calls(), vec!["create_project:App".to_string()]);
}

#[tokio::test]
async fn test_observe_after_create_late_initializes_and_is_up_to_date() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_project("app", params("App"));
    ProjectExternal::new(mock.clone()).create(&mut cr).await.unwrap();

    let observation = ProjectExternal::new(mock.clone()).observe(&mut cr).await.unwrap();

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert!(observation.resource_late_initialized);
    assert_eq!(cr.spec.for_provider.visibility, Some(Visibility::Private));
    assert_eq!(cr.spec.for_provider.path.as_deref(), Some("app"));
    assert!(cr.spec.for_provider.push_rules.is_none());
    assert_eq!(
        observation.connection_details.get(RUNNERS_TOKEN_KEY).map(String::as_str),
        Some("GR1348941project1000")
    );

    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_late_initialized);
}

#[tokio::test]
async fn test_missing_project_is_absent() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_project("app", params("App")), "42");

    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();

    assert_eq!(observation, ExternalObservation::absent());
}

#[tokio::test]
async fn test_get_failure_is_reported() {
    let mock = MockGitLabClient::new();
    mock.fail_on("get_project", 500, "boom");
    let mut cr = with_external_name(create_test_project("app", params("App")), "42");

    let result = ProjectExternal::new(mock).observe(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::GetFailed(_))));
}

#[tokio::test]
async fn test_no_push_rules_on_either_side_makes_no_push_rule_calls() {
    let mock = MockGitLabClient::new();
    mock.add_project(remote_project(42, "App"));
    let mut cr = with_external_name(
        create_test_project(
            "app",
            ProjectParameters {
                description: Some("new".to_string()),
                ..params("App")
            },
        ),
        "42",
    );

    let mut external = ProjectExternal::new(mock.clone());
    let observation = external.observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    mock.reset_calls();
    external.update(&mut cr).await.unwrap();

    assert_eq!(mock.calls(), vec!["edit_project:42".to_string()]);
}

#[tokio::test]
async fn test_undesired_push_rules_are_removed() {
    let mock = MockGitLabClient::new();
    mock.add_project(remote_project(42, "App"));
    mock.set_push_rules(42, remote_rules(42, "^ABC"));
    let mut cr = with_external_name(create_test_project("app", params("App")), "42");

    let mut external = ProjectExternal::new(mock.clone());
    let observation = external.observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);
    assert!(cr.spec.for_provider.push_rules.is_none());

    external.update(&mut cr).await.unwrap();
    assert_eq!(mock.call_count("delete_project_push_rule"), 1);

    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_up_to_date);
}

#[tokio::test]
async fn test_removed_push_rules_leave_stored_status() {
    let mock = MockGitLabClient::new();
    mock.add_project(remote_project(17, "App"));
    mock.set_push_rules(17, remote_rules(17, "^JIRA"));
    let mut cr = with_external_name(create_test_project("app", params("App")), "17");

    let mut external = ProjectExternal::new(mock.clone());
    external.observe(&mut cr).await.unwrap();
    let mut stored = cr.status_value().unwrap();
    assert!(stored["atProvider"]["pushRules"].is_object());

    external.update(&mut cr).await.unwrap();
    ProjectExternal::new(mock).observe(&mut cr).await.unwrap();

    let patch = status_merge_patch(&stored, &cr.status_value().unwrap());
    apply_merge_patch(&mut stored, &patch);
    assert!(stored["atProvider"].get("pushRules").is_none());
}

#[tokio::test]
async fn test_restored_project_drops_deletion_mark_from_status() {
    let mock = MockGitLabClient::new();
    mock.add_project(gitlab::Project {
        marked_for_deletion_at: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
        ..remote_project(42, "App")
    });
    let mut cr = with_external_name(create_test_project("app", params("App")), "42");

    ProjectExternal::new(mock.clone()).observe(&mut cr).await.unwrap();
    let mut stored = cr.status_value().unwrap();
    assert!(stored["atProvider"]["markedForDeletionAt"].is_string());

    mock.add_project(remote_project(42, "App"));
    ProjectExternal::new(mock).observe(&mut cr).await.unwrap();

    let patch = status_merge_patch(&stored, &cr.status_value().unwrap());
    apply_merge_patch(&mut stored, &patch);
    assert!(stored["atProvider"].get("markedForDeletionAt").is_none());
}

#[tokio::test]
async fn test_desired_push_rules_are_added_when_absent() {
    let mock = MockGitLabClient::new();
    mock.add_project(remote_project(42, "App"));
    let mut cr = with_external_name(
        create_test_project(
            "app",
            ProjectParameters {
                push_rules: Some(jira_rules()),
                ..params("App")
            },
        ),
        "42",
    );

    let mut external = ProjectExternal::new(mock.clone());
    let observation = external.observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    mock.reset_calls();
    external.update(&mut cr).await.unwrap();
    assert_eq!(
        mock.calls(),
        vec!["edit_project:42".to_string(), "add_project_push_rule:42".to_string()]
    );

    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_up_to_date);
    let observed = cr.status.as_ref().unwrap().at_provider.as_ref().unwrap();
    assert_eq!(
        observed.push_rules.as_ref().unwrap().commit_message_regex.as_deref(),
        Some("^JIRA-\\d+")
    );
}

#[tokio::test]
async fn test_push_rule_drift_is_edited() {
    let mock = MockGitLabClient::new();
    mock.add_project(remote_project(42, "App"));
    mock.set_push_rules(42, remote_rules(42, "^ABC"));
    let mut cr = with_external_name(
        create_test_project(
            "app",
            ProjectParameters {
                push_rules: Some(jira_rules()),
                ..params("App")
            },
        ),
        "42",
    );

    let mut external = ProjectExternal::new(mock.clone());
    let observation = external.observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    external.update(&mut cr).await.unwrap();
    assert_eq!(mock.call_count("edit_project_push_rule"), 1);
    assert_eq!(mock.call_count("add_project_push_rule"), 0);
}

#[tokio::test]
async fn test_create_never_touches_push_rules() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_project(
        "app",
        ProjectParameters {
            push_rules: Some(jira_rules()),
            ..params("App")
        },
    );

    ProjectExternal::new(mock.clone()).create(&mut cr).await.unwrap();

    assert_eq!(mock.call_count("add_project_push_rule"), 0);
}

#[test]
fn test_edit_options_carry_mutable_fields() {
    let p = ProjectParameters {
        path: Some("app".to_string()),
        namespace_id: Some(7),
        initialize_with_readme: Some(true),
        description: Some("Application".to_string()),
        topics: Some(vec!["rust".to_string()]),
        ..params("App")
    };

    let opts = generate_edit_options(&p);

    assert_eq!(opts.name.as_deref(), Some("App"));
    assert_eq!(opts.path.as_deref(), Some("app"));
    assert_eq!(opts.description.as_deref(), Some("Application"));
    assert_eq!(opts.settings.topics, Some(vec!["rust".to_string()]));
    assert_eq!(generate_create_options(&p).namespace_id, Some(7));
}

#[tokio::test]
async fn test_pending_deletion_is_unavailable_but_up_to_date() {
    let mock = MockGitLabClient::new();
    mock.add_project(gitlab::Project {
        marked_for_deletion_at: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
        ..remote_project(42, "App")
    });
    let mut cr = with_external_name(create_test_project("app", params("Renamed")), "42");

    let observation = ProjectExternal::new(mock.clone()).observe(&mut cr).await.unwrap();

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert_eq!(mock.call_count("get_project_push_rules"), 0);
    let ready = &cr.status.as_ref().unwrap().conditions[0];
    assert_eq!(ready.status, ConditionStatus::False);
}

#[tokio::test]
async fn test_pending_deletion_releases_finalizer_when_asked() {
    let mock = MockGitLabClient::new();
    mock.add_project(gitlab::Project {
        marked_for_deletion_at: chrono::NaiveDate::from_ymd_opt(2024, 5, 1),
        ..remote_project(42, "App")
    });
    let mut cr = with_external_name(
        create_test_project(
            "app",
            ProjectParameters {
                remove_finalizer_on_pending_deletion: Some(true),
                ..params("App")
            },
        ),
        "42",
    );
    mark_deleting(&mut cr);

    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(!observation.resource_exists);
}

#[tokio::test]
async fn test_two_phase_delete_removes_project_permanently() {
    let mock = MockGitLabClient::new();
    mock.set_delayed_deletion(true);
    mock.add_project(remote_project(42, "App"));
    let mut cr = with_external_name(
        create_test_project(
            "app",
            ProjectParameters {
                permanently_remove: Some(true),
                ..params("App")
            },
        ),
        "42",
    );

    let mut external = ProjectExternal::new(mock.clone());
    external.observe(&mut cr).await.unwrap();
    external.delete(&mut cr).await.unwrap();

    assert_eq!(mock.call_count("delete_project"), 2);
    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_exists);
}

#[tokio::test]
async fn test_delayed_delete_only_marks_project() {
    let mock = MockGitLabClient::new();
    mock.set_delayed_deletion(true);
    mock.add_project(remote_project(42, "App"));
    let mut cr = with_external_name(create_test_project("app", params("App")), "42");

    ProjectExternal::new(mock.clone()).delete(&mut cr).await.unwrap();

    assert_eq!(mock.call_count("delete_project"), 1);
    let observation = ProjectExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_exists);
}

#[tokio::test]
async fn test_delete_of_missing_project_succeeds() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_project("app", params("App")), "42");

    ProjectExternal::new(mock).delete(&mut cr).await.unwrap();
}

#[test]
fn test_unset_parameters_are_not_drift() {
    let remote = gitlab::Project {
        description: Some("legacy".to_string()),
        default_branch: Some("trunk".to_string()),
        visibility: "internal".to_string(),
        topics: vec!["rust".to_string(), "ci".to_string()],
        issues_enabled: true,
        merge_requests_enabled: true,
        wiki_enabled: true,
        jobs_enabled: true,
        snippets_enabled: true,
        container_registry_enabled: true,
        lfs_enabled: true,
        request_access_enabled: true,
        shared_runners_enabled: true,
        only_allow_merge_if_pipeline_succeeds: true,
        only_allow_merge_if_all_discussions_are_resolved: true,
        merge_method: "ff".to_string(),
        squash_option: "always".to_string(),
        remove_source_branch_after_merge: Some(true),
        printing_merge_request_link_enabled: true,
        ci_config_path: Some("ci/main.yml".to_string()),
        build_timeout: 7200,
        auto_devops_enabled: Some(false),
        ..remote_project(42, "App")
    };

    // push rules are the one sub-resource whose absence is itself desired
    assert!(is_up_to_date(&params("App"), &remote, None));
}
