use super::runner::*;
use crate::error::ControllerError;
use crate::managed::ExternalClient;
use crate::test_utils::{create_test_runner, with_external_name};
use crds::{Managed, RunnerAccessLevel, RunnerType};
use gitlab_client::{self as gitlab, MockGitLabClient};

fn remote_runner(id: i64) -> gitlab::Runner {
    gitlab::Runner {
        id,
        description: "builder".to_string(),
        runner_type: "project_type".to_string(),
        status: "online".to_string(),
        tag_list: vec!["docker".to_string(), "linux".to_string()],
        run_untagged: true,
        access_level: "not_protected".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_publishes_runner_token() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_runner("builder");

    let created = RunnerExternal::new(mock.clone()).create(&mut cr).await.unwrap();

    assert_eq!(cr.external_name(), "1000");
    assert_eq!(created.connection_details.get(TOKEN_KEY).map(String::as_str), Some("glrt-1000"));
    assert_eq!(mock.calls(), vec!["create_user_runner:project_type".to_string()]);
}

#[tokio::test]
async fn test_create_requires_connection_secret() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_runner("builder");
    cr.spec.resource.write_connection_secret_to_ref = None;

    let result = RunnerExternal::new(mock.clone()).create(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::MissingConnectionSecret)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_scope_id_must_match_runner_type() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_runner("builder");
    cr.spec.for_provider.runner_type = RunnerType::GroupType;

    let result = RunnerExternal::new(mock.clone()).create(&mut cr).await;
    assert!(matches!(result, Err(ControllerError::MissingGroupId)));

    cr.spec.for_provider.runner_type = RunnerType::ProjectType;
    cr.spec.for_provider.project_id = None;
    let result = RunnerExternal::new(mock.clone()).create(&mut cr).await;
    assert!(matches!(result, Err(ControllerError::MissingProjectId)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_observe_late_initializes_and_ignores_tag_order() {
    let mock = MockGitLabClient::new();
    mock.add_runner(remote_runner(9));
    let mut cr = with_external_name(create_test_runner("builder"), "9");
    cr.spec.for_provider.tag_list = Some(vec!["linux".to_string(), "docker".to_string()]);

    let observation = RunnerExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert!(observation.resource_late_initialized);
    assert!(observation.connection_details.is_empty());
    assert_eq!(cr.spec.for_provider.description.as_deref(), Some("builder"));
    assert_eq!(cr.spec.for_provider.access_level, Some(RunnerAccessLevel::NotProtected));
}

#[tokio::test]
async fn test_drift_is_updated() {
    let mock = MockGitLabClient::new();
    mock.add_runner(remote_runner(9));
    let mut cr = with_external_name(create_test_runner("builder"), "9");
    cr.spec.for_provider.paused = Some(true);
    cr.spec.for_provider.access_level = Some(RunnerAccessLevel::RefProtected);

    let observation = RunnerExternal::new(mock.clone()).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    RunnerExternal::new(mock.clone()).update(&mut cr).await.unwrap();

    let observation = RunnerExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_up_to_date);
    let observed = cr.status.as_ref().unwrap().at_provider.as_ref().unwrap();
    assert!(observed.paused);
    assert_eq!(observed.access_level, "ref_protected");
}

#[tokio::test]
async fn test_missing_runner_is_absent() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_runner("builder"), "9");

    let observation = RunnerExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(!observation.resource_exists);
}

#[tokio::test]
async fn test_delete_tolerates_missing_runner() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_runner("builder"), "9");

    RunnerExternal::new(mock.clone()).delete(&mut cr).await.unwrap();

    assert_eq!(mock.calls(), vec!["delete_runner:9".to_string()]);
}

#[test]
fn test_unset_parameters_are_not_drift() {
    let cr = create_test_runner("builder");
    let remote = gitlab::Runner {
        paused: true,
        locked: true,
        run_untagged: false,
        access_level: "ref_protected".to_string(),
        maximum_timeout: Some(3600),
        maintenance_note: Some("rebooted weekly".to_string()),
        ..remote_runner(9)
    };

    assert!(is_up_to_date(&cr.spec.for_provider, &remote));
}

#[test]
fn test_empty_maintenance_note_is_not_adopted() {
    let mut cr = create_test_runner("builder");
    let remote = gitlab::Runner {
        maintenance_note: Some(String::new()),
        ..remote_runner(9)
    };

    late_initialize(&mut cr.spec.for_provider, &remote);

    assert_eq!(cr.spec.for_provider.maintenance_note, None);
    assert_eq!(cr.spec.for_provider.description.as_deref(), Some("builder"));
}
