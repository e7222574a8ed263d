use super::deploy_token::*;
use crate::error::ControllerError;
use crate::managed::ExternalClient;
use crate::test_utils::{create_test_deploy_token, with_external_name};
use crds::{ConditionStatus, Managed};
use gitlab_client::{self as gitlab, MockGitLabClient};

#[tokio::test]
async fn test_token_is_published_on_create_only() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_deploy_token("registry-pull", Some(7));

    let created = DeployTokenExternal::new(mock.clone()).create(&mut cr).await.unwrap();
    assert_eq!(cr.external_name(), "1000");
    assert_eq!(created.connection_details.get(TOKEN_KEY).map(String::as_str), Some("gldt-1000"));

    let observation = DeployTokenExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert!(observation.connection_details.is_empty());
}

#[tokio::test]
async fn test_username_is_late_initialized() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_deploy_token("registry-pull", Some(7));
    DeployTokenExternal::new(mock.clone()).create(&mut cr).await.unwrap();

    let observation = DeployTokenExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(observation.resource_late_initialized);
    assert_eq!(cr.spec.for_provider.username.as_deref(), Some("gitlab+deploy-token-1000"));
}

#[tokio::test]
async fn test_revoked_token_is_unavailable() {
    let mock = MockGitLabClient::new();
    mock.add_deploy_token(
        7,
        gitlab::DeployToken {
            id: 5,
            name: "registry-pull".to_string(),
            username: "puller".to_string(),
            revoked: true,
            ..Default::default()
        },
    );
    let mut cr = with_external_name(create_test_deploy_token("registry-pull", Some(7)), "5");

    let observation = DeployTokenExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    let ready = &cr.status.as_ref().unwrap().conditions[0];
    assert_eq!(ready.status, ConditionStatus::False);
}

#[tokio::test]
async fn test_missing_project_id_is_rejected() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_deploy_token("registry-pull", None), "5");

    let result = DeployTokenExternal::new(mock.clone()).observe(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::MissingProjectId)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_update_is_a_no_op() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_deploy_token("registry-pull", Some(7)), "5");

    DeployTokenExternal::new(mock.clone()).update(&mut cr).await.unwrap();

    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_delete_tolerates_missing_token() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_deploy_token("registry-pull", Some(7)), "5");

    DeployTokenExternal::new(mock.clone()).delete(&mut cr).await.unwrap();

    assert_eq!(mock.calls(), vec!["delete_project_deploy_token:7:5".to_string()]);
}

#[tokio::test]
async fn test_delete_failure_is_reported() {
    let mock = MockGitLabClient::new();
    mock.fail_on("delete_project_deploy_token", 403, "forbidden");
    let mut cr = with_external_name(create_test_deploy_token("registry-pull", Some(7)), "5");

    let result = DeployTokenExternal::new(mock).delete(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::DeleteFailed(_))));
}
