use super::access_token::*;
use crate::error::ControllerError;
use crate::managed::{ExternalClient, ExternalObservation};
use crate::test_utils::{create_test_access_token, with_external_name};
use crds::{AccessLevel, Managed};
use gitlab_client::{self as gitlab, MockGitLabClient};

fn remote_token(id: i64, access_level: i64) -> gitlab::ProjectAccessToken {
    gitlab::ProjectAccessToken {
        id,
        name: "ci-bot".to_string(),
        active: true,
        scopes: vec!["read_api".to_string()],
        access_level,
        expires_at: chrono::NaiveDate::from_ymd_opt(2030, 1, 1),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_publishes_token_and_observe_does_not() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_access_token("ci-bot", Some(7));

    let created = AccessTokenExternal::new(mock.clone()).create(&mut cr).await.unwrap();
    assert_eq!(cr.external_name(), "1000");
    assert_eq!(created.connection_details.get(TOKEN_KEY).map(String::as_str), Some("glpat-1000"));

    let observation = AccessTokenExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert!(observation.connection_details.is_empty());
    assert_eq!(cr.spec.for_provider.access_level, Some(AccessLevel::Maintainer));
}

#[tokio::test]
async fn test_expiry_is_late_initialized() {
    let mock = MockGitLabClient::new();
    mock.add_access_token(7, remote_token(5, 30));
    let mut cr = with_external_name(create_test_access_token("ci-bot", Some(7)), "5");

    let observation = AccessTokenExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(observation.resource_late_initialized);
    assert_eq!(cr.spec.for_provider.expires_at, chrono::NaiveDate::from_ymd_opt(2030, 1, 1));
    assert_eq!(cr.spec.for_provider.access_level, Some(AccessLevel::Developer));
}

#[tokio::test]
async fn test_unknown_access_level_fails_late_initialization() {
    let mock = MockGitLabClient::new();
    mock.add_access_token(7, remote_token(5, 35));
    let mut cr = with_external_name(create_test_access_token("ci-bot", Some(7)), "5");

    let result = AccessTokenExternal::new(mock).observe(&mut cr).await;

    assert!(matches!(
        result,
        Err(ControllerError::LateInitialize { field: "accessLevel", .. })
    ));
}

#[tokio::test]
async fn test_revoked_token_is_absent() {
    let mock = MockGitLabClient::new();
    mock.add_access_token(
        7,
        gitlab::ProjectAccessToken {
            revoked: true,
            active: false,
            ..remote_token(5, 30)
        },
    );
    let mut cr = with_external_name(create_test_access_token("ci-bot", Some(7)), "5");

    let observation = AccessTokenExternal::new(mock).observe(&mut cr).await.unwrap();

    assert_eq!(observation, ExternalObservation::absent());
    assert!(cr.status.as_ref().unwrap().at_provider.as_ref().unwrap().revoked);
}

#[tokio::test]
async fn test_delete_revokes_token() {
    let mock = MockGitLabClient::new();
    mock.add_access_token(7, remote_token(5, 30));
    let mut cr = with_external_name(create_test_access_token("ci-bot", Some(7)), "5");

    AccessTokenExternal::new(mock.clone()).delete(&mut cr).await.unwrap();
    assert_eq!(mock.calls(), vec!["revoke_project_access_token:7:5".to_string()]);

    let observation = AccessTokenExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_exists);
}

#[tokio::test]
async fn test_delete_of_missing_token_succeeds() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_access_token("ci-bot", Some(7)), "5");

    AccessTokenExternal::new(mock).delete(&mut cr).await.unwrap();
}

#[tokio::test]
async fn test_missing_project_id_is_rejected() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_access_token("ci-bot", None);

    let result = AccessTokenExternal::new(mock).create(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::MissingProjectId)));
}
