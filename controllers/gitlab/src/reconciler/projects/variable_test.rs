use super::variable::*;
use crate::error::ControllerError;
use crate::managed::{ExternalClient, ExternalObservation};
use crate::test_utils::{create_test_variable, with_external_name};
use crds::{Managed, VariableType};
use gitlab_client::{self as gitlab, MockGitLabClient};

fn remote_variable(key: &str, value: &str, scope: &str) -> gitlab::ProjectVariable {
    gitlab::ProjectVariable {
        key: key.to_string(),
        value: value.to_string(),
        variable_type: "env_var".to_string(),
        environment_scope: scope.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_uses_key_as_external_name() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_variable("db-url", Some(7), "DATABASE_URL", "postgres://db");

    VariableExternal::new(mock.clone()).create(&mut cr).await.unwrap();
    assert_eq!(cr.external_name(), "DATABASE_URL");

    let observation = VariableExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert!(observation.resource_late_initialized);
    assert_eq!(cr.spec.for_provider.variable_type, Some(VariableType::EnvVar));
    assert_eq!(cr.spec.for_provider.environment_scope.as_deref(), Some("*"));
}

#[tokio::test]
async fn test_value_drift_is_updated() {
    let mock = MockGitLabClient::new();
    mock.add_variable(7, remote_variable("DATABASE_URL", "postgres://old", "*"));
    let mut cr = with_external_name(
        create_test_variable("db-url", Some(7), "DATABASE_URL", "postgres://new"),
        "DATABASE_URL",
    );

    let observation = VariableExternal::new(mock.clone()).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    VariableExternal::new(mock.clone()).update(&mut cr).await.unwrap();

    let observation = VariableExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_up_to_date);
}

#[tokio::test]
async fn test_environment_scope_selects_variable() {
    let mock = MockGitLabClient::new();
    mock.add_variable(7, remote_variable("DATABASE_URL", "postgres://prod", "production"));
    let mut cr = with_external_name(
        create_test_variable("db-url", Some(7), "DATABASE_URL", "postgres://prod"),
        "DATABASE_URL",
    );

    let observation = VariableExternal::new(mock.clone()).observe(&mut cr).await.unwrap();
    assert_eq!(observation, ExternalObservation::absent());

    cr.spec.for_provider.environment_scope = Some("production".to_string());
    let observation = VariableExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_exists);
}

#[test]
fn test_unset_flags_are_not_drift() {
    let cr = create_test_variable("db-url", Some(7), "DATABASE_URL", "postgres://db");
    let remote = gitlab::ProjectVariable {
        protected: true,
        masked: true,
        description: Some("managed elsewhere".to_string()),
        ..remote_variable("DATABASE_URL", "postgres://db", "*")
    };

    assert!(is_up_to_date(&cr.spec.for_provider, &remote));
}

#[tokio::test]
async fn test_missing_project_id_is_rejected() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(
        create_test_variable("db-url", None, "DATABASE_URL", "postgres://db"),
        "DATABASE_URL",
    );

    let result = VariableExternal::new(mock).observe(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::MissingProjectId)));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let mock = MockGitLabClient::new();
    mock.add_variable(7, remote_variable("DATABASE_URL", "postgres://db", "*"));
    let mut cr = with_external_name(
        create_test_variable("db-url", Some(7), "DATABASE_URL", "postgres://db"),
        "DATABASE_URL",
    );

    VariableExternal::new(mock.clone()).delete(&mut cr).await.unwrap();
    VariableExternal::new(mock.clone()).delete(&mut cr).await.unwrap();

    assert_eq!(mock.call_count("remove_variable"), 2);
}

#[test]
fn test_empty_description_is_not_adopted() {
    let mut cr = create_test_variable("db-url", Some(7), "DATABASE_URL", "postgres://db");
    let remote = gitlab::ProjectVariable {
        description: Some(String::new()),
        ..remote_variable("DATABASE_URL", "postgres://db", "*")
    };

    assert!(late_initialize(&mut cr.spec.for_provider, &remote));

    assert_eq!(cr.spec.for_provider.description, None);
    assert_eq!(cr.spec.for_provider.environment_scope.as_deref(), Some("*"));
}
