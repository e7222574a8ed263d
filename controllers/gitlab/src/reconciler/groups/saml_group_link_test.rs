use super::saml_group_link::*;
use crate::error::ControllerError;
use crate::managed::{ExternalClient, ExternalObservation};
use crate::test_utils::{create_test_saml_group_link, with_external_name};
use crds::{AccessLevel, Managed};
use gitlab_client::{self as gitlab, MockGitLabClient};

#[tokio::test]
async fn test_missing_link_is_absent() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(
        create_test_saml_group_link("saml-example", Some(1234), "Saml-example", AccessLevel::Developer),
        "Saml-example",
    );

    let observation = SamlGroupLinkExternal::new(mock.clone()).observe(&mut cr).await.unwrap();

    assert_eq!(observation, ExternalObservation::absent());
    assert_eq!(mock.calls(), vec!["get_saml_group_link:1234:Saml-example".to_string()]);
}

#[tokio::test]
async fn test_missing_group_id_is_rejected() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(
        create_test_saml_group_link("saml-example", None, "Saml-example", AccessLevel::Developer),
        "Saml-example",
    );

    let result = SamlGroupLinkExternal::new(mock).observe(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::MissingGroupId)));
}

#[tokio::test]
async fn test_create_uses_saml_name_as_external_name() {
    let mock = MockGitLabClient::new();
    let mut cr = create_test_saml_group_link("saml-example", Some(1234), "Saml-example", AccessLevel::Reporter);

    SamlGroupLinkExternal::new(mock.clone()).create(&mut cr).await.unwrap();
    assert_eq!(cr.external_name(), "Saml-example");

    let observation = SamlGroupLinkExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert_eq!(cr.status.as_ref().unwrap().at_provider.as_ref().unwrap().access_level, 20);
}

#[tokio::test]
async fn test_access_level_drift_relinks() {
    let mock = MockGitLabClient::new();
    mock.add_saml_group_link(
        1234,
        gitlab::SamlGroupLink {
            name: "Saml-example".to_string(),
            access_level: 10,
            member_role_id: None,
        },
    );
    let mut cr = with_external_name(
        create_test_saml_group_link("saml-example", Some(1234), "Saml-example", AccessLevel::Maintainer),
        "Saml-example",
    );

    let observation = SamlGroupLinkExternal::new(mock.clone()).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    mock.reset_calls();
    SamlGroupLinkExternal::new(mock.clone()).update(&mut cr).await.unwrap();
    assert_eq!(
        mock.calls(),
        vec![
            "delete_saml_group_link:1234:Saml-example".to_string(),
            "add_saml_group_link:1234:Saml-example".to_string(),
        ]
    );

    let observation = SamlGroupLinkExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_up_to_date);
}

#[tokio::test]
async fn test_delete_of_missing_link_succeeds() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(
        create_test_saml_group_link("saml-example", Some(1234), "Saml-example", AccessLevel::Developer),
        "Saml-example",
    );

    SamlGroupLinkExternal::new(mock).delete(&mut cr).await.unwrap();
}

#[test]
fn test_unset_member_role_is_not_drift() {
    let cr = create_test_saml_group_link("saml-example", Some(1234), "Saml-example", AccessLevel::Developer);
    let remote = gitlab::SamlGroupLink {
        name: "Saml-example".to_string(),
        access_level: 30,
        member_role_id: Some(9),
    };

    assert!(is_up_to_date(&cr.spec.for_provider, &remote));
}
