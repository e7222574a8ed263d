use super::ldap_group_link::*;
use crate::error::ControllerError;
use crate::managed::ExternalClient;
use crate::test_utils::{create_test_ldap_group_link, with_external_name};
use crds::{AccessLevel, Managed};
use gitlab_client::{self as gitlab, MockGitLabClient};

fn remote_link(cn: &str, level: i64, provider: &str) -> gitlab::LdapGroupLink {
    gitlab::LdapGroupLink {
        cn: cn.to_string(),
        group_access: level,
        provider: provider.to_string(),
        filter: None,
    }
}

fn parent_group(mock: &MockGitLabClient, id: i64) {
    mock.add_group(gitlab::Group {
        id,
        name: "Platform".to_string(),
        path: "platform".to_string(),
        ..Default::default()
    });
}

#[test]
fn test_find_link_matches_cn_and_provider() {
    let links = vec![
        remote_link("admins", 40, "ldapsecondary"),
        remote_link("admins", 30, "ldapmain"),
        remote_link("devs", 30, "ldapmain"),
    ];

    assert_eq!(find_link(&links, "admins", "ldapmain").unwrap().group_access, 30);
    assert!(find_link(&links, "ops", "ldapmain").is_none());
}

#[tokio::test]
async fn test_observe_finds_link_in_list() {
    let mock = MockGitLabClient::new();
    parent_group(&mock, 3);
    mock.add_ldap_group_link(3, remote_link("devs", 30, "ldapmain"));
    let mut cr = with_external_name(
        create_test_ldap_group_link("devs", Some(3), "devs", AccessLevel::Developer),
        "devs",
    );

    let observation = LdapGroupLinkExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert_eq!(cr.status.as_ref().unwrap().at_provider.as_ref().unwrap().ldap_provider, "ldapmain");
}

#[tokio::test]
async fn test_unlisted_link_is_absent() {
    let mock = MockGitLabClient::new();
    parent_group(&mock, 3);
    mock.add_ldap_group_link(3, remote_link("ops", 30, "ldapmain"));
    let mut cr = with_external_name(
        create_test_ldap_group_link("devs", Some(3), "devs", AccessLevel::Developer),
        "devs",
    );

    let observation = LdapGroupLinkExternal::new(mock).observe(&mut cr).await.unwrap();

    assert!(!observation.resource_exists);
}

#[tokio::test]
async fn test_create_then_relink_on_drift() {
    let mock = MockGitLabClient::new();
    parent_group(&mock, 3);
    let mut cr = create_test_ldap_group_link("devs", Some(3), "devs", AccessLevel::Developer);

    LdapGroupLinkExternal::new(mock.clone()).create(&mut cr).await.unwrap();
    assert_eq!(cr.external_name(), "devs");

    cr.spec.for_provider.group_access = AccessLevel::Maintainer;
    let observation = LdapGroupLinkExternal::new(mock.clone()).observe(&mut cr).await.unwrap();
    assert!(!observation.resource_up_to_date);

    mock.reset_calls();
    LdapGroupLinkExternal::new(mock.clone()).update(&mut cr).await.unwrap();
    assert_eq!(
        mock.calls(),
        vec![
            "delete_ldap_group_link:3:ldapmain:devs".to_string(),
            "add_ldap_group_link:3:devs".to_string(),
        ]
    );

    let observation = LdapGroupLinkExternal::new(mock).observe(&mut cr).await.unwrap();
    assert!(observation.resource_up_to_date);
}

#[tokio::test]
async fn test_missing_group_id_is_rejected() {
    let mock = MockGitLabClient::new();
    let mut cr = with_external_name(create_test_ldap_group_link("devs", None, "devs", AccessLevel::Developer), "devs");

    let result = LdapGroupLinkExternal::new(mock).delete(&mut cr).await;

    assert!(matches!(result, Err(ControllerError::MissingGroupId)));
}

#[tokio::test]
async fn test_delete_of_missing_link_succeeds() {
    let mock = MockGitLabClient::new();
    parent_group(&mock, 3);
    let mut cr = with_external_name(
        create_test_ldap_group_link("devs", Some(3), "devs", AccessLevel::Developer),
        "devs",
    );

    LdapGroupLinkExternal::new(mock.clone()).delete(&mut cr).await.unwrap();
    assert_eq!(mock.call_count("delete_ldap_group_link"), 1);
}

#[test]
fn test_remote_filter_is_not_drift() {
    let cr = create_test_ldap_group_link("admins", Some(5), "admins", AccessLevel::Developer);
    let remote = gitlab::LdapGroupLink {
        filter: Some("(memberOf=cn=admins)".to_string()),
        ..remote_link("admins", 30, "ldapmain")
    };

    assert!(is_up_to_date(&cr.spec.for_provider, &remote));
}
