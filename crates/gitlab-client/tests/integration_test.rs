//! Integration tests for GitLab client
//!
//! These tests require a running GitLab instance.
//! Set GITLAB_URL and GITLAB_TOKEN environment variables to run.

use gitlab_client::{
    is_not_found, Auth, CreateGroupOptions, CreateProjectOptions, CreateProjectVariableOptions,
    DeleteGroupOptions, DeleteProjectOptions, GitLabClient, GroupClient, ProjectClient,
    UpdateProjectVariableOptions, VariableClient,
};

fn client() -> GitLabClient {
    let url = std::env::var("GITLAB_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let token = std::env::var("GITLAB_TOKEN").expect("GITLAB_TOKEN environment variable must be set");
    GitLabClient::new(&url, Auth::PrivateToken(token)).expect("Failed to create client")
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis())
}

#[tokio::test]
#[ignore] // Requires running GitLab instance
async fn test_client_creation() {
    let client = client();
    assert!(client.validate_token().await.is_ok(), "Failed to validate token");
}

#[tokio::test]
#[ignore]
async fn test_missing_group_is_not_found() {
    let client = client();
    let err = client.get_group(i64::MAX).await.expect_err("group should not exist");
    assert!(is_not_found(&err), "unexpected error: {}", err);
}

#[tokio::test]
#[ignore]
async fn test_group_lifecycle() {
    let client = client();
    let path = unique("it-group");

    let group = client
        .create_group(&CreateGroupOptions {
            name: path.clone(),
            path: path.clone(),
            visibility: Some("private".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to create group");

    let fetched = client.get_group(group.id).await.expect("Failed to get group");
    assert_eq!(fetched.path, path);
    assert_eq!(fetched.visibility, "private");

    client
        .delete_group(group.id, &DeleteGroupOptions::default())
        .await
        .expect("Failed to delete group");
}

#[tokio::test]
#[ignore]
async fn test_project_variable_lifecycle() {
    let client = client();
    let name = unique("it-project");

    let project = client
        .create_project(&CreateProjectOptions {
            name: name.clone(),
            ..Default::default()
        })
        .await
        .expect("Failed to create project");

    let created = client
        .create_variable(
            project.id,
            &CreateProjectVariableOptions {
                key: "IT_VAR".to_string(),
                value: "one".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create variable");
    assert_eq!(created.value, "one");

    let updated = client
        .update_variable(
            project.id,
            "IT_VAR",
            None,
            &UpdateProjectVariableOptions {
                value: Some("two".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update variable");
    assert_eq!(updated.value, "two");

    client
        .remove_variable(project.id, "IT_VAR", None)
        .await
        .expect("Failed to remove variable");
    client
        .delete_project(project.id, &DeleteProjectOptions::default())
        .await
        .expect("Failed to delete project");
}
