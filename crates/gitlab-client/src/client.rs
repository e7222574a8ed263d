//! GitLab API client
//!
//! Implements the GitLab REST v4 endpoints used by the managed kinds.
//! Pagination and retries are left to the caller; every call maps to exactly
//! one HTTP request.

use crate::common::{segment, Auth, HttpClient};
use crate::error::GitLabError;
use crate::gitlab_trait::*;
use crate::models::*;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// GitLab API client
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: HttpClient,
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
}

fn build_http_client() -> Result<Client, GitLabError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(GitLabError::Http)
}

impl GitLabClient {
    /// Create a new GitLab client
    ///
    /// # Arguments
    /// * `base_url` - GitLab instance URL (e.g., "https://gitlab.com")
    /// * `auth` - How requests are authenticated
    pub fn new(base_url: &str, auth: Auth) -> Result<Self, GitLabError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GitLabError::InvalidRequest(format!(
                "base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        Ok(Self {
            http: HttpClient::new(build_http_client()?, base_url, auth),
        })
    }

    /// Create a client from a username and password
    ///
    /// GitLab's REST API does not accept basic authentication directly, so
    /// the credentials are exchanged once for an OAuth token using the
    /// resource owner password grant.
    pub async fn with_basic_auth(base_url: &str, username: &str, password: &str) -> Result<Self, GitLabError> {
        let client = build_http_client()?;
        let url = format!("{}/oauth/token", base_url.trim_end_matches('/'));
        debug!("Exchanging basic credentials for an OAuth token at {}", url);

        let response = client
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitLabError::Authentication(format!(
                "password grant failed: {} - {}",
                status,
                crate::common::error_message(&body)
            )));
        }
        let token: OAuthTokenResponse = response.json().await?;

        Ok(Self {
            http: HttpClient::new(client, base_url, Auth::OAuthToken(token.access_token)),
        })
    }

    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        self.http.api_url()
    }

    /// Validate the credentials by fetching the current user.
    pub async fn validate_token(&self) -> Result<(), GitLabError> {
        debug!("Validating GitLab credentials");
        let _: serde_json::Value = self.http.get("/user", &[]).await?;
        Ok(())
    }
}

fn delete_query(permanently_remove: Option<bool>, full_path: &Option<String>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(remove) = permanently_remove {
        query.push(("permanently_remove", remove.to_string()));
    }
    if let Some(path) = full_path {
        query.push(("full_path", path.clone()));
    }
    query
}

fn scope_filter(environment_scope: Option<&str>) -> Vec<(&'static str, String)> {
    environment_scope
        .map(|scope| vec![("filter[environment_scope]", scope.to_string())])
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl GroupClient for GitLabClient {
    async fn get_group(&self, id: i64) -> Result<Group, GitLabError> {
        self.http.get(&format!("/groups/{}", id), &[]).await
    }

    async fn create_group(&self, opts: &CreateGroupOptions) -> Result<Group, GitLabError> {
        self.http.post("/groups", opts).await
    }

    async fn update_group(&self, id: i64, opts: &UpdateGroupOptions) -> Result<Group, GitLabError> {
        self.http.put(&format!("/groups/{}", id), opts).await
    }

    async fn delete_group(&self, id: i64, opts: &DeleteGroupOptions) -> Result<(), GitLabError> {
        let query = delete_query(opts.permanently_remove, &opts.full_path);
        self.http.delete(&format!("/groups/{}", id), &query).await
    }

    async fn share_group_with_group(&self, id: i64, opts: &ShareGroupWithGroupOptions) -> Result<Group, GitLabError> {
        self.http.post(&format!("/groups/{}/share", id), opts).await
    }

    async fn unshare_group_from_group(&self, id: i64, shared_group_id: i64) -> Result<(), GitLabError> {
        self.http
            .delete(&format!("/groups/{}/share/{}", id, shared_group_id), &[])
            .await
    }
}

#[async_trait::async_trait]
impl GroupMemberClient for GitLabClient {
    async fn get_group_member(&self, group_id: i64, user_id: i64) -> Result<GroupMember, GitLabError> {
        self.http
            .get(&format!("/groups/{}/members/{}", group_id, user_id), &[])
            .await
    }

    async fn add_group_member(&self, group_id: i64, opts: &AddGroupMemberOptions) -> Result<GroupMember, GitLabError> {
        self.http.post(&format!("/groups/{}/members", group_id), opts).await
    }

    async fn edit_group_member(&self, group_id: i64, user_id: i64, opts: &EditGroupMemberOptions) -> Result<GroupMember, GitLabError> {
        self.http
            .put(&format!("/groups/{}/members/{}", group_id, user_id), opts)
            .await
    }

    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> Result<(), GitLabError> {
        self.http
            .delete(&format!("/groups/{}/members/{}", group_id, user_id), &[])
            .await
    }
}

#[async_trait::async_trait]
impl SamlGroupLinkClient for GitLabClient {
    async fn get_saml_group_link(&self, group_id: i64, name: &str) -> Result<SamlGroupLink, GitLabError> {
        self.http
            .get(&format!("/groups/{}/saml_group_links/{}", group_id, segment(name)), &[])
            .await
    }

    async fn add_saml_group_link(&self, group_id: i64, opts: &AddSamlGroupLinkOptions) -> Result<SamlGroupLink, GitLabError> {
        self.http
            .post(&format!("/groups/{}/saml_group_links", group_id), opts)
            .await
    }

    async fn delete_saml_group_link(&self, group_id: i64, name: &str) -> Result<(), GitLabError> {
        self.http
            .delete(&format!("/groups/{}/saml_group_links/{}", group_id, segment(name)), &[])
            .await
    }
}

#[async_trait::async_trait]
impl LdapGroupLinkClient for GitLabClient {
    async fn list_ldap_group_links(&self, group_id: i64) -> Result<Vec<LdapGroupLink>, GitLabError> {
        self.http
            .get(&format!("/groups/{}/ldap_group_links", group_id), &[])
            .await
    }

    async fn add_ldap_group_link(&self, group_id: i64, opts: &AddLdapGroupLinkOptions) -> Result<LdapGroupLink, GitLabError> {
        self.http
            .post(&format!("/groups/{}/ldap_group_links", group_id), opts)
            .await
    }

    async fn delete_ldap_group_link(&self, group_id: i64, provider: &str, cn: &str) -> Result<(), GitLabError> {
        self.http
            .delete(
                &format!("/groups/{}/ldap_group_links/{}/{}", group_id, segment(provider), segment(cn)),
                &[],
            )
            .await
    }
}

#[async_trait::async_trait]
impl ProjectClient for GitLabClient {
    async fn get_project(&self, id: i64) -> Result<Project, GitLabError> {
        self.http.get(&format!("/projects/{}", id), &[]).await
    }

    async fn create_project(&self, opts: &CreateProjectOptions) -> Result<Project, GitLabError> {
        self.http.post("/projects", opts).await
    }

    async fn edit_project(&self, id: i64, opts: &EditProjectOptions) -> Result<Project, GitLabError> {
        self.http.put(&format!("/projects/{}", id), opts).await
    }

    async fn delete_project(&self, id: i64, opts: &DeleteProjectOptions) -> Result<(), GitLabError> {
        let query = delete_query(opts.permanently_remove, &opts.full_path);
        self.http.delete(&format!("/projects/{}", id), &query).await
    }

    async fn get_project_push_rules(&self, id: i64) -> Result<ProjectPushRules, GitLabError> {
        self.http.get(&format!("/projects/{}/push_rule", id), &[]).await
    }

    async fn add_project_push_rule(&self, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError> {
        self.http.post(&format!("/projects/{}/push_rule", id), opts).await
    }

    async fn edit_project_push_rule(&self, id: i64, opts: &PushRuleOptions) -> Result<ProjectPushRules, GitLabError> {
        self.http.put(&format!("/projects/{}/push_rule", id), opts).await
    }

    async fn delete_project_push_rule(&self, id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("/projects/{}/push_rule", id), &[]).await
    }
}

#[async_trait::async_trait]
impl DeployTokenClient for GitLabClient {
    async fn get_project_deploy_token(&self, project_id: i64, id: i64) -> Result<DeployToken, GitLabError> {
        self.http
            .get(&format!("/projects/{}/deploy_tokens/{}", project_id, id), &[])
            .await
    }

    async fn create_project_deploy_token(&self, project_id: i64, opts: &CreateDeployTokenOptions) -> Result<DeployToken, GitLabError> {
        self.http
            .post(&format!("/projects/{}/deploy_tokens", project_id), opts)
            .await
    }

    async fn delete_project_deploy_token(&self, project_id: i64, id: i64) -> Result<(), GitLabError> {
        self.http
            .delete(&format!("/projects/{}/deploy_tokens/{}", project_id, id), &[])
            .await
    }
}

#[async_trait::async_trait]
impl AccessTokenClient for GitLabClient {
    async fn get_project_access_token(&self, project_id: i64, id: i64) -> Result<ProjectAccessToken, GitLabError> {
        self.http
            .get(&format!("/projects/{}/access_tokens/{}", project_id, id), &[])
            .await
    }

    async fn create_project_access_token(&self, project_id: i64, opts: &CreateProjectAccessTokenOptions) -> Result<ProjectAccessToken, GitLabError> {
        self.http
            .post(&format!("/projects/{}/access_tokens", project_id), opts)
            .await
    }

    async fn revoke_project_access_token(&self, project_id: i64, id: i64) -> Result<(), GitLabError> {
        self.http
            .delete(&format!("/projects/{}/access_tokens/{}", project_id, id), &[])
            .await
    }
}

#[async_trait::async_trait]
impl VariableClient for GitLabClient {
    async fn get_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<ProjectVariable, GitLabError> {
        self.http
            .get(
                &format!("/projects/{}/variables/{}", project_id, segment(key)),
                &scope_filter(environment_scope),
            )
            .await
    }

    async fn create_variable(&self, project_id: i64, opts: &CreateProjectVariableOptions) -> Result<ProjectVariable, GitLabError> {
        self.http
            .post(&format!("/projects/{}/variables", project_id), opts)
            .await
    }

    async fn update_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>, opts: &UpdateProjectVariableOptions) -> Result<ProjectVariable, GitLabError> {
        // PUT carries the filter in the body rather than the query string
        let mut body = serde_json::to_value(opts)?;
        if let (Some(scope), Some(map)) = (environment_scope, body.as_object_mut()) {
            map.insert(
                "filter".to_string(),
                serde_json::json!({ "environment_scope": scope }),
            );
        }
        self.http
            .put(&format!("/projects/{}/variables/{}", project_id, segment(key)), &body)
            .await
    }

    async fn remove_variable(&self, project_id: i64, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError> {
        self.http
            .delete(
                &format!("/projects/{}/variables/{}", project_id, segment(key)),
                &scope_filter(environment_scope),
            )
            .await
    }
}

#[async_trait::async_trait]
impl PipelineScheduleClient for GitLabClient {
    async fn get_pipeline_schedule(&self, project_id: i64, id: i64) -> Result<PipelineSchedule, GitLabError> {
        self.http
            .get(&format!("/projects/{}/pipeline_schedules/{}", project_id, id), &[])
            .await
    }

    async fn create_pipeline_schedule(&self, project_id: i64, opts: &CreatePipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        self.http
            .post(&format!("/projects/{}/pipeline_schedules", project_id), opts)
            .await
    }

    async fn edit_pipeline_schedule(&self, project_id: i64, id: i64, opts: &EditPipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        self.http
            .put(&format!("/projects/{}/pipeline_schedules/{}", project_id, id), opts)
            .await
    }

    async fn delete_pipeline_schedule(&self, project_id: i64, id: i64) -> Result<(), GitLabError> {
        self.http
            .delete(&format!("/projects/{}/pipeline_schedules/{}", project_id, id), &[])
            .await
    }

    async fn create_pipeline_schedule_variable(&self, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError> {
        self.http
            .post(
                &format!("/projects/{}/pipeline_schedules/{}/variables", project_id, id),
                opts,
            )
            .await
    }

    async fn edit_pipeline_schedule_variable(&self, project_id: i64, id: i64, opts: &PipelineVariableOptions) -> Result<PipelineVariable, GitLabError> {
        self.http
            .put(
                &format!(
                    "/projects/{}/pipeline_schedules/{}/variables/{}",
                    project_id,
                    id,
                    segment(&opts.key)
                ),
                opts,
            )
            .await
    }

    async fn delete_pipeline_schedule_variable(&self, project_id: i64, id: i64, key: &str) -> Result<(), GitLabError> {
        self.http
            .delete(
                &format!(
                    "/projects/{}/pipeline_schedules/{}/variables/{}",
                    project_id,
                    id,
                    segment(key)
                ),
                &[],
            )
            .await
    }
}

#[async_trait::async_trait]
impl RunnerClient for GitLabClient {
    async fn get_runner(&self, id: i64) -> Result<Runner, GitLabError> {
        self.http.get(&format!("/runners/{}", id), &[]).await
    }

    async fn create_user_runner(&self, opts: &CreateUserRunnerOptions) -> Result<CreatedRunner, GitLabError> {
        self.http.post("/user/runners", opts).await
    }

    async fn update_runner(&self, id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError> {
        self.http.put(&format!("/runners/{}", id), opts).await
    }

    async fn delete_runner(&self, id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("/runners/{}", id), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_not_found;

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let result = GitLabClient::new("gitlab.example.com", Auth::None);
        assert!(matches!(result, Err(GitLabError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_get_group_sends_private_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/groups/42")
            .match_header("PRIVATE-TOKEN", "glpat-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 42, "name": "team-a", "path": "team-a", "visibility": "private"}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Auth::PrivateToken("glpat-test".to_string())).unwrap();
        let group = client.get_group(42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(group.id, 42);
        assert_eq!(group.visibility, "private");
        assert!(group.marked_for_deletion_on.is_none());
    }

    #[tokio::test]
    async fn test_get_group_404_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/groups/7")
            .with_status(404)
            .with_body(r#"{"message": "404 Group Not Found"}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Auth::OAuthToken("oauth".to_string())).unwrap();
        let err = client.get_group(7).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v4/groups")
            .with_status(400)
            .with_body(r#"{"message": {"path": ["has already been taken"]}}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Auth::JobToken("job".to_string())).unwrap();
        let opts = CreateGroupOptions {
            name: "team-a".to_string(),
            path: "team-a".to_string(),
            ..Default::default()
        };
        match client.create_group(&opts).await {
            Err(GitLabError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("has already been taken"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_group_permanently_sends_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v4/groups/9")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("permanently_remove".into(), "true".into()),
                mockito::Matcher::UrlEncoded("full_path".into(), "parent/child".into()),
            ]))
            .with_status(202)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Auth::None).unwrap();
        client
            .delete_group(
                9,
                &DeleteGroupOptions {
                    permanently_remove: Some(true),
                    full_path: Some("parent/child".to_string()),
                },
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_variable_path_is_encoded_and_scoped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/3/variables/MY_VAR")
            .match_query(mockito::Matcher::UrlEncoded(
                "filter[environment_scope]".into(),
                "production".into(),
            ))
            .with_status(200)
            .with_body(r#"{"key": "MY_VAR", "value": "x", "variable_type": "env_var", "environment_scope": "production"}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Auth::None).unwrap();
        let variable = client.get_variable(3, "MY_VAR", Some("production")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(variable.environment_scope, "production");
    }

    #[tokio::test]
    async fn test_basic_auth_exchanges_password_for_bearer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token": "oauth-abc", "token_type": "Bearer"}"#)
            .create_async()
            .await;
        let user = server
            .mock("GET", "/api/v4/user")
            .match_header("authorization", "Bearer oauth-abc")
            .with_status(200)
            .with_body(r#"{"id": 1, "username": "root"}"#)
            .create_async()
            .await;

        let client = GitLabClient::with_basic_auth(&server.url(), "root", "secret").await.unwrap();
        client.validate_token().await.unwrap();
        user.assert_async().await;
    }
}
