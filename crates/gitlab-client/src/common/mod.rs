//! Common utilities for the GitLab API client
//!
//! Provides the authenticated HTTP wrapper shared by every resource module.

use crate::error::GitLabError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// How requests are authenticated against GitLab
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// No credentials (public endpoints only)
    None,
    /// Personal, group or project access token (`PRIVATE-TOKEN` header)
    PrivateToken(String),
    /// OAuth2 bearer token (`Authorization: Bearer`)
    OAuthToken(String),
    /// CI job token (`JOB-TOKEN` header)
    JobToken(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print token material
        let kind = match self {
            Auth::None => "None",
            Auth::PrivateToken(_) => "PrivateToken",
            Auth::OAuthToken(_) => "OAuthToken",
            Auth::JobToken(_) => "JobToken",
        };
        f.debug_tuple("Auth").field(&kind).finish()
    }
}

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    api_url: String,
    auth: Auth,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    ///
    /// `base_url` is the GitLab instance URL; `/api/v4` is appended unless
    /// already present.
    pub fn new(client: Client, base_url: &str, auth: Auth) -> Self {
        Self {
            client,
            api_url: api_url(base_url),
            auth,
        }
    }

    /// Get the API base URL (ends with `/api/v4`)
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build a full URL from an API path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("Accept", "application/json");
        match &self.auth {
            Auth::None => builder,
            Auth::PrivateToken(token) => builder.header("PRIVATE-TOKEN", token),
            Auth::OAuthToken(token) => builder.bearer_auth(token),
            Auth::JobToken(token) => builder.header("JOB-TOKEN", token),
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitLabError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url).query(query))
            .send()
            .await?;
        decode(check(response, "GET", path).await?).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitLabError> {
        let url = self.build_url(path);
        debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await?;
        decode(check(response, "POST", path).await?).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitLabError> {
        let url = self.build_url(path);
        debug!("PUT {}", url);

        let response = self
            .authorize(self.client.put(&url).json(body))
            .send()
            .await?;
        decode(check(response, "PUT", path).await?).await
    }

    /// Make a DELETE request, discarding any response body
    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), GitLabError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self
            .authorize(self.client.delete(&url).query(query))
            .send()
            .await?;
        check(response, "DELETE", path).await?;
        Ok(())
    }
}

/// Normalise an instance URL into the REST v4 API root.
pub fn api_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/api/v4") {
        trimmed.to_string()
    } else {
        format!("{}/api/v4", trimmed)
    }
}

/// Percent-encode a single path segment (keys, names, CNs, full paths).
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

async fn check(response: Response, verb: &str, path: &str) -> Result<Response, GitLabError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    match status {
        StatusCode::NOT_FOUND => Err(GitLabError::NotFound(format!("{} {}: {}", verb, path, message))),
        StatusCode::UNAUTHORIZED => Err(GitLabError::Authentication(message)),
        _ => Err(GitLabError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GitLabError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(GitLabError::Serialization)
}

/// Extract GitLab's `message` / `error` field from an error body, falling
/// back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            let field = value.get("message").or_else(|| value.get("error"));
            match field {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => body.to_string(),
            }
        }
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_normalisation() {
        assert_eq!(api_url("https://gitlab.com"), "https://gitlab.com/api/v4");
        assert_eq!(api_url("https://gitlab.com/"), "https://gitlab.com/api/v4");
        assert_eq!(api_url("https://gitlab.example/api/v4/"), "https://gitlab.example/api/v4");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"404 Group Not Found"}"#), "404 Group Not Found");
        assert_eq!(error_message(r#"{"error":"insufficient_scope"}"#), "insufficient_scope");
        assert_eq!(
            error_message(r#"{"message":{"path":["has already been taken"]}}"#),
            r#"{"path":["has already been taken"]}"#
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("cn=admins,ou=groups"), "cn%3Dadmins%2Cou%3Dgroups");
        assert_eq!(segment("MY_VAR"), "MY_VAR");
    }

    #[test]
    fn test_auth_debug_hides_token() {
        let rendered = format!("{:?}", Auth::PrivateToken("glpat-secret".to_string()));
        assert!(!rendered.contains("glpat-secret"));
    }
}
