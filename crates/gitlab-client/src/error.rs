//! GitLab client errors

use thiserror::Error;

/// Errors that can occur when interacting with the GitLab API
#[derive(Debug, Error)]
pub enum GitLabError {
    /// HTTP request/response error (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitLab API returned a non-success status
    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid request (e.g., malformed base URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GitLabError {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitLabError::Api { status, .. } => Some(*status),
            GitLabError::NotFound(_) => Some(404),
            GitLabError::Authentication(_) => Some(401),
            GitLabError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Returns true iff the error represents an HTTP 404 from GitLab.
///
/// This is the single place callers use to tell "absent" apart from a
/// transport or server failure.
pub fn is_not_found(err: &GitLabError) -> bool {
    err.status() == Some(404)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(is_not_found(&GitLabError::NotFound("group 1".to_string())));
        assert!(is_not_found(&GitLabError::Api {
            status: 404,
            message: "404 Group Not Found".to_string(),
        }));
        assert!(!is_not_found(&GitLabError::Api {
            status: 500,
            message: "boom".to_string(),
        }));
        assert!(!is_not_found(&GitLabError::Authentication("bad token".to_string())));
        assert!(!is_not_found(&GitLabError::InvalidRequest("x".to_string())));
    }
}
