//! Git provider error types

use std::num::ParseIntError;
use thiserror::Error;

/// Result type for git provider operations
pub type Result<T> = std::result::Result<T, GitProviderError>;

/// Git provider errors
#[derive(Error, Debug)]
pub enum GitProviderError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid pull request number '{value}'")]
    InvalidPullRequestNumber {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Unsupported git host: {0}")]
    UnsupportedHost(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitProviderError {
    /// Whether the error comes from malformed user input rather than the provider
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            GitProviderError::InvalidUrl { .. } | GitProviderError::InvalidPullRequestNumber { .. }
        )
    }

    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        GitProviderError::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Map a non-success HTTP status and body to an error
    pub(crate) fn from_status(status: reqwest::StatusCode, context: &str, body: String) -> Self {
        let message = if body.is_empty() {
            context.to_string()
        } else {
            format!("{}: {}", context, body)
        };

        match status.as_u16() {
            401 => GitProviderError::AuthenticationFailed(message),
            403 => GitProviderError::PermissionDenied(message),
            404 => GitProviderError::NotFound(message),
            429 => GitProviderError::RateLimitExceeded(message),
            code => GitProviderError::ApiError {
                status: code,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            GitProviderError::from_status(StatusCode::UNAUTHORIZED, "GET /user", String::new()),
            GitProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            GitProviderError::from_status(StatusCode::FORBIDDEN, "GET /user", String::new()),
            GitProviderError::PermissionDenied(_)
        ));
        assert!(matches!(
            GitProviderError::from_status(StatusCode::NOT_FOUND, "GET /repos/a/b", String::new()),
            GitProviderError::NotFound(_)
        ));
        assert!(matches!(
            GitProviderError::from_status(StatusCode::TOO_MANY_REQUESTS, "GET /user", String::new()),
            GitProviderError::RateLimitExceeded(_)
        ));
    }

    #[test]
    fn test_from_status_keeps_body_for_other_codes() {
        let err = GitProviderError::from_status(
            StatusCode::BAD_GATEWAY,
            "GET /user/orgs",
            "upstream down".to_string(),
        );

        match err {
            GitProviderError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "GET /user/orgs: upstream down");
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_is_parse_error() {
        let source = "abc".parse::<u32>().unwrap_err();
        let err = GitProviderError::InvalidPullRequestNumber {
            value: "abc".to_string(),
            source,
        };
        assert!(err.is_parse_error());
        assert!(GitProviderError::invalid_url("x", "too short").is_parse_error());
        assert!(!GitProviderError::NotFound("x".to_string()).is_parse_error());
    }
}
