//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(#[from] HttpError),

    /// The response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP 401.
    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    /// HTTP 404.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// HTTP 403/429 with an exhausted rate limit.
    #[error("Rate limit exceeded (HTTP {status}). Resets at {reset_at}")]
    RateLimited { status: u16, reset_at: DateTime<Utc> },

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The server kept advertising more pages than the configured limit.
    #[error("Pagination for {resource} exceeded the limit of {limit} pages")]
    PageLimit { resource: String, limit: u32 },
}

/// One-line summary of an error for warnings shown next to the results.
pub fn short_error_message(err: &GitHubError) -> String {
    match err {
        GitHubError::Transport(_) => "Network error".to_string(),
        GitHubError::Json(_) => "JSON parse error".to_string(),
        GitHubError::InvalidUrl(url) => format!("Invalid URL: {url}"),
        GitHubError::Unauthorized { .. } => "Authentication failed".to_string(),
        GitHubError::NotFound { resource } => format!("Not found: {resource}"),
        GitHubError::RateLimited { .. } => "Rate limited".to_string(),
        GitHubError::Status { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {status}: {truncated}...")
            } else {
                format!("HTTP {status}: {message}")
            }
        }
        GitHubError::PageLimit { limit, .. } => format!("More than {limit} pages"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_error_message_truncates_long_messages() {
        let err = GitHubError::Status {
            status: 500,
            message: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("..."));

        let err = GitHubError::RateLimited {
            status: 429,
            reset_at: Utc::now(),
        };
        assert_eq!(short_error_message(&err), "Rate limited");
    }
}
