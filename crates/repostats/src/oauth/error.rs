//! OAuth error types.

use thiserror::Error;

/// Errors that can occur during the browser login flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The callback carried no usable token.
    #[error("Failed to parse callback: {0}")]
    Parse(String),

    /// The callback did not arrive in time.
    #[error("Authorization expired. Please try again.")]
    Expired,

    /// User denied the authorization request.
    #[error("Authorization was denied by the user.")]
    AccessDenied,

    /// The callback server failed.
    #[error("Callback server error: {0}")]
    Server(String),

    /// OAuth configuration error.
    #[error("OAuth configuration error: {0}")]
    Configuration(String),

    /// Error reported by the authorization server.
    #[error("{provider} error: {message}")]
    Provider {
        /// Who reported the error (e.g. "GitHub").
        provider: &'static str,
        message: String,
    },
}

impl OAuthError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn github(message: impl Into<String>) -> Self {
        Self::provider("GitHub", message)
    }
}
