use thiserror::Error;

use crate::github::GitHubError;
use crate::validation::ValidationError;

/// Errors surfaced while loading a repository.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The identifier failed validation; no request was made.
    #[error("Invalid repository name: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Repository does not exist")]
    NotFound,

    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// The request failed or its body could not be decoded.
    #[error("Request failed: {0}")]
    Transport(#[from] GitHubError),

    /// A newer load (or a reset) started while this one was in flight; its
    /// results were discarded.
    #[error("Superseded by a newer request")]
    Superseded,

    /// An individual fetch was requested before any repository was loaded.
    #[error("No repository loaded")]
    NoRepository,
}

impl SessionError {
    /// Short text to show next to the repository input.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(messages) => messages.join(", "),
            Self::NotFound => "Repository does not exist".to_string(),
            Self::UnexpectedStatus(status) => format!("Unexpected status code: {status}"),
            Self::Transport(_) => "Unknown error".to_string(),
            Self::Superseded => "Superseded by a newer request".to_string(),
            Self::NoRepository => "No repository loaded".to_string(),
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}
