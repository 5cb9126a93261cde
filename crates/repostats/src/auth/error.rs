use std::path::PathBuf;

use thiserror::Error;

use crate::github::GitHubError;

/// Errors from a [`CredentialStore`](super::CredentialStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// GitHub rejected the token; it has been removed from storage.
    #[error("The stored token is invalid or expired. Please log in again.")]
    InvalidToken,

    #[error(transparent)]
    Api(GitHubError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
