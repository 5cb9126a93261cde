//! Login state and the bearer token.
//!
//! [`AuthManager`] owns the [`CurrentUser`] and persists the token through a
//! [`CredentialStore`] under [`TOKEN_KEY`]. The theme preference shares the
//! same store under [`THEME_KEY`].

mod error;
mod store;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::github::{GitHubClient, GitHubError};

pub use error::{AuthError, StoreError};
pub use store::{CredentialStore, FileStore, MemoryStore};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";

/// The logged-in user. Every field is empty when logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub username: String,
    pub name: String,
    /// Avatar image URL.
    pub avatar: String,
    #[serde(skip)]
    pub token: String,
}

impl CurrentUser {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Owns the current user and the durable token.
pub struct AuthManager {
    store: Arc<dyn CredentialStore>,
    user: CurrentUser,
}

impl AuthManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            user: CurrentUser::default(),
        }
    }

    pub fn current_user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// The token requests should carry: the verified one, else the stored one.
    pub fn token(&self) -> Result<Option<String>, AuthError> {
        if self.user.is_logged_in() {
            return Ok(Some(self.user.token.clone()));
        }
        Ok(self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Verify a token and log in with it.
    ///
    /// Uses `callback_token` when given (a fresh login), otherwise the stored
    /// token. Returns `Ok(None)` when there is no token at all. A token that
    /// GitHub rejects with 401 is removed and reported as
    /// [`AuthError::InvalidToken`].
    pub async fn check_auth(
        &mut self,
        client: &GitHubClient,
        callback_token: Option<&str>,
    ) -> Result<Option<CurrentUser>, AuthError> {
        let token = match callback_token.filter(|t| !t.is_empty()) {
            Some(token) => token.to_string(),
            None => match self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) {
                Some(token) => token,
                None => {
                    tracing::debug!("No stored token");
                    return Ok(None);
                }
            },
        };

        match client.authenticated_user(&token).await {
            Ok(user) => {
                self.store.set(TOKEN_KEY, &token)?;
                self.user = CurrentUser {
                    username: user.login,
                    name: user.name.unwrap_or_default(),
                    avatar: user.avatar_url.unwrap_or_default(),
                    token,
                };
                tracing::info!(user = %self.user.username, "Authenticated");
                Ok(Some(self.user.clone()))
            }
            Err(GitHubError::Unauthorized { message }) => {
                tracing::warn!("Token rejected: {message}");
                self.logout()?;
                Err(AuthError::InvalidToken)
            }
            Err(err) => {
                tracing::warn!("Failed to check authentication: {err}");
                Err(AuthError::Api(err))
            }
        }
    }

    /// Forget the token and reset the current user.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.remove(TOKEN_KEY)?;
        self.user = CurrentUser::default();
        tracing::info!("Logged out");
        Ok(())
    }
}

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The stored theme. Missing or unrecognized values read as `None`.
    pub fn load(store: &dyn CredentialStore) -> Result<Option<Self>, StoreError> {
        Ok(store.get(THEME_KEY)?.and_then(|v| v.parse().ok()))
    }

    pub fn save(&self, store: &dyn CredentialStore) -> Result<(), StoreError> {
        store.set(THEME_KEY, self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}
