use std::sync::Arc;

use console::{Term, style};
use repostats::auth::TOKEN_KEY;
use repostats::{AuthError, AuthManager, CredentialStore, FileStore, GitHubClient};

use crate::config::Config;

/// Open the state file that holds the login token and theme.
pub(crate) fn open_store() -> Result<Arc<FileStore>, Box<dyn std::error::Error>> {
    let path = Config::state_file_path().ok_or("Could not determine state directory")?;
    Ok(Arc::new(FileStore::new(path)))
}

/// Where a request token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenSource {
    Flag,
    Config,
    Saved,
}

/// Pick the token for API requests.
///
/// Order: `--token` flag, then `github.token` from config/env, then the token
/// saved by `repostats login`. Failing to read the state file is not fatal.
pub(crate) fn resolve_token(
    flag: Option<&str>,
    config: &Config,
    store: &dyn CredentialStore,
) -> Option<(String, TokenSource)> {
    if let Some(token) = flag.filter(|t| !t.trim().is_empty()) {
        return Some((token.to_string(), TokenSource::Flag));
    }
    if let Some(token) = config.github_token() {
        return Some((token, TokenSource::Config));
    }
    match store.get(TOKEN_KEY) {
        Ok(token) => token
            .filter(|t| !t.is_empty())
            .map(|t| (t, TokenSource::Saved)),
        Err(e) => {
            tracing::warn!("Failed to read saved token: {e}");
            None
        }
    }
}

/// Resolve the token and verify it when it is the saved login.
///
/// Tokens passed explicitly are used as given. A saved token is checked
/// against `GET /user` first; when GitHub rejects it the login is purged and
/// the run continues unauthenticated. Any other failure keeps the token.
pub(crate) async fn request_token(
    client: &GitHubClient,
    flag: Option<&str>,
    config: &Config,
    store: Arc<dyn CredentialStore>,
) -> Option<String> {
    let (token, source) = resolve_token(flag, config, store.as_ref())?;
    if source != TokenSource::Saved {
        return Some(token);
    }

    let mut auth = AuthManager::new(store);
    match auth.check_auth(client, None).await {
        Ok(Some(user)) => Some(user.token),
        Ok(None) => None,
        Err(AuthError::InvalidToken) => {
            let message = "Saved login was rejected by GitHub and has been removed. \
                           Run `repostats login` again.";
            if Term::stderr().is_term() {
                eprintln!("{} {message}", style("⚠").yellow());
            } else {
                tracing::warn!("{message}");
            }
            None
        }
        Err(e) => {
            tracing::warn!("Could not verify saved login: {e}");
            Some(token)
        }
    }
}

/// Build a GitHub client from configuration.
pub(crate) fn build_client(
    config: &Config,
    token: Option<&str>,
) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let client = GitHubClient::new(&config.github.api_url, token, config.timeout())?
        .with_max_pages(config.max_pages());
    tracing::debug!(
        api_url = %client.base_url(),
        authenticated = client.token().is_some(),
        max_pages = ?client.max_pages(),
        "Built GitHub client"
    );
    Ok(client)
}
