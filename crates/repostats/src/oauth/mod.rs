//! Browser login.
//!
//! GitHub's authorize page redirects to an authentication server, which
//! exchanges the code for a token and hands the token back in a `token`
//! query parameter:
//!
//! - [`authorize_url`] builds the URL to open in the browser
//! - [`callback`] receives the token on a local port
//!
//! ```ignore
//! use repostats::oauth::{CallbackServer, DEFAULT_CALLBACK_PORT, authorize_url};
//! use std::time::Duration;
//!
//! let url = authorize_url("https://auth.example.com/authenticate/cli")?;
//! open::that(&url)?;
//!
//! let server = CallbackServer::bind(DEFAULT_CALLBACK_PORT).await?;
//! let token = server.wait_for_token(Duration::from_secs(300)).await?;
//! ```

mod error;

#[cfg(feature = "callback")]
pub mod callback;

pub use error::OAuthError;

#[cfg(feature = "callback")]
pub use callback::{CallbackServer, DEFAULT_CALLBACK_PORT};

use reqwest::Url;

/// GitHub's OAuth authorize endpoint.
pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Scope requested at login; `repo` grants read access to private
/// repositories.
pub const SCOPE: &str = "repo";

/// Build the GitHub authorize URL that redirects to `authentication_url`.
///
/// # Example
///
/// ```
/// use repostats::oauth::authorize_url;
///
/// let url = authorize_url("http://localhost:3000/authenticate/dev").unwrap();
/// assert_eq!(
///     url,
///     "https://github.com/login/oauth/authorize?redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauthenticate%2Fdev&scope=repo"
/// );
/// ```
pub fn authorize_url(authentication_url: &str) -> Result<String, OAuthError> {
    Url::parse(authentication_url).map_err(|e| {
        OAuthError::Configuration(format!(
            "Invalid authentication URL '{authentication_url}': {e}"
        ))
    })?;

    let url = Url::parse_with_params(
        GITHUB_AUTHORIZE_URL,
        &[("redirect_uri", authentication_url), ("scope", SCOPE)],
    )
    .map_err(|e| OAuthError::Configuration(e.to_string()))?;
    Ok(url.to_string())
}
