//! Login, logout and whoami.
//!
//! Login opens GitHub's authorize page in the browser and waits for the
//! authentication server to hand the token back on a local port. A token can
//! also be passed directly with `--token`.

#[cfg(feature = "callback")]
use std::time::Duration;

use console::{Term, style};
use repostats::AuthManager;

use crate::commands::shared::{build_client, open_store};
use crate::config::Config;

/// How long to wait for the browser to come back with a token.
#[cfg(feature = "callback")]
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Handle `repostats login`.
pub(crate) async fn handle_login(
    token: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();

    let token = match token.filter(|t| !t.trim().is_empty()) {
        Some(token) => token.trim().to_string(),
        None => obtain_token(config, is_tty).await?,
    };

    let store = open_store()?;
    let client = build_client(config, None)?;
    let mut auth = AuthManager::new(store.clone());

    let user = auth
        .check_auth(&client, Some(&token))
        .await?
        .ok_or("No token provided")?;

    if is_tty {
        println!(
            "{} Logged in as {}",
            style("✓").green().bold(),
            style(&user.username).cyan()
        );
        println!("Token saved to: {}", store.path().display());
    } else {
        tracing::info!(
            user = %user.username,
            state_path = %store.path().display(),
            "GitHub authentication successful"
        );
    }
    Ok(())
}

/// Run the browser redirect and wait for the callback.
#[cfg(feature = "callback")]
async fn obtain_token(config: &Config, is_tty: bool) -> Result<String, Box<dyn std::error::Error>> {
    use repostats::oauth::{CallbackServer, authorize_url};

    // Listen before the browser can possibly come back.
    let server = CallbackServer::bind(config.auth.callback_port).await?;
    let url = authorize_url(&config.auth.authentication_url)?;

    if is_tty {
        println!("Opening your browser to authorize repostats with GitHub.");
        println!("If it does not open, visit:");
        println!();
        println!("  {url}");
        println!();
        println!(
            "Waiting for authorization (expires in {} seconds)...",
            LOGIN_TIMEOUT.as_secs()
        );
    } else {
        tracing::info!(authorize_url = %url, "Please authorize the application");
    }

    if let Err(e) = open::that(&url) {
        tracing::warn!("Failed to open browser: {e}");
    }

    Ok(server.wait_for_token(LOGIN_TIMEOUT).await?)
}

/// Prompt for a personal access token when the browser flow is not built in.
#[cfg(not(feature = "callback"))]
async fn obtain_token(_config: &Config, is_tty: bool) -> Result<String, Box<dyn std::error::Error>> {
    if !is_tty {
        return Err("No token provided. Pass --token.".into());
    }

    println!(
        "Browser login is not available in this build.\n\
         Please create a Personal Access Token on:\n\
         https://github.com/settings/tokens\n"
    );
    let token = rpassword::prompt_password("Enter GitHub token: ")?;
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err("Empty token provided".into());
    }
    Ok(token)
}

/// Handle `repostats logout`.
pub(crate) fn handle_logout() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let mut auth = AuthManager::new(store);
    auth.logout()?;
    println!("{} Logged out", style("✓").green().bold());
    Ok(())
}

/// Handle `repostats whoami`: verify the saved token and show its user.
pub(crate) async fn handle_whoami(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let client = build_client(config, None)?;
    let mut auth = AuthManager::new(store);

    match auth.check_auth(&client, None).await? {
        Some(user) => {
            println!("{}", style(&user.username).cyan().bold());
            if !user.name.is_empty() {
                println!("Name:   {}", user.name);
            }
            if !user.avatar.is_empty() {
                println!("Avatar: {}", user.avatar);
            }
        }
        None => println!("Not logged in. Run `repostats login`."),
    }
    Ok(())
}
