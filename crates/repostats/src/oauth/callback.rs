//! Local callback server for the browser login.
//!
//! The authentication server redirects the browser to
//! `http://127.0.0.1:{port}/callback?token=...` once it has exchanged the
//! GitHub code for a token.
//!
//! # Example
//!
//! ```ignore
//! use repostats::oauth::callback::CallbackServer;
//! use std::time::Duration;
//!
//! let server = CallbackServer::bind(18484).await?;
//! let token = server.wait_for_token(Duration::from_secs(300)).await?;
//! ```

use super::error::OAuthError;
use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Default port for the callback server.
pub const DEFAULT_CALLBACK_PORT: u16 = 18484;

/// Query parameters received in the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    /// The access token (on success).
    pub token: Option<String>,
    /// Error code (on failure).
    pub error: Option<String>,
    /// Error description (on failure).
    pub error_description: Option<String>,
}

type CallbackSender = oneshot::Sender<Result<String, OAuthError>>;

/// A local HTTP server that waits for a single login callback.
pub struct CallbackServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl CallbackServer {
    /// Bind to `127.0.0.1:{port}`. Port 0 picks a free port.
    pub async fn bind(port: u16) -> Result<Self, OAuthError> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| OAuthError::Server(format!("Failed to bind to port {port}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| OAuthError::Server(e.to_string()))?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the callback and return the token it carries.
    ///
    /// Fails with [`OAuthError::Expired`] when nothing arrives within
    /// `timeout`.
    pub async fn wait_for_token(self, timeout: Duration) -> Result<String, OAuthError> {
        let (tx, rx) = oneshot::channel();
        let state = Arc::new(tokio::sync::Mutex::new(Some(tx)));

        let app = Router::new()
            .route("/callback", get(handle_callback))
            .with_state(state);

        tracing::debug!("Login callback server listening on http://{}/callback", self.addr);

        let server = axum::serve(self.listener, app);

        tokio::select! {
            result = rx => {
                match result {
                    Ok(token_result) => token_result,
                    Err(_) => Err(OAuthError::Server("Callback channel closed unexpectedly".into())),
                }
            }
            _ = tokio::time::sleep(timeout) => {
                Err(OAuthError::Expired)
            }
            result = server => {
                match result {
                    Ok(()) => Err(OAuthError::Server("Server shut down unexpectedly".into())),
                    Err(e) => Err(OAuthError::Server(format!("Server error: {e}"))),
                }
            }
        }
    }
}

async fn handle_callback(
    State(state): State<Arc<tokio::sync::Mutex<Option<CallbackSender>>>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let result = process_callback(params);
    let is_success = result.is_ok();

    // Only the first callback counts.
    if let Some(tx) = state.lock().await.take() {
        let _ = tx.send(result);
    }

    if is_success {
        Html(SUCCESS_HTML)
    } else {
        Html(ERROR_HTML)
    }
}

fn process_callback(params: CallbackParams) -> Result<String, OAuthError> {
    if let Some(error) = params.error {
        if error == "access_denied" {
            return Err(OAuthError::AccessDenied);
        }
        let message = params.error_description.unwrap_or_else(|| error.clone());
        return Err(OAuthError::github(message));
    }

    params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| OAuthError::Parse("Missing token in callback".into()))
}

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>repostats</title></head>
<body>
<h1>Logged in</h1>
<p>You can close this window and return to the terminal.</p>
</body>
</html>
"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>repostats</title></head>
<body>
<h1>Login failed</h1>
<p>Return to the terminal for details.</p>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_callback_success() {
        let params = CallbackParams {
            token: Some("gho_123".into()),
            ..Default::default()
        };
        assert_eq!(process_callback(params).unwrap(), "gho_123");
    }

    #[test]
    fn test_process_callback_missing_token() {
        let result = process_callback(CallbackParams::default());
        assert!(matches!(result, Err(OAuthError::Parse(_))));

        let params = CallbackParams {
            token: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(process_callback(params), Err(OAuthError::Parse(_))));
    }

    #[test]
    fn test_process_callback_access_denied() {
        let params = CallbackParams {
            error: Some("access_denied".into()),
            error_description: Some("User denied access".into()),
            ..Default::default()
        };
        assert!(matches!(
            process_callback(params),
            Err(OAuthError::AccessDenied)
        ));
    }

    #[test]
    fn test_process_callback_provider_error() {
        let params = CallbackParams {
            error: Some("redirect_uri_mismatch".into()),
            ..Default::default()
        };
        let err = process_callback(params).unwrap_err();
        assert_eq!(err.to_string(), "GitHub error: redirect_uri_mismatch");
    }

    #[tokio::test]
    async fn test_wait_for_token_receives_callback() {
        let server = CallbackServer::bind(0).await.expect("bind");
        let url = format!("http://{}/callback?token=gho_abc", server.local_addr());

        // The server stops once the token arrives, so the browser side of the
        // exchange may see the connection close early.
        let request = tokio::spawn(async move {
            let _ = reqwest::get(&url).await;
        });

        let token = server
            .wait_for_token(Duration::from_secs(5))
            .await
            .expect("token");
        assert_eq!(token, "gho_abc");

        request.abort();
    }

    #[tokio::test]
    async fn test_wait_for_token_times_out() {
        let server = CallbackServer::bind(0).await.expect("bind");
        let result = server.wait_for_token(Duration::from_millis(50)).await;
        assert!(matches!(result, Err(OAuthError::Expired)));
    }
}
