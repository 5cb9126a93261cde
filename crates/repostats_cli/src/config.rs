//! Configuration file support for repostats.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `REPOSTATS_`, e.g., `REPOSTATS_GITHUB_TOKEN`)
//! 3. Config file (./repostats.toml, then ~/.config/repostats/config.toml)
//! 4. Built-in defaults
//!
//! The login token and theme are not configuration; they live in a state file
//! (`~/.local/state/repostats/state.toml` on Linux) written by `repostats login`.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use REPOSTATS_GITHUB_TOKEN env var
//! api_url = "https://api.github.com"
//!
//! [auth]
//! authentication_url = "http://129.80.106.196:3000/authenticate/production"
//! callback_port = 18484
//!
//! [fetch]
//! max_pages = 1000  # 0 disables the limit
//! timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Application name used for XDG directories and the env prefix.
const APP_NAME: &str = "repostats";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API configuration.
    pub github: GitHubConfig,
    /// Browser login configuration.
    pub auth: AuthConfig,
    /// Fetch limits.
    pub fetch: FetchConfig,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. Takes precedence over the token saved by `login`.
    /// Can also be set via REPOSTATS_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// REST API base URL (GitHub Enterprise uses `https://host/api/v3`).
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: repostats::github::DEFAULT_API_URL.to_string(),
        }
    }
}

/// Browser login configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server that exchanges the GitHub code for a token.
    pub authentication_url: String,
    /// Local port the token is handed back on.
    pub callback_port: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authentication_url: "http://129.80.106.196:3000/authenticate/production".to_string(),
            callback_port: 18484,
        }
    }
}

/// Fetch limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Stop a paginated fetch after this many pages. 0 disables the limit.
    pub max_pages: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/repostats/config.toml)
    /// 3. Local config file (./repostats.toml)
    /// 4. Environment variables with REPOSTATS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("repostats.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./repostats.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., REPOSTATS_GITHUB_TOKEN -> github.token
        builder = builder.add_source(
            Environment::with_prefix("REPOSTATS")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the configured GitHub token, ignoring empty values.
    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone().filter(|t| !t.trim().is_empty())
    }

    /// The page limit for the fetch client. `None` when disabled.
    pub fn max_pages(&self) -> Option<u32> {
        Some(self.fetch.max_pages).filter(|&n| n > 0)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/repostats` or `~/.local/state/repostats`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            // state_dir() returns None on macOS/Windows, fall back to data_dir
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }

    /// Path of the file holding the login token and theme.
    pub fn state_file_path() -> Option<PathBuf> {
        Self::default_state_dir().map(|dir| dir.join("state.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(content: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(config::File::from_str(content, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(
            config.auth.authentication_url,
            "http://129.80.106.196:3000/authenticate/production"
        );
        assert_eq!(config.auth.callback_port, 18484);
        assert_eq!(config.fetch.max_pages, 1000);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder_with_defaults() {
        let settings = ConfigBuilder::builder().build().unwrap();
        let config: Config = settings.try_deserialize().unwrap_or_default();

        assert_eq!(config.max_pages(), Some(1000));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_full_config_parsing() {
        let config = from_toml(
            r#"
            [github]
            token = "ghp_test123"
            api_url = "https://ghe.example.com/api/v3"

            [auth]
            authentication_url = "http://localhost:3000/authenticate/dev"
            callback_port = 9000

            [fetch]
            max_pages = 50
            timeout_secs = 5
        "#,
        );

        assert_eq!(config.github_token().as_deref(), Some("ghp_test123"));
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(
            config.auth.authentication_url,
            "http://localhost:3000/authenticate/dev"
        );
        assert_eq!(config.auth.callback_port, 9000);
        assert_eq!(config.max_pages(), Some(50));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = from_toml(
            r#"
            [fetch]
            timeout_secs = 10
        "#,
        );

        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.fetch.max_pages, 1000);
        assert_eq!(config.auth.callback_port, 18484);
    }

    #[test]
    fn test_zero_max_pages_disables_limit() {
        let config = from_toml(
            r#"
            [fetch]
            max_pages = 0
        "#,
        );
        assert_eq!(config.max_pages(), None);
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = from_toml(
            r#"
            [github]
            token = "  "
        "#,
        );
        assert_eq!(config.github_token(), None);
    }

    #[test]
    fn test_config_merging_order() {
        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(
                "[fetch]\nmax_pages = 10\ntimeout_secs = 20\n",
                FileFormat::Toml,
            ))
            .add_source(config::File::from_str(
                "[fetch]\nmax_pages = 3\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.fetch.max_pages, 3);
        assert_eq!(config.fetch.timeout_secs, 20);
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = ConfigBuilder::builder()
            .add_source(config::File::from_str("[fetch\nmax_pages = 1", FileFormat::Toml))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let config = from_toml(
            r#"
            [fetch]
            max_pages = 7
            concurrency = 20
        "#,
        );
        assert_eq!(config.fetch.max_pages, 7);
    }

    #[test]
    fn test_state_file_path() {
        let path = Config::state_file_path().expect("state dir");
        assert!(path.to_string_lossy().contains("repostats"));
        assert!(path.ends_with("state.toml"));
    }
}
