//! repostats - GitHub repository statistics.
//!
//! This library fetches a repository's branches, labels and issues from the
//! GitHub REST API, keeps them in an in-memory snapshot, and derives a tree
//! of aggregate statistics from it.
//!
//! # Features
//!
//! - `callback` (default) - Enables the local HTTP server that receives the
//!   token at the end of a browser login ([`oauth::CallbackServer`]).
//!
//! # Example
//!
//! ```no_run
//! use repostats::github::{DEFAULT_API_URL, DEFAULT_TIMEOUT, GitHubClient};
//! use repostats::session::Session;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubClient::new(DEFAULT_API_URL, Some("ghp_xxx"), DEFAULT_TIMEOUT)?
//!     .with_max_pages(Some(1000));
//! let session = Session::new(client);
//!
//! let loaded = session.load("rust-lang/cargo").await?;
//! println!("{}", serde_json::to_string_pretty(&loaded.stats)?);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod github;
pub mod http;
pub mod model;
pub mod oauth;
pub mod progress;
pub mod session;
pub mod stats;
pub mod validation;

pub use auth::{AuthError, AuthManager, CredentialStore, CurrentUser, FileStore, MemoryStore, Theme};
pub use github::{GitHubClient, GitHubError};
pub use model::{Issue, IssueState, Label, RepositorySnapshot};
pub use progress::{FetchProgress, ProgressCallback};
pub use session::{Loaded, Session, SessionError};
pub use stats::{StatsTree, Summary, compute_stats};
pub use validation::{RepoName, ValidationError, validate_repo_name};
