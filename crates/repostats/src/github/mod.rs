//! GitHub REST access.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Wire shapes of the responses this crate reads
//! - [`client`] - The client, single requests and the pagination loop
//! - [`pagination`] - `Link` header parsing
//! - [`convert`] - Conversion into snapshot types

mod client;
mod convert;
mod error;
mod pagination;
mod types;

pub use error::{GitHubError, short_error_message};

pub use types::{GitHubBranch, GitHubIssue, GitHubLabel, GitHubMilestone, GitHubRepo, GitHubUser};

pub use client::{
    DEFAULT_API_URL, DEFAULT_TIMEOUT, GitHubClient, Paginated, RateLimitInfo, RawResponse,
    ResponseMeta,
};

pub use pagination::{LinkPagination, PAGE_SIZE, parse_link_header};

pub use convert::{GHOST_LOGIN, to_issue, to_label};
