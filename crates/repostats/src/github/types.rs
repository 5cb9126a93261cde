//! Wire shapes of the GitHub REST responses this crate reads.
//!
//! Only the fields the snapshot needs are declared; everything else in the
//! payload is ignored by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::IssueState;

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub default_branch: String,
}

/// One entry of `GET /repos/{owner}/{repo}/branches`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBranch {
    pub name: String,
}

/// A label, as listed by `/labels` and embedded in issues.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: String,
}

/// A user reference, and the body of `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubMilestone {
    #[serde(default)]
    pub due_on: Option<DateTime<Utc>>,
}

/// One entry of `GET /repos/{owner}/{repo}/issues`.
///
/// The issues endpoint also lists pull requests; those carry a
/// `pull_request` object.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: IssueState,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_by: Option<GitHubUser>,
    #[serde(default)]
    pub milestone: Option<GitHubMilestone>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl GitHubIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Body of GitHub's JSON error responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitHubErrorBody {
    pub message: String,
}
