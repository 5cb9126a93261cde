//! Model conversion from GitHub API types to snapshot types.

use super::types::{GitHubIssue, GitHubLabel};
use crate::model::{Issue, Label};

/// Login GitHub shows for issues whose author account was deleted.
pub const GHOST_LOGIN: &str = "ghost";

pub fn to_label(label: GitHubLabel) -> Label {
    Label {
        id: label.id,
        name: label.name,
        description: label.description,
        color: label.color,
    }
}

/// Convert a GitHub issue into a snapshot issue.
///
/// Returns `None` for pull requests, which the issues endpoint lists as well.
pub fn to_issue(issue: GitHubIssue) -> Option<Issue> {
    if issue.is_pull_request() {
        return None;
    }

    let author = issue
        .user
        .map(|u| u.login)
        .unwrap_or_else(|| GHOST_LOGIN.to_string());

    Some(Issue {
        id: issue.number,
        title: issue.title,
        body: issue.body,
        state: issue.state,
        author,
        assignees: issue.assignees.into_iter().map(|u| u.login).collect(),
        labels: issue.labels.into_iter().map(to_label).collect(),
        locked: issue.locked,
        created_on: issue.created_at,
        updated_on: issue.updated_at,
        closed_on: issue.closed_at,
        due_on: issue.milestone.and_then(|m| m.due_on),
        closed_by: issue.closed_by.map(|u| u.login),
    })
}
