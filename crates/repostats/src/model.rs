//! In-memory repository snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Issue state as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

/// A true issue (pull requests never make it into the snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The issue number within its repository.
    pub id: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: IssueState,
    /// Login of the user who opened the issue.
    pub author: String,
    pub assignees: Vec<String>,
    pub labels: Vec<Label>,
    pub locked: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub closed_on: Option<DateTime<Utc>>,
    /// Due date of the issue's milestone.
    pub due_on: Option<DateTime<Utc>>,
    /// Login of the user who closed the issue, when the API reports it.
    pub closed_by: Option<String>,
}

impl Issue {
    /// Users credited with closing the issue.
    ///
    /// The reported closer when there is one. The list-issues endpoint never
    /// reports it, so otherwise the assignees. Empty for open issues.
    pub fn closers(&self) -> Vec<&str> {
        if self.state != IssueState::Closed {
            return Vec::new();
        }
        match &self.closed_by {
            Some(closer) => vec![closer.as_str()],
            None => self.assignees.iter().map(String::as_str).collect(),
        }
    }

    /// Time between opening and closing, for closed issues that carry a close time.
    pub fn time_to_close(&self) -> Option<chrono::Duration> {
        match (self.state, self.closed_on) {
            (IssueState::Closed, Some(closed)) => Some(closed - self.created_on),
            _ => None,
        }
    }
}

/// Everything known about one repository.
///
/// `name` and `default_branch` are only ever set by a successful existence
/// check; the collections are replaced wholesale by each fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub name: String,
    pub default_branch: String,
    pub branches: Vec<String>,
    pub labels: BTreeMap<u64, Label>,
    pub issues: BTreeMap<u64, Issue>,
}

impl RepositorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.default_branch.is_empty()
            && self.branches.is_empty()
            && self.labels.is_empty()
            && self.issues.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    pub fn label(id: u64, name: &str) -> Label {
        Label {
            id,
            name: name.to_string(),
            description: None,
            color: "ededed".to_string(),
        }
    }

    pub fn issue(id: u64, author: &str, state: IssueState) -> Issue {
        Issue {
            id,
            title: format!("Issue {id}"),
            body: None,
            state,
            author: author.to_string(),
            assignees: Vec::new(),
            labels: Vec::new(),
            locked: false,
            created_on: at(1, 0),
            updated_on: at(1, 0),
            closed_on: None,
            due_on: None,
            closed_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_issue_state_display() {
        assert_eq!(IssueState::Open.to_string(), "open");
        assert_eq!(IssueState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_time_to_close_only_for_closed_issues() {
        let mut issue = issue(1, "alice", IssueState::Closed);
        issue.closed_on = Some(at(2, 6));
        assert_eq!(issue.time_to_close(), Some(chrono::Duration::hours(30)));

        issue.closed_on = None;
        assert_eq!(issue.time_to_close(), None);

        let mut open = super::fixtures::issue(2, "bob", IssueState::Open);
        open.closed_on = Some(at(3, 0));
        assert_eq!(open.time_to_close(), None);
    }

    #[test]
    fn test_closers_prefer_reported_closer() {
        let mut issue = issue(1, "alice", IssueState::Closed);
        issue.assignees = vec!["mia".to_string(), "noor".to_string()];
        assert_eq!(issue.closers(), vec!["mia", "noor"]);

        issue.closed_by = Some("alice".to_string());
        assert_eq!(issue.closers(), vec!["alice"]);

        issue.state = IssueState::Open;
        assert!(issue.closers().is_empty());
    }

    #[test]
    fn test_snapshot_is_empty() {
        let mut snapshot = RepositorySnapshot::default();
        assert!(snapshot.is_empty());

        snapshot.labels.insert(1, label(1, "bug"));
        assert!(!snapshot.is_empty());
    }
}
