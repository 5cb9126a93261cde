//! The "Issues" category.

use std::collections::BTreeMap;

use super::summary::Summary;
use super::tree::{StatsTree, bump};
use crate::model::{IssueState, RepositorySnapshot};

pub const OPEN_BY_USER: &str = "Open issues by user";
pub const CLOSED_BY_USER: &str = "Closed issues by user";
pub const CLOSED_BY_CONTRIBUTOR: &str = "Issues closed by contributor";
pub const BY_ASSIGNEE: &str = "Issues by assignee";
pub const LABELS: &str = "Labels";
pub const ALL: &str = "All";
pub const CLOSED_BY_AUTHOR: &str = "Closed by author";
pub const TIME_TO_CLOSE: &str = "Time to close (hours)";

pub const OPEN: &str = "Open";
pub const CLOSED: &str = "Closed";

#[derive(Debug, Default)]
struct OpenClosed {
    open: u64,
    closed: u64,
}

impl OpenClosed {
    fn add(&mut self, state: IssueState) {
        match state {
            IssueState::Open => self.open += 1,
            IssueState::Closed => self.closed += 1,
        }
    }

    fn total(&self) -> u64 {
        self.open + self.closed
    }

    fn to_tree(&self) -> StatsTree {
        StatsTree::counts(self.total(), [(OPEN, self.open), (CLOSED, self.closed)])
    }
}

/// Build the "Issues" node in a single pass over the snapshot's issues.
pub fn issue_stats(snapshot: &RepositorySnapshot) -> StatsTree {
    let mut open_by_user = BTreeMap::new();
    let mut closed_by_user = BTreeMap::new();
    let mut closed_by_contributor = BTreeMap::new();
    let mut by_assignee = BTreeMap::new();
    let mut closed_by_author = BTreeMap::new();
    let mut per_author: BTreeMap<String, OpenClosed> = BTreeMap::new();
    let mut hours_to_close = Vec::new();

    // Every known label is listed even when no issue carries it.
    let mut labels: BTreeMap<String, OpenClosed> = snapshot
        .labels
        .values()
        .map(|label| (label.name.clone(), OpenClosed::default()))
        .collect();
    let mut label_applications = 0u64;
    let mut assigned = 0u64;
    let mut closed_with_closer = 0u64;

    for issue in snapshot.issues.values() {
        match issue.state {
            IssueState::Open => bump(&mut open_by_user, &issue.author),
            IssueState::Closed => bump(&mut closed_by_user, &issue.author),
        }
        per_author
            .entry(issue.author.clone())
            .or_default()
            .add(issue.state);

        let closers = issue.closers();
        if !closers.is_empty() {
            closed_with_closer += 1;
        }
        for closer in &closers {
            bump(&mut closed_by_contributor, closer);
        }
        if closers.contains(&issue.author.as_str()) {
            bump(&mut closed_by_author, &issue.author);
        }

        if !issue.assignees.is_empty() {
            assigned += 1;
        }
        for assignee in &issue.assignees {
            bump(&mut by_assignee, assignee);
        }

        for label in &issue.labels {
            label_applications += 1;
            labels.entry(label.name.clone()).or_default().add(issue.state);
        }

        if let Some(elapsed) = issue.time_to_close() {
            hours_to_close.push(elapsed.num_seconds() as f64 / 3600.0);
        }
    }

    let sum = |counts: &BTreeMap<String, u64>| counts.values().sum::<u64>();

    let mut values = BTreeMap::new();
    values.insert(
        OPEN_BY_USER.to_string(),
        StatsTree::counts(sum(&open_by_user), open_by_user),
    );
    values.insert(
        CLOSED_BY_USER.to_string(),
        StatsTree::counts(sum(&closed_by_user), closed_by_user),
    );
    values.insert(
        CLOSED_BY_CONTRIBUTOR.to_string(),
        StatsTree::counts(closed_with_closer, closed_by_contributor),
    );
    values.insert(
        BY_ASSIGNEE.to_string(),
        StatsTree::counts(assigned, by_assignee),
    );
    values.insert(
        LABELS.to_string(),
        StatsTree::branch(
            label_applications,
            labels
                .into_iter()
                .map(|(name, counts)| (name, counts.to_tree()))
                .collect(),
        ),
    );
    values.insert(
        ALL.to_string(),
        StatsTree::branch(
            snapshot.issues.len() as u64,
            per_author
                .into_iter()
                .map(|(author, counts)| (author, counts.to_tree()))
                .collect(),
        ),
    );
    values.insert(
        CLOSED_BY_AUTHOR.to_string(),
        StatsTree::counts(sum(&closed_by_author), closed_by_author),
    );
    values.insert(
        TIME_TO_CLOSE.to_string(),
        Summary::from_sample(&hours_to_close)
            .map(|s| s.to_tree())
            .unwrap_or_else(|| StatsTree::empty(0)),
    );

    StatsTree::branch(snapshot.issues.len() as u64, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, issue, label};

    fn snapshot_with(issues: Vec<crate::model::Issue>) -> RepositorySnapshot {
        RepositorySnapshot {
            name: "o/r".to_string(),
            default_branch: "main".to_string(),
            issues: issues.into_iter().map(|i| (i.id, i)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_and_closed_by_user() {
        let snapshot = snapshot_with(vec![
            issue(1, "A", IssueState::Open),
            issue(2, "A", IssueState::Closed),
            issue(3, "B", IssueState::Open),
        ]);
        let tree = issue_stats(&snapshot);

        assert_eq!(tree.total(), 3);
        assert_eq!(tree.total_at(&[OPEN_BY_USER]), Some(2));
        assert_eq!(tree.total_at(&[OPEN_BY_USER, "A"]), Some(1));
        assert_eq!(tree.total_at(&[OPEN_BY_USER, "B"]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_USER]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_USER, "A"]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_USER, "B"]), None);
    }

    #[test]
    fn test_all_breaks_down_per_author() {
        let snapshot = snapshot_with(vec![
            issue(1, "A", IssueState::Open),
            issue(2, "A", IssueState::Closed),
            issue(3, "B", IssueState::Open),
        ]);
        let tree = issue_stats(&snapshot);

        assert_eq!(tree.total_at(&[ALL]), Some(3));
        assert_eq!(tree.total_at(&[ALL, "A"]), Some(2));
        assert_eq!(tree.total_at(&[ALL, "A", OPEN]), Some(1));
        assert_eq!(tree.total_at(&[ALL, "A", CLOSED]), Some(1));
        assert_eq!(tree.total_at(&[ALL, "B", CLOSED]), Some(0));
    }

    #[test]
    fn test_labels_are_seeded_and_counted_per_application() {
        let bug = label(1, "bug");
        let docs = label(2, "docs");
        let stray = label(99, "wontfix");

        let mut one = issue(1, "A", IssueState::Open);
        one.labels = vec![bug.clone(), stray.clone()];
        let mut two = issue(2, "B", IssueState::Closed);
        two.labels = vec![bug.clone()];

        let mut snapshot = snapshot_with(vec![one, two]);
        snapshot.labels.insert(bug.id, bug);
        snapshot.labels.insert(docs.id, docs);

        let tree = issue_stats(&snapshot);
        assert_eq!(tree.total_at(&[LABELS]), Some(3));
        assert_eq!(tree.total_at(&[LABELS, "bug"]), Some(2));
        assert_eq!(tree.total_at(&[LABELS, "bug", OPEN]), Some(1));
        assert_eq!(tree.total_at(&[LABELS, "bug", CLOSED]), Some(1));
        assert_eq!(tree.total_at(&[LABELS, "docs"]), Some(0));
        // Labels missing from the label map are added on the fly.
        assert_eq!(tree.total_at(&[LABELS, "wontfix"]), Some(1));
    }

    #[test]
    fn test_closers_and_closed_by_author() {
        let mut one = issue(1, "A", IssueState::Closed);
        one.closed_by = Some("A".to_string());
        let mut two = issue(2, "B", IssueState::Closed);
        two.closed_by = Some("A".to_string());
        let three = issue(3, "B", IssueState::Closed);

        let tree = issue_stats(&snapshot_with(vec![one, two, three]));
        assert_eq!(tree.total_at(&[CLOSED_BY_CONTRIBUTOR]), Some(2));
        assert_eq!(tree.total_at(&[CLOSED_BY_CONTRIBUTOR, "A"]), Some(2));
        assert_eq!(tree.total_at(&[CLOSED_BY_AUTHOR]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_AUTHOR, "A"]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_AUTHOR, "B"]), None);
    }

    #[test]
    fn test_closers_fall_back_to_assignees() {
        // List responses carry assignees but never `closed_by`.
        let mut one = issue(1, "A", IssueState::Closed);
        one.assignees = vec!["M".to_string()];
        let mut two = issue(2, "B", IssueState::Closed);
        two.assignees = vec!["M".to_string(), "B".to_string()];
        let mut open = issue(3, "C", IssueState::Open);
        open.assignees = vec!["M".to_string()];

        let tree = issue_stats(&snapshot_with(vec![one, two, open]));
        assert_eq!(tree.total_at(&[CLOSED_BY_CONTRIBUTOR]), Some(2));
        assert_eq!(tree.total_at(&[CLOSED_BY_CONTRIBUTOR, "M"]), Some(2));
        assert_eq!(tree.total_at(&[CLOSED_BY_CONTRIBUTOR, "B"]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_AUTHOR]), Some(1));
        assert_eq!(tree.total_at(&[CLOSED_BY_AUTHOR, "B"]), Some(1));
    }

    #[test]
    fn test_assignees() {
        let mut one = issue(1, "A", IssueState::Open);
        one.assignees = vec!["x".to_string(), "y".to_string()];
        let mut two = issue(2, "A", IssueState::Open);
        two.assignees = vec!["x".to_string()];
        let three = issue(3, "A", IssueState::Open);

        let tree = issue_stats(&snapshot_with(vec![one, two, three]));
        assert_eq!(tree.total_at(&[BY_ASSIGNEE]), Some(2));
        assert_eq!(tree.total_at(&[BY_ASSIGNEE, "x"]), Some(2));
        assert_eq!(tree.total_at(&[BY_ASSIGNEE, "y"]), Some(1));
    }

    #[test]
    fn test_time_to_close() {
        let mut one = issue(1, "A", IssueState::Closed);
        one.closed_on = Some(at(1, 2));
        let mut two = issue(2, "A", IssueState::Closed);
        two.closed_on = Some(at(1, 10));
        let mut three = issue(3, "A", IssueState::Closed);
        three.closed_on = Some(at(2, 0));
        let open = issue(4, "A", IssueState::Open);

        let tree = issue_stats(&snapshot_with(vec![one, two, three, open]));
        assert_eq!(tree.total_at(&[TIME_TO_CLOSE]), Some(3));
        assert_eq!(tree.total_at(&[TIME_TO_CLOSE, "min"]), Some(2));
        assert_eq!(tree.total_at(&[TIME_TO_CLOSE, "max"]), Some(24));
        assert_eq!(tree.total_at(&[TIME_TO_CLOSE, "mean"]), Some(12));
        assert_eq!(tree.total_at(&[TIME_TO_CLOSE, "median"]), Some(10));
    }

    #[test]
    fn test_empty_snapshot() {
        let tree = issue_stats(&RepositorySnapshot::default());
        assert_eq!(tree.total(), 0);
        assert_eq!(tree.values().map(|v| v.len()), Some(8));
        assert_eq!(tree.total_at(&[TIME_TO_CLOSE]), Some(0));
        assert_eq!(tree.get(&[TIME_TO_CLOSE, "min"]), None);
    }
}
