//! Statistics engine.
//!
//! [`compute_stats`] is a pure function of a [`RepositorySnapshot`]: it makes
//! no requests and yields the same tree for the same snapshot.
//!
//! The root is a branch whose children are categories and whose total is the
//! number of categories:
//!
//! - `Issues` ([`issue_stats`]): total is the number of issues.
//! - `Repository`: total is the number of branches, with `Branches`, `Labels`
//!   and `Issues` leaves.

mod issues;
mod summary;
mod tree;

use std::collections::BTreeMap;

use crate::model::RepositorySnapshot;

pub use issues::issue_stats;
pub use summary::Summary;
pub use tree::StatsTree;

/// Names of the nodes under the `Issues` category.
pub mod names {
    pub use super::issues::{
        ALL, BY_ASSIGNEE, CLOSED, CLOSED_BY_AUTHOR, CLOSED_BY_CONTRIBUTOR, CLOSED_BY_USER,
        LABELS, OPEN, OPEN_BY_USER, TIME_TO_CLOSE,
    };

    pub const ISSUES: &str = "Issues";
    pub const REPOSITORY: &str = "Repository";
    pub const BRANCHES: &str = "Branches";
}

fn repository_stats(snapshot: &RepositorySnapshot) -> StatsTree {
    StatsTree::branch(
        snapshot.branches.len() as u64,
        BTreeMap::from([
            (
                names::BRANCHES.to_string(),
                StatsTree::leaf(snapshot.branches.len() as u64),
            ),
            (
                names::LABELS.to_string(),
                StatsTree::leaf(snapshot.labels.len() as u64),
            ),
            (
                names::ISSUES.to_string(),
                StatsTree::leaf(snapshot.issues.len() as u64),
            ),
        ]),
    )
}

/// Derive the full statistics tree for a snapshot.
pub fn compute_stats(snapshot: &RepositorySnapshot) -> StatsTree {
    let categories = BTreeMap::from([
        (names::ISSUES.to_string(), issue_stats(snapshot)),
        (names::REPOSITORY.to_string(), repository_stats(snapshot)),
    ]);
    StatsTree::branch(categories.len() as u64, categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IssueState;
    use crate::model::fixtures::{issue, label};

    #[test]
    fn test_root_lists_categories() {
        let tree = compute_stats(&RepositorySnapshot::default());
        assert_eq!(tree.total(), 2);
        assert!(tree.get(&[names::ISSUES]).is_some());
        assert!(tree.get(&[names::REPOSITORY]).is_some());
    }

    #[test]
    fn test_repository_category() {
        let mut snapshot = RepositorySnapshot {
            name: "o/r".to_string(),
            default_branch: "main".to_string(),
            branches: vec!["main".to_string(), "dev".to_string(), "gh-pages".to_string()],
            ..Default::default()
        };
        snapshot.labels.insert(1, label(1, "bug"));
        snapshot.issues.insert(1, issue(1, "A", IssueState::Open));

        let tree = compute_stats(&snapshot);
        assert_eq!(tree.total_at(&[names::REPOSITORY]), Some(3));
        assert_eq!(tree.total_at(&[names::REPOSITORY, names::BRANCHES]), Some(3));
        assert_eq!(tree.total_at(&[names::REPOSITORY, names::LABELS]), Some(1));
        assert_eq!(tree.total_at(&[names::REPOSITORY, names::ISSUES]), Some(1));
    }

    #[test]
    fn test_deterministic() {
        let mut snapshot = RepositorySnapshot::default();
        for (id, author) in [(3, "c"), (1, "a"), (2, "b")] {
            snapshot.issues.insert(id, issue(id, author, IssueState::Open));
        }
        let first = serde_json::to_string(&compute_stats(&snapshot)).unwrap();
        let second = serde_json::to_string(&compute_stats(&snapshot.clone())).unwrap();
        assert_eq!(first, second);
    }
}
