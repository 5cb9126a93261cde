use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Recursive aggregation structure.
///
/// A leaf is a single count. A branch carries its own `total`, which is not
/// necessarily the sum of its children; each node documents what its total
/// means.
///
/// Serialized untagged, so a leaf is a bare number and a branch is
/// `{"total": n, "values": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsTree {
    Leaf(u64),
    Branch {
        total: u64,
        values: BTreeMap<String, StatsTree>,
    },
}

impl StatsTree {
    pub fn leaf(value: u64) -> Self {
        Self::Leaf(value)
    }

    pub fn branch(total: u64, values: BTreeMap<String, StatsTree>) -> Self {
        Self::Branch { total, values }
    }

    /// A branch with no children.
    pub fn empty(total: u64) -> Self {
        Self::Branch {
            total,
            values: BTreeMap::new(),
        }
    }

    /// Build a branch of leaves from `name -> count` pairs.
    pub fn counts<I, K>(total: u64, counts: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        Self::Branch {
            total,
            values: counts
                .into_iter()
                .map(|(k, v)| (k.into(), Self::Leaf(v)))
                .collect(),
        }
    }

    /// The leaf value, or a branch's total.
    pub fn total(&self) -> u64 {
        match self {
            Self::Leaf(value) => *value,
            Self::Branch { total, .. } => *total,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Children of a branch; `None` for leaves.
    pub fn values(&self) -> Option<&BTreeMap<String, StatsTree>> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch { values, .. } => Some(values),
        }
    }

    /// Look up a descendant by the names along its path.
    ///
    /// ```
    /// use repostats::stats::StatsTree;
    /// use std::collections::BTreeMap;
    ///
    /// let inner = StatsTree::counts(1, [("alice", 1)]);
    /// let tree = StatsTree::branch(1, BTreeMap::from([("Open".to_string(), inner)]));
    /// assert_eq!(tree.get(&["Open", "alice"]), Some(&StatsTree::Leaf(1)));
    /// assert_eq!(tree.get(&["Closed"]), None);
    /// ```
    pub fn get(&self, path: &[&str]) -> Option<&StatsTree> {
        path.iter()
            .try_fold(self, |node, name| node.values()?.get(*name))
    }

    /// Value (leaf) or total (branch) at `path`.
    pub fn total_at(&self, path: &[&str]) -> Option<u64> {
        self.get(path).map(Self::total)
    }
}

/// Increment a named counter.
pub(crate) fn bump(counts: &mut BTreeMap<String, u64>, key: &str) {
    *counts.entry(key.to_string()).or_default() += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_untagged() {
        let tree = StatsTree::branch(
            3,
            BTreeMap::from([
                ("a".to_string(), StatsTree::leaf(1)),
                ("b".to_string(), StatsTree::counts(2, [("x", 2)])),
            ]),
        );
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total": 3,
                "values": { "a": 1, "b": { "total": 2, "values": { "x": 2 } } }
            })
        );

        let back: StatsTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_total_and_lookup() {
        let tree = StatsTree::counts(5, [("alice", 2), ("bob", 1)]);
        assert_eq!(tree.total(), 5);
        assert!(!tree.is_leaf());
        assert_eq!(tree.total_at(&["alice"]), Some(2));
        assert_eq!(tree.total_at(&["carol"]), None);
        assert_eq!(tree.get(&[]), Some(&tree));

        let leaf = StatsTree::leaf(4);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.values(), None);
        assert_eq!(leaf.get(&["anything"]), None);
    }

    #[test]
    fn test_bump() {
        let mut counts = BTreeMap::new();
        bump(&mut counts, "alice");
        bump(&mut counts, "alice");
        bump(&mut counts, "bob");
        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.get("bob"), Some(&1));
    }
}
