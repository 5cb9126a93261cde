use std::collections::BTreeMap;

use super::tree::StatsTree;

/// Order statistics of a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl Summary {
    /// Summarize a sample. `None` for an empty sample.
    ///
    /// For an even number of values the median is the mean of the two
    /// middle ones.
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        if sample.is_empty() {
            return None;
        }

        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sum / count as f64,
            median,
        })
    }

    /// `min`, `max`, `mean` and `median` leaves, rounded to whole units and
    /// clamped at zero. The branch total is the sample size.
    pub fn to_tree(&self) -> StatsTree {
        let round = |v: f64| v.max(0.0).round() as u64;
        StatsTree::branch(
            self.count as u64,
            BTreeMap::from([
                ("min".to_string(), StatsTree::leaf(round(self.min))),
                ("max".to_string(), StatsTree::leaf(round(self.max))),
                ("mean".to_string(), StatsTree::leaf(round(self.mean))),
                ("median".to_string(), StatsTree::leaf(round(self.median))),
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        assert_eq!(Summary::from_sample(&[]), None);
    }

    #[test]
    fn test_odd_sample() {
        let s = Summary::from_sample(&[5.0, 1.0, 3.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn test_even_sample_median_averages_middle_values() {
        let s = Summary::from_sample(&[4.0, 1.0, 2.0, 10.0]).unwrap();
        assert_eq!(s.median, 3.0);
        assert_eq!(s.mean, 4.25);
    }

    #[test]
    fn test_to_tree_rounds() {
        let s = Summary::from_sample(&[1.4, 2.6]).unwrap();
        let tree = s.to_tree();
        assert_eq!(tree.total(), 2);
        assert_eq!(tree.total_at(&["min"]), Some(1));
        assert_eq!(tree.total_at(&["max"]), Some(3));
        assert_eq!(tree.total_at(&["mean"]), Some(2));
        assert_eq!(tree.total_at(&["median"]), Some(2));
    }
}
