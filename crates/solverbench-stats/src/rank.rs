//! Per-instance rank assignment.

use std::collections::BTreeMap;

/// Ranks of the solvers that took part in one instance.
///
/// Rank 1 is the shortest distance. Tied solvers share the mean of the
/// positions they occupy, so the ranks of `m` solvers always sum to
/// `m(m+1)/2`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankAssignment {
    ranks: BTreeMap<String, f64>,
}

impl RankAssignment {
    /// Returns the rank of a solver.
    pub fn rank(&self, solver: &str) -> Option<f64> {
        self.ranks.get(solver).copied()
    }

    /// Iterates over `(solver, rank)` in solver name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ranks.iter().map(|(s, r)| (s.as_str(), *r))
    }

    /// Returns the number of ranked solvers.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Returns true if no solver was ranked.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Returns the sum of all ranks.
    pub fn rank_sum(&self) -> f64 {
        self.ranks.values().sum()
    }
}

/// Assigns competition ranks to scores (lower is better).
///
/// Two scores tie when the larger exceeds the smallest score of its tie
/// group by at most `tolerance`; a tolerance of `0.0` means exact equality.
/// NaN scores are treated as absent and receive no rank.
///
/// # Example
///
/// ```
/// use solverbench_stats::rank_scores;
///
/// let ranks = rank_scores([("a", 10.0), ("b", 10.0), ("c", 20.0)], 0.0);
/// assert_eq!(ranks.rank("a"), Some(1.5));
/// assert_eq!(ranks.rank("b"), Some(1.5));
/// assert_eq!(ranks.rank("c"), Some(3.0));
/// assert_eq!(ranks.rank_sum(), 6.0);
/// ```
pub fn rank_scores<'a>(
    scores: impl IntoIterator<Item = (&'a str, f64)>,
    tolerance: f64,
) -> RankAssignment {
    let mut sorted: Vec<(&str, f64)> = scores
        .into_iter()
        .filter(|(_, score)| !score.is_nan())
        .collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let mut ranks = BTreeMap::new();
    let mut start = 0;
    while start < sorted.len() {
        let anchor = sorted[start].1;
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].1 - anchor <= tolerance {
            end += 1;
        }

        // Positions start..=end are 1-based start+1..=end+1.
        let shared = (start + end + 2) as f64 / 2.0;
        for &(solver, _) in &sorted[start..=end] {
            ranks.insert(solver.to_string(), shared);
        }
        start = end + 1;
    }

    RankAssignment { ranks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distinct_scores() {
        let ranks = rank_scores([("x", 3.0), ("y", 1.0), ("z", 2.0)], 0.0);
        assert_eq!(ranks.rank("y"), Some(1.0));
        assert_eq!(ranks.rank("z"), Some(2.0));
        assert_eq!(ranks.rank("x"), Some(3.0));
    }

    #[test]
    fn test_three_way_tie_in_middle() {
        let ranks = rank_scores(
            [("a", 1.0), ("b", 5.0), ("c", 5.0), ("d", 5.0), ("e", 9.0)],
            0.0,
        );
        assert_eq!(ranks.rank("a"), Some(1.0));
        assert_eq!(ranks.rank("b"), Some(3.0));
        assert_eq!(ranks.rank("d"), Some(3.0));
        assert_eq!(ranks.rank("e"), Some(5.0));
    }

    #[test]
    fn test_near_equal_scores_are_distinct_without_tolerance() {
        let ranks = rank_scores([("a", 7542.0), ("b", 7542.000_000_1)], 0.0);
        assert_eq!(ranks.rank("a"), Some(1.0));
        assert_eq!(ranks.rank("b"), Some(2.0));
    }

    #[test]
    fn test_tolerance_groups_from_anchor() {
        // 10.0 and 10.4 tie, 10.8 is beyond 0.5 of the group's anchor.
        let ranks = rank_scores([("a", 10.0), ("b", 10.4), ("c", 10.8)], 0.5);
        assert_eq!(ranks.rank("a"), Some(1.5));
        assert_eq!(ranks.rank("b"), Some(1.5));
        assert_eq!(ranks.rank("c"), Some(3.0));
    }

    #[test]
    fn test_nan_is_absent() {
        let ranks = rank_scores([("a", f64::NAN), ("b", 4.0)], 0.0);
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks.rank("a"), None);
        assert_eq!(ranks.rank("b"), Some(1.0));
    }

    #[test]
    fn test_empty() {
        assert!(rank_scores(std::iter::empty::<(&str, f64)>(), 0.0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_rank_sum_is_triangular(scores in prop::collection::vec(0u8..6, 1..12)) {
            let names: Vec<String> = (0..scores.len()).map(|i| format!("s{}", i)).collect();
            let ranks = rank_scores(
                names.iter().map(String::as_str).zip(scores.iter().map(|&s| s as f64)),
                0.0,
            );
            let m = scores.len() as f64;
            prop_assert_eq!(ranks.len(), scores.len());
            prop_assert!((ranks.rank_sum() - m * (m + 1.0) / 2.0).abs() < 1e-9);
            for (_, rank) in ranks.iter() {
                prop_assert!((1.0..=m).contains(&rank));
            }
        }

        #[test]
        fn prop_lower_score_never_ranks_worse(scores in prop::collection::vec(0u8..6, 2..12)) {
            let names: Vec<String> = (0..scores.len()).map(|i| format!("s{}", i)).collect();
            let ranks = rank_scores(
                names.iter().map(String::as_str).zip(scores.iter().map(|&s| s as f64)),
                0.0,
            );
            for i in 0..scores.len() {
                for j in 0..scores.len() {
                    let (ri, rj) = (ranks.rank(&names[i]).unwrap(), ranks.rank(&names[j]).unwrap());
                    if scores[i] < scores[j] {
                        prop_assert!(ri < rj);
                    } else if scores[i] == scores[j] {
                        prop_assert_eq!(ri, rj);
                    }
                }
            }
        }
    }
}
