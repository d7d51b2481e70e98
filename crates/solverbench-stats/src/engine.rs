//! Cross-instance ranking and the critical difference test.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use solverbench_core::ResultTable;

use crate::error::RankingError;
use crate::nemenyi::{critical_value, Significance};
use crate::rank::{rank_scores, RankAssignment};

/// Returns the instances for which every listed solver has a score.
///
/// An empty solver list has no common instances.
pub fn common_instances(table: &ResultTable, solvers: &[&str]) -> Vec<String> {
    if solvers.is_empty() {
        return Vec::new();
    }
    table
        .instances()
        .filter(|instance| {
            solvers
                .iter()
                .all(|solver| table.score(instance, solver).is_some_and(f64::is_finite))
        })
        .map(str::to_string)
        .collect()
}

/// Critical difference for `k` solvers over `n` instances.
///
/// # Example
///
/// ```
/// use solverbench_stats::critical_difference;
///
/// let cd = critical_difference(2.343, 3, 10);
/// assert!((cd - 1.0478).abs() < 1e-4);
/// ```
pub fn critical_difference(q_alpha: f64, k: usize, n: usize) -> f64 {
    let k = k as f64;
    q_alpha * (k * (k + 1.0) / (6.0 * n as f64)).sqrt()
}

/// Friedman omnibus statistics over the mean ranks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FriedmanStatistic {
    /// Friedman chi-square with `k - 1` degrees of freedom.
    pub chi_square: f64,
    /// Iman-Davenport F statistic; `None` when the solvers rank identically
    /// on every instance and the statistic is undefined.
    pub iman_davenport: Option<f64>,
}

impl FriedmanStatistic {
    fn from_mean_ranks(mean_ranks: &BTreeMap<String, f64>, n: usize) -> Self {
        let k = mean_ranks.len() as f64;
        let n = n as f64;
        let sum_sq: f64 = mean_ranks.values().map(|r| r * r).sum();
        let chi_square = 12.0 * n / (k * (k + 1.0)) * (sum_sq - k * (k + 1.0).powi(2) / 4.0);
        let denominator = n * (k - 1.0) - chi_square;
        let iman_davenport =
            (denominator > f64::EPSILON).then(|| (n - 1.0) * chi_square / denominator);
        Self {
            chi_square,
            iman_davenport,
        }
    }
}

/// Outcome of comparing one solver against the reference solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Best-ranked solver.
    pub reference: String,
    /// Solver compared against the reference.
    pub solver: String,
    /// `mean_rank(solver) - mean_rank(reference)`.
    pub difference: f64,
    /// Whether `difference` exceeds the critical difference.
    pub significant: bool,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.significant {
            write!(
                f,
                "{} is significantly better than {} (difference {:.3})",
                self.reference, self.solver, self.difference
            )
        } else {
            write!(
                f,
                "difference between {} and {} is not statistically significant (difference {:.3})",
                self.reference, self.solver, self.difference
            )
        }
    }
}

/// Result of a critical difference comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalDifferenceResult {
    /// Number of solvers compared (k).
    pub solver_count: usize,
    /// Number of common instances (N).
    pub instance_count: usize,
    /// The common instances, sorted.
    pub instances: Vec<String>,
    /// Per-instance rank assignments.
    pub rank_assignments: BTreeMap<String, RankAssignment>,
    /// Mean rank per solver.
    pub mean_ranks: BTreeMap<String, f64>,
    /// Significance level used.
    pub alpha: f64,
    /// Critical value `q_alpha` for k solvers.
    pub q_alpha: f64,
    /// Critical difference.
    pub critical_difference: f64,
    /// Solver with the lowest mean rank.
    pub reference: String,
    /// One verdict per non-reference solver, best mean rank first.
    pub verdicts: Vec<Verdict>,
    /// Friedman omnibus statistics.
    pub friedman: FriedmanStatistic,
}

impl CriticalDifferenceResult {
    /// Returns a solver's mean rank.
    pub fn mean_rank(&self, solver: &str) -> Option<f64> {
        self.mean_ranks.get(solver).copied()
    }

    /// Returns solvers ordered by mean rank (ties by name).
    pub fn ordering(&self) -> Vec<&str> {
        let mut solvers: Vec<(&str, f64)> = self
            .mean_ranks
            .iter()
            .map(|(s, r)| (s.as_str(), *r))
            .collect();
        solvers.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        solvers.into_iter().map(|(s, _)| s).collect()
    }

    /// Returns the verdict for a non-reference solver.
    pub fn verdict(&self, solver: &str) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.solver == solver)
    }

    /// Whether the mean ranks of two solvers differ by more than the
    /// critical difference.
    pub fn is_significant(&self, a: &str, b: &str) -> Option<bool> {
        let (ra, rb) = (self.mean_rank(a)?, self.mean_rank(b)?);
        Some((ra - rb).abs() > self.critical_difference)
    }
}

/// Ranks solvers across instances and applies the Nemenyi test.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    significance: Significance,
    tie_tolerance: f64,
}

impl RankingEngine {
    /// Creates an engine using exact score equality for ties.
    pub fn new(significance: Significance) -> Self {
        Self {
            significance,
            tie_tolerance: 0.0,
        }
    }

    /// Sets the absolute tolerance under which scores tie.
    pub fn with_tie_tolerance(mut self, tolerance: f64) -> Self {
        self.tie_tolerance = tolerance.max(0.0);
        self
    }

    /// Compares every solver that appears in the table.
    pub fn compare(&self, table: &ResultTable) -> Result<CriticalDifferenceResult, RankingError> {
        let solvers: Vec<&str> = table.solvers().into_iter().collect();
        self.compare_solvers(table, &solvers)
    }

    /// Compares the listed solvers.
    ///
    /// # Errors
    ///
    /// - [`RankingError::TooFewSolvers`] for fewer than two distinct solvers
    /// - [`RankingError::NoCommonInstances`] if no instance has a score from
    ///   every listed solver
    /// - [`RankingError::UnsupportedSolverCount`] if `q_alpha` is not tabulated
    pub fn compare_solvers(
        &self,
        table: &ResultTable,
        solvers: &[&str],
    ) -> Result<CriticalDifferenceResult, RankingError> {
        let solvers: Vec<&str> = solvers
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let k = solvers.len();
        if k < 2 {
            return Err(RankingError::TooFewSolvers(k));
        }

        let instances = common_instances(table, &solvers);
        if instances.is_empty() {
            return Err(RankingError::NoCommonInstances {
                solvers: solvers.iter().map(|s| s.to_string()).collect(),
            });
        }
        let n = instances.len();
        let q_alpha = critical_value(k, self.significance)?;

        let mut rank_assignments = BTreeMap::new();
        let mut rank_totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for instance in &instances {
            let scores = solvers
                .iter()
                .filter_map(|&solver| table.score(instance, solver).map(|s| (solver, s)));
            let ranks = rank_scores(scores, self.tie_tolerance);
            for (solver, rank) in ranks.iter() {
                let entry = rank_totals.entry(solver.to_string()).or_insert((0.0, 0));
                entry.0 += rank;
                entry.1 += 1;
            }
            rank_assignments.insert(instance.clone(), ranks);
        }

        let mean_ranks: BTreeMap<String, f64> = rank_totals
            .into_iter()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(solver, (total, count))| (solver, total / count as f64))
            .collect();

        let cd = critical_difference(q_alpha, k, n);
        let (reference, verdicts) = judge(&mean_ranks, cd);
        let friedman = FriedmanStatistic::from_mean_ranks(&mean_ranks, n);

        Ok(CriticalDifferenceResult {
            solver_count: k,
            instance_count: n,
            instances,
            rank_assignments,
            mean_ranks,
            alpha: self.significance.alpha(),
            q_alpha,
            critical_difference: cd,
            reference,
            verdicts,
            friedman,
        })
    }
}

/// Picks the best mean rank as reference and compares the others to it.
pub(crate) fn judge(mean_ranks: &BTreeMap<String, f64>, cd: f64) -> (String, Vec<Verdict>) {
    let mut ordered: Vec<(&String, f64)> = mean_ranks.iter().map(|(s, r)| (s, *r)).collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let Some(&(reference, reference_rank)) = ordered.first() else {
        return (String::new(), Vec::new());
    };

    let verdicts = ordered[1..]
        .iter()
        .map(|&(solver, rank)| {
            let difference = rank - reference_rank;
            Verdict {
                reference: reference.clone(),
                solver: solver.clone(),
                difference,
                significant: difference > cd,
            }
        })
        .collect();

    (reference.clone(), verdicts)
}

#[cfg(test)]
mod tests;
