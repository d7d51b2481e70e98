//! Ranking errors.

use thiserror::Error;

/// Reasons a ranking pass cannot produce a verdict.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    /// No instance has a score from every compared solver.
    #[error("no comparison possible: no instance has results for all of {}", .solvers.join(", "))]
    NoCommonInstances { solvers: Vec<String> },

    /// A comparison needs at least two solvers.
    #[error("at least two solvers are required, got {0}")]
    TooFewSolvers(usize),

    /// The critical value for this solver count is not tabulated.
    #[error("no Nemenyi critical value for k = {k} at alpha = {alpha}")]
    UnsupportedSolverCount { k: usize, alpha: f64 },
}
