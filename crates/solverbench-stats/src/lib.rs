//! Statistical ranking of solvers across a benchmark suite.
//!
//! Implements the Friedman / Nemenyi procedure (Demšar, 2006):
//!
//! 1. Keep the instances every compared solver has a score for.
//! 2. Rank the solvers on each instance; ties share the mean of their positions.
//! 3. Average each solver's ranks.
//! 4. Compute the critical difference `CD = q_alpha * sqrt(k(k+1) / 6N)`.
//! 5. Compare every solver to the best-ranked one.
//!
//! # Example
//!
//! ```
//! use solverbench_core::{BestResult, Configuration, ResultTable};
//! use solverbench_stats::{RankingEngine, Significance};
//!
//! let mut table = ResultTable::new();
//! for (instance, scores) in [("eil51", [430.0, 445.0, 470.0]), ("st70", [680.0, 700.0, 720.0])] {
//!     for (solver, score) in ["aco", "genetic", "annealing"].iter().zip(scores) {
//!         table.record(instance, *solver, BestResult::new(score, Configuration::new()));
//!     }
//! }
//!
//! let result = RankingEngine::new(Significance::Alpha05).compare(&table).unwrap();
//! assert_eq!(result.reference, "aco");
//! assert_eq!(result.mean_rank("annealing"), Some(3.0));
//! ```

mod engine;
mod error;
mod nemenyi;
mod rank;

pub use engine::{
    common_instances, critical_difference, CriticalDifferenceResult, FriedmanStatistic,
    RankingEngine, Verdict,
};
pub use error::RankingError;
pub use nemenyi::{critical_value, Significance, MAX_TABULATED_SOLVERS};
pub use rank::{rank_scores, RankAssignment};
