//! Hyperparameter search and timing driver for external solvers.
//!
//! This crate runs black-box solver executables and turns their output into
//! a [`ResultTable`](solverbench_core::ResultTable):
//!
//! - [`ProcessInvoker`] runs one configuration and parses its score
//! - [`GridSampler`] and [`RandomSampler`] generate configurations
//! - [`BestResultTracker`] folds trials into the best result of a pair
//! - [`SearchSession`] drives the search over all solvers and instances
//! - [`rank_results`] runs the critical difference test on a table
//! - [`TimingCollector`] replays best configurations and times them
//! - [`MarkdownReport`] and [`CsvExporter`] render the outcome
//!
//! Per-trial failures are values ([`TrialFailure`]) that the tracker skips;
//! only structural problems surface as [`BenchError`].
//!
//! # Example
//!
//! ```
//! use solverbench_benchmark::{RandomSampler, SearchSession, TrialFailure};
//! use solverbench_config::{Bound, RandomParam};
//! use solverbench_core::{Configuration, ProblemInstance, SolverSpec};
//!
//! let sampler = RandomSampler::new(20, vec![RandomParam::UniformReal {
//!     flag: "-cooling".into(),
//!     low: Bound::Fixed(0.9),
//!     high: Bound::Fixed(0.9999),
//! }]);
//!
//! // Stand-in for ./annealing: slower cooling gives shorter routes.
//! let annealing = |_: &SolverSpec, _: &ProblemInstance, c: &Configuration| -> Result<f64, TrialFailure> {
//!     Ok(8000.0 * (2.0 - c.get("-cooling").map_or(0.0, |v| v.as_f64())))
//! };
//!
//! let outcome = SearchSession::new(annealing)
//!     .with_seed(42)
//!     .with_solver(SolverSpec::new("annealing", "./annealing"), sampler)
//!     .run(&[ProblemInstance::new("berlin52", "tsp_maps/berlin52.tsp", 52)]);
//!
//! let best = outcome.table.get("berlin52", "annealing").unwrap();
//! assert_eq!(outcome.trials.len(), 20);
//! assert!(outcome.trials.iter().all(|t| t.score().unwrap() >= best.score));
//! ```

mod error;
mod invoker;
mod ranking;
mod report;
mod sampler;
mod session;
mod timing;
mod tracker;

pub use error::BenchError;
pub use invoker::{parse_best_distance, ProcessInvoker, SolverInvoker, TrialFailure};
pub use ranking::rank_results;
pub use report::{CsvExporter, MarkdownReport};
pub use sampler::{GridIter, GridSampler, ParameterSampler, RandomSampler, Sampler, SamplerError};
pub use session::{
    discover_instances, run_search, SearchOutcome, SearchSession, SkippedPair, TrialRecord,
};
pub use timing::{
    percent_difference, run_timing, SolverTiming, TimingCollector, TimingComparison, TimingReport,
};
pub use tracker::{fold_best, BestResultTracker};
