//! SolverBench - Hyperparameter search and statistical ranking for
//! black-box solvers.
//!
//! # Example
//!
//! ```rust
//! use solverbench::prelude::*;
//!
//! let mut table = ResultTable::new();
//! for (instance, scores) in [("p", [10.0, 10.0, 20.0]), ("q", [5.0, 6.0, 7.0])] {
//!     for (solver, score) in ["A", "B", "C"].iter().zip(scores) {
//!         table.record(instance, *solver, BestResult::new(score, Configuration::new()));
//!     }
//! }
//!
//! let result = RankingEngine::new(Significance::Alpha05).compare(&table).unwrap();
//! assert_eq!(result.mean_rank("A"), Some(1.25));
//! ```

// Data model and persistence
pub use solverbench_core::{
    BestResult, Configuration, InstanceError, ParamValue, ProblemInstance, ResultStore,
    ResultTable, SolverSpec, StoreError,
};

// Configuration
pub use solverbench_config::{
    Bound, ConfigError, ExperimentConfig, ExperimentConfigOverride, GridParam, RandomParam,
    SamplingConfig, SolverConfig,
};

// Ranking
pub use solverbench_stats::{
    CriticalDifferenceResult, FriedmanStatistic, RankingEngine, RankingError, Significance,
    Verdict,
};

// Search, timing and reports
pub use solverbench_benchmark::{
    parse_best_distance, rank_results, run_search, run_timing, BenchError, BestResultTracker,
    CsvExporter, GridSampler, MarkdownReport, ParameterSampler, ProcessInvoker, RandomSampler,
    Sampler, SamplerError, SearchOutcome, SearchSession, SolverInvoker, TimingCollector,
    TimingReport, TrialFailure, TrialRecord,
};

/// Colored console output for search and timing runs.
#[cfg(feature = "console")]
pub use solverbench_console as console;

pub mod prelude {
    pub use super::{
        BestResult, Configuration, ExperimentConfig, ProblemInstance, ResultStore, ResultTable,
        SolverSpec,
    };
    pub use super::{GridSampler, ProcessInvoker, RandomSampler, SearchSession, TimingCollector};
    pub use super::{RankingEngine, Significance};
}
