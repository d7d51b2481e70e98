//! Search session driver.
//!
//! A session folds every configuration of every solver over every instance
//! into a [`ResultTable`]. Each (solver, instance) pair is an isolated fold
//! with its own RNG stream, so pairs can run on a thread pool and still give
//! the same table as a sequential run with the same seed.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use solverbench_config::ExperimentConfig;
use solverbench_core::{
    BestResult, Configuration, ProblemInstance, ResultStore, ResultTable, SolverSpec,
};
use tracing::{debug, info, warn};

use crate::error::BenchError;
use crate::invoker::{ProcessInvoker, SolverInvoker, TrialFailure};
use crate::sampler::{ParameterSampler, Sampler, SamplerError};
use crate::tracker::BestResultTracker;

/// One solver run with one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub instance: String,
    pub solver: String,
    pub configuration: Configuration,
    pub outcome: Result<f64, TrialFailure>,
}

impl TrialRecord {
    /// The trial's score, if it produced one.
    pub fn score(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }
}

/// A pair whose configurations could not be sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub instance: String,
    pub solver: String,
    pub reason: SamplerError,
}

/// Everything a search session produced.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Best result per (instance, solver); pairs with no scored trial are absent.
    pub table: ResultTable,
    /// Every trial, in pair then trial order.
    pub trials: Vec<TrialRecord>,
    /// Pairs skipped before any trial ran.
    pub skipped: Vec<SkippedPair>,
    /// Seed the RNG streams were derived from.
    pub seed: u64,
}

impl SearchOutcome {
    /// Number of trials that produced no score.
    pub fn failed_trials(&self) -> usize {
        self.trials.iter().filter(|t| t.outcome.is_err()).count()
    }
}

struct PairFold {
    instance: String,
    solver: String,
    best: Option<BestResult>,
    trials: Vec<TrialRecord>,
    skipped: Option<SamplerError>,
}

/// Hyperparameter search over a set of solvers and instances.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::{GridSampler, SearchSession, TrialFailure};
/// use solverbench_core::{Configuration, ProblemInstance, SolverSpec};
///
/// // Stand-in solver: the distance is the population size.
/// let invoker = |_: &SolverSpec, _: &ProblemInstance, c: &Configuration| -> Result<f64, TrialFailure> {
///     Ok(c.get("-pop").map_or(0.0, |v| v.as_f64()))
/// };
///
/// let session = SearchSession::new(invoker)
///     .with_seed(1)
///     .with_solver(
///         SolverSpec::new("genetic", "./genetic"),
///         GridSampler::new(Vec::new()).with_param("-pop", [200, 100, 150]),
///     );
///
/// let outcome = session.run(&[ProblemInstance::new("eil51", "tsp_maps/eil51.tsp", 51)]);
/// assert_eq!(outcome.table.score("eil51", "genetic"), Some(100.0));
/// assert_eq!(outcome.trials.len(), 3);
/// ```
pub struct SearchSession<I> {
    invoker: I,
    solvers: Vec<(SolverSpec, Sampler)>,
    seed: Option<u64>,
    parallel: bool,
}

impl<I: SolverInvoker> SearchSession<I> {
    /// Creates a sequential session with no solvers and a random seed.
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            solvers: Vec::new(),
            seed: None,
            parallel: false,
        }
    }

    /// Creates a session for every solver in `config`.
    pub fn from_config(invoker: I, config: &ExperimentConfig) -> Self {
        let mut session = Self::new(invoker).with_parallel(config.parallel);
        session.seed = config.random_seed;
        for solver in &config.solvers {
            session = session.with_solver(solver.spec(), Sampler::from(&solver.sampling));
        }
        session
    }

    /// Adds a solver with its sampling strategy.
    pub fn with_solver(mut self, solver: SolverSpec, sampler: impl Into<Sampler>) -> Self {
        self.solvers.push((solver, sampler.into()));
        self
    }

    /// Fixes the seed for reproducible random sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Runs independent pairs on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the invoker.
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Returns the configured solvers.
    pub fn solvers(&self) -> impl Iterator<Item = &SolverSpec> {
        self.solvers.iter().map(|(spec, _)| spec)
    }
}

impl<I: SolverInvoker + Sync> SearchSession<I> {
    /// Searches every (instance, solver) pair.
    ///
    /// Failed trials and unsampleable pairs are logged and skipped; they
    /// never abort the session.
    pub fn run(&self, instances: &[ProblemInstance]) -> SearchOutcome {
        let seed = self.seed.unwrap_or_else(rand::random);
        let started = Instant::now();
        info!(
            event = "search_start",
            solvers = self.solvers.len(),
            instances = instances.len(),
            seed,
            parallel = self.parallel,
        );

        let pairs: Vec<(&ProblemInstance, &SolverSpec, &Sampler)> = instances
            .iter()
            .flat_map(|instance| {
                self.solvers
                    .iter()
                    .map(move |(spec, sampler)| (instance, spec, sampler))
            })
            .collect();

        let folds: Vec<PairFold> = if self.parallel {
            pairs
                .par_iter()
                .enumerate()
                .map(|(index, &(instance, spec, sampler))| {
                    self.search_pair(seed, index, instance, spec, sampler)
                })
                .collect()
        } else {
            pairs
                .iter()
                .enumerate()
                .map(|(index, &(instance, spec, sampler))| {
                    self.search_pair(seed, index, instance, spec, sampler)
                })
                .collect()
        };

        let mut outcome = SearchOutcome {
            seed,
            ..SearchOutcome::default()
        };
        for fold in folds {
            if let Some(best) = fold.best {
                outcome.table.record(&fold.instance, &fold.solver, best);
            }
            if let Some(reason) = fold.skipped {
                outcome.skipped.push(SkippedPair {
                    instance: fold.instance,
                    solver: fold.solver,
                    reason,
                });
            }
            outcome.trials.extend(fold.trials);
        }

        info!(
            event = "search_end",
            pairs = outcome.table.len(),
            trials = outcome.trials.len(),
            failures = outcome.failed_trials(),
            skipped = outcome.skipped.len(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        outcome
    }

    fn search_pair(
        &self,
        seed: u64,
        index: usize,
        instance: &ProblemInstance,
        spec: &SolverSpec,
        sampler: &Sampler,
    ) -> PairFold {
        let mut fold = PairFold {
            instance: instance.name().to_string(),
            solver: spec.name.clone(),
            best: None,
            trials: Vec::new(),
            skipped: None,
        };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(index as u64);

        info!(
            event = "pair_start",
            solver = %spec.name,
            instance = instance.name(),
            size = instance.size(),
            strategy = sampler.kind(),
            trials = sampler.budget(),
        );
        let started = Instant::now();

        let configurations = match sampler.sample(instance, &mut rng) {
            Ok(configurations) => configurations,
            Err(reason) => {
                warn!(
                    event = "pair_skipped",
                    solver = %spec.name,
                    instance = instance.name(),
                    reason = %reason,
                );
                fold.skipped = Some(reason);
                return fold;
            }
        };

        let mut tracker = BestResultTracker::new();
        for (trial, configuration) in configurations.into_iter().enumerate() {
            let trial_started = Instant::now();
            let outcome = self.invoker.invoke(spec, instance, &configuration);
            let duration_ms = trial_started.elapsed().as_millis() as u64;

            match &outcome {
                Ok(score) => {
                    let improved = tracker.observe(&configuration, Some(*score));
                    debug!(
                        event = "trial_end",
                        solver = %spec.name,
                        instance = instance.name(),
                        trial,
                        score = *score,
                        improved,
                        duration_ms,
                        configuration = %configuration,
                    );
                }
                Err(failure) => {
                    tracker.observe(&configuration, None);
                    warn!(
                        event = "trial_failed",
                        solver = %spec.name,
                        instance = instance.name(),
                        trial,
                        kind = failure.kind(),
                        reason = %failure,
                        configuration = %configuration,
                    );
                }
            }

            fold.trials.push(TrialRecord {
                instance: fold.instance.clone(),
                solver: fold.solver.clone(),
                configuration,
                outcome,
            });
        }

        info!(
            event = "pair_end",
            solver = %spec.name,
            instance = instance.name(),
            trials = tracker.trials(),
            failures = tracker.failures(),
            score = tracker.best().map(|b| b.score),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        fold.best = tracker.finish();
        fold
    }
}

/// Runs the search declared by `config` against local solver executables
/// and persists the result table to `config.results_path`.
pub fn run_search(config: &ExperimentConfig) -> Result<SearchOutcome, BenchError> {
    let instances = discover_instances(config)?;
    let session = SearchSession::from_config(ProcessInvoker::from_config(&config.invocation), config);
    let outcome = session.run(&instances);
    ResultStore::save(&outcome.table, &config.results_path)?;
    info!(
        event = "results_saved",
        path = %config.results_path.display(),
        pairs = outcome.table.len(),
    );
    Ok(outcome)
}

/// Lists the instances of `config.instances_dir`.
pub fn discover_instances(config: &ExperimentConfig) -> Result<Vec<ProblemInstance>, BenchError> {
    let instances = ProblemInstance::discover(&config.instances_dir, &config.instance_extension)?;
    if instances.is_empty() {
        return Err(BenchError::NoInstances {
            dir: config.instances_dir.display().to_string(),
            extension: config.instance_extension.clone(),
        });
    }
    Ok(instances)
}

#[cfg(test)]
mod tests;
