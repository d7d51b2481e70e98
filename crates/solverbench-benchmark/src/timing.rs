//! Wall-clock timing of best configurations.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use solverbench_config::ExperimentConfig;
use solverbench_core::{ProblemInstance, ResultTable, SolverSpec};
use tracing::{debug, info, warn};

use crate::error::BenchError;
use crate::invoker::{ProcessInvoker, SolverInvoker};
use crate::session::discover_instances;

/// Percentage by which `slowest` exceeds `fastest`.
///
/// `None` when `fastest` is not a positive duration.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::percent_difference;
///
/// assert_eq!(percent_difference(2.0, 5.0), Some(150.0));
/// assert_eq!(percent_difference(0.0, 5.0), None);
/// ```
pub fn percent_difference(fastest_secs: f64, slowest_secs: f64) -> Option<f64> {
    (fastest_secs > 0.0).then(|| (slowest_secs - fastest_secs) / fastest_secs * 100.0)
}

/// Successful replay durations of one solver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverTiming {
    pub solver: String,
    /// Durations per instance name.
    pub instances: BTreeMap<String, Vec<Duration>>,
    /// Replays that produced no score.
    pub failures: usize,
}

impl SolverTiming {
    pub fn new(solver: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            ..Self::default()
        }
    }

    /// Adds one successful replay.
    pub fn record(&mut self, instance: impl Into<String>, duration: Duration) {
        self.instances.entry(instance.into()).or_default().push(duration);
    }

    /// Number of successful replays.
    pub fn samples(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    /// Mean replay duration on one instance, in seconds.
    pub fn instance_mean(&self, instance: &str) -> Option<f64> {
        self.instances.get(instance).and_then(|d| mean_secs(d))
    }

    /// Mean of the per-instance means, in seconds; `None` without samples.
    pub fn mean(&self) -> Option<f64> {
        let means: Vec<f64> = self
            .instances
            .values()
            .filter_map(|d| mean_secs(d))
            .collect();
        (!means.is_empty()).then(|| means.iter().sum::<f64>() / means.len() as f64)
    }
}

fn mean_secs(durations: &[Duration]) -> Option<f64> {
    if durations.is_empty() {
        return None;
    }
    let total: f64 = durations.iter().map(Duration::as_secs_f64).sum();
    Some(total / durations.len() as f64)
}

/// Fastest and slowest solver by mean duration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingComparison {
    pub fastest: String,
    pub fastest_mean: f64,
    pub slowest: String,
    pub slowest_mean: f64,
    /// `(slowest - fastest) / fastest * 100`.
    pub percent_difference: Option<f64>,
}

/// Per-solver timings and their comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingReport {
    pub solvers: Vec<SolverTiming>,
    /// `None` when no solver has a valid timing.
    pub comparison: Option<TimingComparison>,
}

impl TimingReport {
    /// Builds the report, comparing only solvers with at least one sample.
    ///
    /// Equal means are ordered by solver name.
    pub fn from_timings(solvers: Vec<SolverTiming>) -> Self {
        let mut means: Vec<(&str, f64)> = solvers
            .iter()
            .filter_map(|t| t.mean().map(|m| (t.solver.as_str(), m)))
            .collect();
        means.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let comparison = match (means.first(), means.last()) {
            (Some(&(fastest, fastest_mean)), Some(&(slowest, slowest_mean))) => {
                Some(TimingComparison {
                    fastest: fastest.to_string(),
                    fastest_mean,
                    slowest: slowest.to_string(),
                    slowest_mean,
                    percent_difference: percent_difference(fastest_mean, slowest_mean),
                })
            }
            _ => None,
        };

        Self {
            solvers,
            comparison,
        }
    }

    /// Looks up one solver's timings.
    pub fn solver(&self, name: &str) -> Option<&SolverTiming> {
        self.solvers.iter().find(|t| t.solver == name)
    }
}

/// Replays each solver's best configuration and measures it.
pub struct TimingCollector<I> {
    invoker: I,
    repetitions: usize,
}

impl<I: SolverInvoker> TimingCollector<I> {
    /// Creates a collector replaying each configuration once.
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            repetitions: 1,
        }
    }

    /// Sets the number of replays per instance; at least one.
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions.max(1);
        self
    }

    /// Returns the invoker.
    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Times every solver on every instance it has a best result for.
    ///
    /// Pairs absent from `table` are not replayed. Failed replays are
    /// counted and excluded from the means.
    pub fn collect(
        &self,
        table: &ResultTable,
        solvers: &[SolverSpec],
        instances: &[ProblemInstance],
    ) -> TimingReport {
        let mut timings = Vec::with_capacity(solvers.len());
        for spec in solvers {
            let mut timing = SolverTiming::new(&spec.name);
            for instance in instances {
                let Some(best) = table.get(instance.name(), &spec.name) else {
                    continue;
                };
                for repetition in 0..self.repetitions {
                    let started = Instant::now();
                    let outcome = self
                        .invoker
                        .invoke(spec, instance, &best.configuration);
                    let elapsed = started.elapsed();
                    match outcome {
                        Ok(score) => {
                            debug!(
                                event = "replay_end",
                                solver = %spec.name,
                                instance = instance.name(),
                                repetition,
                                score,
                                duration_ms = elapsed.as_millis() as u64,
                            );
                            timing.record(instance.name(), elapsed);
                        }
                        Err(failure) => {
                            warn!(
                                event = "trial_failed",
                                solver = %spec.name,
                                instance = instance.name(),
                                repetition,
                                kind = failure.kind(),
                                reason = %failure,
                            );
                            timing.failures += 1;
                        }
                    }
                }
            }
            timings.push(timing);
        }

        let report = TimingReport::from_timings(timings);
        match &report.comparison {
            Some(c) => info!(
                event = "timing_end",
                solvers = report.solvers.len(),
                fastest = %c.fastest,
                slowest = %c.slowest,
                percent = c.percent_difference,
            ),
            None => warn!(event = "timing_end", solvers = report.solvers.len(), reason = "no valid timings"),
        }
        report
    }
}

/// Times the solvers of `config` using the best configurations in `table`.
pub fn run_timing(config: &ExperimentConfig, table: &ResultTable) -> Result<TimingReport, BenchError> {
    let instances = discover_instances(config)?;
    let solvers: Vec<SolverSpec> = config.solvers.iter().map(|s| s.spec()).collect();
    let collector = TimingCollector::new(ProcessInvoker::from_config(&config.invocation))
        .with_repetitions(config.timing.repetitions);
    Ok(collector.collect(table, &solvers, &instances))
}
