//! Best-result folding for one (solver, instance) pair.

use solverbench_core::{BestResult, Configuration};

/// Keeps the lowest score seen over a sequence of trials.
///
/// Starts at `+inf` with an empty configuration. A trial replaces the best
/// only when its score is strictly lower, so among equal scores the first
/// configuration seen is kept. Trials without a score are counted and
/// otherwise ignored.
///
/// # Example
///
/// ```
/// use solverbench_benchmark::BestResultTracker;
/// use solverbench_core::Configuration;
///
/// let mut tracker = BestResultTracker::new();
/// let a = Configuration::new().with("-pop", 100);
/// let b = Configuration::new().with("-pop", 200);
///
/// assert!(tracker.observe(&a, Some(7600.0)));
/// assert!(!tracker.observe(&b, None));
/// assert!(!tracker.observe(&b, Some(7600.0)));
///
/// let best = tracker.finish().unwrap();
/// assert_eq!(best.score, 7600.0);
/// assert_eq!(best.configuration, a);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BestResultTracker {
    best: Option<BestResult>,
    trials: usize,
    failures: usize,
}

impl BestResultTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one trial. Returns true if it became the new best.
    pub fn observe(&mut self, configuration: &Configuration, score: Option<f64>) -> bool {
        self.trials += 1;
        let Some(score) = score.filter(|s| !s.is_nan()) else {
            self.failures += 1;
            return false;
        };

        if score < self.best_score() {
            self.best = Some(BestResult::new(score, configuration.clone()));
            true
        } else {
            false
        }
    }

    /// Current best score, `+inf` before the first scored trial.
    pub fn best_score(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |b| b.score)
    }

    /// Current best result.
    pub fn best(&self) -> Option<&BestResult> {
        self.best.as_ref()
    }

    /// Trials observed so far.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Trials that produced no score.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Ends the fold; `None` if no trial produced a score.
    pub fn finish(self) -> Option<BestResult> {
        self.best
    }
}

/// Folds `(configuration, score)` trials into the best result.
pub fn fold_best<'a>(
    trials: impl IntoIterator<Item = (&'a Configuration, Option<f64>)>,
) -> Option<BestResult> {
    let mut tracker = BestResultTracker::new();
    for (configuration, score) in trials {
        tracker.observe(configuration, score);
    }
    tracker.finish()
}
