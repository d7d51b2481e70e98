//! Scripted solver invokers.
//!
//! # Example
//!
//! ```
//! use solverbench_benchmark::SolverInvoker;
//! use solverbench_core::{Configuration, ProblemInstance, SolverSpec};
//! use solverbench_test::ScriptedInvoker;
//!
//! let invoker = ScriptedInvoker::target("-pop", 3.0);
//! let instance = ProblemInstance::new("eil51", "maps/eil51.tsp", 51);
//! let solver = SolverSpec::new("genetic", "./genetic");
//!
//! let score = invoker
//!     .invoke(&solver, &instance, &Configuration::new().with("-pop", 160))
//!     .unwrap();
//! assert_eq!(score, 1007.0);
//! assert_eq!(invoker.call_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use solverbench_benchmark::{SolverInvoker, TrialFailure};
use solverbench_core::{Configuration, ProblemInstance, SolverSpec};

type Scorer = dyn Fn(&SolverSpec, &ProblemInstance, &Configuration) -> Result<f64, TrialFailure>
    + Send
    + Sync;

/// One invocation seen by a [`ScriptedInvoker`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub solver: String,
    pub instance: String,
    pub configuration: Configuration,
}

/// An in-memory solver with a scripted score function.
///
/// Every call is recorded. Failures can be scripted per solver, which take
/// precedence over the score function.
pub struct ScriptedInvoker {
    scorer: Box<Scorer>,
    failures: HashMap<String, TrialFailure>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedInvoker {
    /// Creates an invoker scoring with `scorer`.
    pub fn new<F>(scorer: F) -> Self
    where
        F: Fn(&SolverSpec, &ProblemInstance, &Configuration) -> Result<f64, TrialFailure>
            + Send
            + Sync
            + 'static,
    {
        Self {
            scorer: Box::new(scorer),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `score`.
    pub fn constant(score: f64) -> Self {
        Self::new(move |_, _, _| Ok(score))
    }

    /// Scores `1000 + |value(flag) - factor * size|`, so the best value of
    /// `flag` is `factor` times the instance size. A missing flag scores as 0.
    pub fn target(flag: &str, factor: f64) -> Self {
        let flag = flag.to_string();
        Self::new(move |_, instance, config| {
            let value = config.get(&flag).map_or(0.0, |v| v.as_f64());
            Ok(1000.0 + (value - factor * instance.size() as f64).abs())
        })
    }

    /// Makes every call of `solver` fail with `failure`.
    pub fn failing(mut self, solver: impl Into<String>, failure: TrialFailure) -> Self {
        self.failures.insert(solver.into(), failure);
        self
    }

    /// Returns the calls made so far, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the calls made for one solver.
    pub fn calls_for(&self, solver: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.solver == solver)
            .collect()
    }
}

impl SolverInvoker for ScriptedInvoker {
    fn invoke(
        &self,
        solver: &SolverSpec,
        instance: &ProblemInstance,
        configuration: &Configuration,
    ) -> Result<f64, TrialFailure> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                solver: solver.name.clone(),
                instance: instance.name().to_string(),
                configuration: configuration.clone(),
            });

        if let Some(failure) = self.failures.get(&solver.name) {
            return Err(failure.clone());
        }
        (self.scorer)(solver, instance, configuration)
    }
}
