//! Result table builders.
//!
//! # Example
//!
//! ```
//! use solverbench_test::TableBuilder;
//!
//! let table = TableBuilder::new(["A", "B", "C"])
//!     .row("p", [10.0, 10.0, 20.0])
//!     .row("q", [5.0, 6.0, 7.0])
//!     .build();
//!
//! assert_eq!(table.score("p", "C"), Some(20.0));
//! assert_eq!(table.len(), 6);
//! ```

use solverbench_core::{BestResult, Configuration, ResultTable};

/// Builds a [`ResultTable`] row by row.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    solvers: Vec<String>,
    table: ResultTable,
}

impl TableBuilder {
    /// Creates a builder whose rows list scores in `solvers` order.
    pub fn new<S: Into<String>>(solvers: impl IntoIterator<Item = S>) -> Self {
        Self {
            solvers: solvers.into_iter().map(Into::into).collect(),
            table: ResultTable::new(),
        }
    }

    /// Records one score per solver for `instance`.
    ///
    /// Panics if the row length does not match the solver list.
    pub fn row(mut self, instance: &str, scores: impl IntoIterator<Item = f64>) -> Self {
        let scores: Vec<f64> = scores.into_iter().collect();
        assert_eq!(
            scores.len(),
            self.solvers.len(),
            "row {} has {} scores for {} solvers",
            instance,
            scores.len(),
            self.solvers.len()
        );
        for (solver, score) in self.solvers.iter().zip(scores) {
            self.table
                .record(instance, solver.as_str(), BestResult::new(score, Configuration::new()));
        }
        self
    }

    /// Records a single score, leaving the rest of the row absent.
    pub fn score(mut self, instance: &str, solver: &str, score: f64) -> Self {
        self.table
            .record(instance, solver, BestResult::new(score, Configuration::new()));
        self
    }

    /// Records a score with its configuration.
    pub fn best(mut self, instance: &str, solver: &str, best: BestResult) -> Self {
        self.table.record(instance, solver, best);
        self
    }

    pub fn build(self) -> ResultTable {
        self.table
    }
}
