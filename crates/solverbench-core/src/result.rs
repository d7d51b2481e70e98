//! Best results and the per-instance result table.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::param::Configuration;

/// The best configuration found for one (solver, instance) pair.
///
/// Serialized as `{"shortest_distance": <score>, "params": {...}}`. The
/// older `shortestDistance` spelling is accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestResult {
    /// Shortest route distance found.
    #[serde(rename = "shortest_distance", alias = "shortestDistance")]
    pub score: f64,
    /// Configuration that produced `score`.
    #[serde(rename = "params")]
    pub configuration: Configuration,
}

impl BestResult {
    /// Creates a best result.
    pub fn new(score: f64, configuration: Configuration) -> Self {
        Self {
            score,
            configuration,
        }
    }
}

/// Best results keyed by instance name, then solver name.
///
/// Keys are kept sorted so iteration and serialization are deterministic.
///
/// # Example
///
/// ```
/// use solverbench_core::{BestResult, Configuration, ResultTable};
///
/// let mut table = ResultTable::new();
/// table.record("eil51", "aco", BestResult::new(430.2, Configuration::new()));
/// table.record("eil51", "genetic", BestResult::new(441.0, Configuration::new()));
///
/// assert_eq!(table.score("eil51", "aco"), Some(430.2));
/// assert_eq!(table.solvers().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    entries: BTreeMap<String, BTreeMap<String, BestResult>>,
}

impl ResultTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the best result for a (instance, solver) pair, replacing any
    /// previous entry.
    pub fn record(
        &mut self,
        instance: impl Into<String>,
        solver: impl Into<String>,
        best: BestResult,
    ) -> Option<BestResult> {
        self.entries
            .entry(instance.into())
            .or_default()
            .insert(solver.into(), best)
    }

    /// Returns the best result for a pair.
    pub fn get(&self, instance: &str, solver: &str) -> Option<&BestResult> {
        self.entries.get(instance).and_then(|row| row.get(solver))
    }

    /// Returns the best score for a pair.
    pub fn score(&self, instance: &str, solver: &str) -> Option<f64> {
        self.get(instance, solver).map(|best| best.score)
    }

    /// Returns the results recorded for one instance.
    pub fn instance(&self, instance: &str) -> Option<&BTreeMap<String, BestResult>> {
        self.entries.get(instance)
    }

    /// Iterates over instance names in sorted order.
    pub fn instances(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns every solver name that appears in the table.
    pub fn solvers(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Iterates over `(instance, solver, best)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &BestResult)> {
        self.entries.iter().flat_map(|(instance, row)| {
            row.iter()
                .map(move |(solver, best)| (instance.as_str(), solver.as_str(), best))
        })
    }

    /// Returns the number of recorded pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Returns true if no pair is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
