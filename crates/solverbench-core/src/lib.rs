//! Core types for SolverBench.
//!
//! This crate holds the data model shared by every other SolverBench crate:
//!
//! - [`ParamValue`] and [`Configuration`] - one concrete hyperparameter assignment
//! - [`ProblemInstance`] - a problem file whose name embeds its size
//! - [`SolverSpec`] - an external solver executable
//! - [`BestResult`] and [`ResultTable`] - best score per (instance, solver)
//! - [`ResultStore`] - JSON persistence of a [`ResultTable`]
//!
//! # Example
//!
//! ```
//! use solverbench_core::{BestResult, Configuration, ResultStore, ResultTable};
//!
//! let mut table = ResultTable::new();
//! let config = Configuration::new().with("-pop", 120).with("-mut", 0.05);
//! table.record("berlin52", "genetic", BestResult::new(7542.0, config));
//!
//! let document = ResultStore::serialize(&table).unwrap();
//! let reloaded = ResultStore::deserialize(&document).unwrap();
//! assert_eq!(reloaded, table);
//! ```

pub mod error;
pub mod instance;
pub mod param;
pub mod result;
pub mod solver;
pub mod store;

pub use error::{InstanceError, StoreError};
pub use instance::ProblemInstance;
pub use param::{Configuration, ParamValue};
pub use result::{BestResult, ResultTable};
pub use solver::SolverSpec;
pub use store::ResultStore;
