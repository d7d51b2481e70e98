//! Shared test fixtures for SolverBench crates.
//!
//! - [`invoker`] - deterministic in-memory solvers that record their calls
//! - [`table`] - result table builders
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! solverbench-test = { workspace = true }
//! ```

pub mod invoker;
pub mod table;

pub use invoker::{RecordedCall, ScriptedInvoker};
pub use table::TableBuilder;
