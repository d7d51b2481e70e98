//! External solver descriptors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An external solver executable.
///
/// The command line for one trial is
/// `exec [args...] <input_flag> <instance path> [flag value]...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSpec {
    /// Name used as the key in result tables.
    pub name: String,
    /// Program to execute.
    pub exec: PathBuf,
    /// Leading arguments, e.g. a script for an interpreter.
    #[serde(default)]
    pub args: Vec<String>,
}

impl SolverSpec {
    /// Creates a solver spec with no leading arguments.
    pub fn new(name: impl Into<String>, exec: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            exec: exec.into(),
            args: Vec::new(),
        }
    }

    /// Adds a leading argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}
