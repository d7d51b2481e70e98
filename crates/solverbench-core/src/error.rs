//! Error types for SolverBench core types

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while resolving problem instances on disk
#[derive(Debug, Error)]
pub enum InstanceError {
    /// The instance file name carries no digit run to derive its size from
    #[error("instance file name has no point count: {0}")]
    MissingSize(String),

    /// The path has no usable file name
    #[error("not an instance file: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Directory scan failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised while persisting or reloading a result table
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the document failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document does not describe a valid result table
    #[error("malformed persisted result: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}
