//! Session-level errors.

use solverbench_config::ConfigError;
use solverbench_core::{InstanceError, StoreError};
use solverbench_stats::RankingError;
use thiserror::Error;

use crate::sampler::SamplerError;

/// Failures that abort a search, ranking or timing run as a whole.
///
/// Per-trial failures are not errors at this level; they are recorded as
/// [`TrialFailure`](crate::TrialFailure) outcomes and skipped.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error("no instances with extension .{extension} in {dir}")]
    NoInstances { dir: String, extension: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
