//! Error types for scenario loading and simulation runs.

use std::path::PathBuf;

use des::SimError;
use thiserror::Error;

/// A scenario that cannot be run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("num_servers must be at least 1")]
    NoServers,

    #[error("{field} must be finite and greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("cannot build {field} distribution: {reason}")]
    Distribution { field: &'static str, reason: String },

    #[error("cannot read scenario file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation failed: {0}")]
    Sim(#[from] SimError),
}

pub type QueueResult<T> = Result<T, QueueError>;
