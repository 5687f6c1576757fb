//! Simulator errors

use std::path::PathBuf;

use edgepulse_core::DeviceError;
use edgepulse_ml::ModelError;
use thiserror::Error;

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// Failures that stop the simulator from booting or shutting down cleanly
///
/// Queue timeouts, dropped samples and failed prediction cycles are not
/// errors; the loops count them and carry on.
#[derive(Error, Debug)]
pub enum SimError {
    /// Memory reservation or shape check failed
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Model artifact could not be loaded
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file unreadable
    #[error("Cannot read configuration {}: {source}", .path.display())]
    ConfigIo {
        /// File location
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for [`SimConfig`](crate::SimConfig)
    #[error("Malformed configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Dataset file unreadable
    #[error("Cannot read dataset {}: {source}", .path.display())]
    DatasetIo {
        /// File location
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Dataset line could not be parsed
    #[error("Dataset line {line}: {reason}")]
    Dataset {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Dataset holds no samples
    #[error("Dataset contains no samples")]
    EmptyDataset,

    /// A loop task panicked or was cancelled
    #[error("Loop task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
