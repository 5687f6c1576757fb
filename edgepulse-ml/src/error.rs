//! Model loading errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Failures while loading or building a model
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact missing or unreadable
    #[error("Cannot read model artifact {}: {source}", .path.display())]
    Io {
        /// Artifact location
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not a valid model description
    #[error("Malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Tensor sizes in the artifact do not agree
    #[error("Invalid model shape: {0}")]
    Shape(String),
}
