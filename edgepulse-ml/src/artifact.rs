//! Model artifact loading
//!
//! The trained model ships as a single file. The device needs two things from
//! it at boot: its size in bytes, to reserve space in the extended region, and
//! an engine that honors the fixed input/output shape.
//!
//! ## Format
//!
//! JSON description of a dense softmax layer:
//!
//! ```json
//! {
//!   "name": "stress-dense",
//!   "input_len": 3000,
//!   "output_len": 3,
//!   "weights": [ ... input_len * output_len values, row-major per class ... ],
//!   "bias": [ ... output_len values ... ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use edgepulse_core::constants::N_CLASSES;
use serde::{Deserialize, Serialize};

use crate::dense::DenseSoftmaxModel;
use crate::error::{ModelError, ModelResult};

/// Parsed contents of a model file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Human-readable model name
    #[serde(default)]
    pub name: Option<String>,
    /// Values per input vector
    pub input_len: usize,
    /// Values per output vector
    pub output_len: usize,
    /// Row-major `[output_len][input_len]` weights
    pub weights: Vec<f32>,
    /// One bias per output
    pub bias: Vec<f32>,
}

/// A model file read from disk
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    path: PathBuf,
    size_bytes: usize,
    spec: ModelSpec,
}

impl ModelArtifact {
    /// Read and parse a model file
    ///
    /// A missing or unreadable file is [`ModelError::Io`]; the caller treats
    /// it as fatal before any loop starts.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut artifact = Self::from_bytes(&bytes)?;
        artifact.path = path.to_path_buf();
        log::info!(
            "loaded model artifact {} ({:.1} KiB, {} inputs)",
            path.display(),
            artifact.size_bytes as f64 / 1024.0,
            artifact.spec.input_len
        );
        Ok(artifact)
    }

    /// Parse a model held in memory
    pub fn from_bytes(bytes: &[u8]) -> ModelResult<Self> {
        let spec: ModelSpec = serde_json::from_slice(bytes)?;
        validate(&spec)?;
        Ok(Self {
            path: PathBuf::new(),
            size_bytes: bytes.len(),
            spec,
        })
    }

    /// Where the artifact was read from (empty for in-memory artifacts)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size, reserved in the extended region at boot
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Parsed model description
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Build the engine described by the artifact
    pub fn into_engine(self) -> ModelResult<DenseSoftmaxModel> {
        DenseSoftmaxModel::new(self.spec.input_len, self.spec.weights, self.spec.bias)
    }
}

fn validate(spec: &ModelSpec) -> ModelResult<()> {
    if spec.output_len != N_CLASSES {
        return Err(ModelError::Shape(format!(
            "model has {} outputs, device expects {}",
            spec.output_len, N_CLASSES
        )));
    }
    let expected = spec
        .input_len
        .checked_mul(spec.output_len)
        .ok_or_else(|| {
            ModelError::Shape(format!("input length {} is too large", spec.input_len))
        })?;
    if spec.weights.len() != expected {
        return Err(ModelError::Shape(format!(
            "{} weights do not fill {}x{}",
            spec.weights.len(),
            spec.output_len,
            spec.input_len
        )));
    }
    if spec.bias.len() != spec.output_len {
        return Err(ModelError::Shape(format!(
            "{} bias values for {} outputs",
            spec.bias.len(),
            spec.output_len
        )));
    }
    Ok(())
}

/// Serialize a model description the way [`ModelArtifact::load`] reads it
pub fn to_json(spec: &ModelSpec) -> ModelResult<Vec<u8>> {
    Ok(serde_json::to_vec(spec)?)
}
