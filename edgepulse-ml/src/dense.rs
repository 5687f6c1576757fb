//! Dense softmax classifier
//!
//! A single fully connected layer followed by softmax:
//!
//! ```text
//! logits[k] = bias[k] + Σ_j weights[k * input_len + j] * x[j]
//! p[k]      = exp(logits[k] - max) / Σ exp(logits - max)
//! ```
//!
//! It stands in for the trained network on the host. The simulator treats it
//! like any other engine: fixed input length, `N_CLASSES` outputs.

use edgepulse_core::constants::N_CLASSES;
use edgepulse_core::engine::check_input;
use edgepulse_core::{DeviceError, DeviceResult, InferenceEngine, Probabilities};

use crate::error::{ModelError, ModelResult};

/// Single-layer classifier with softmax output
#[derive(Debug, Clone)]
pub struct DenseSoftmaxModel {
    input_len: usize,
    /// Row-major `[N_CLASSES][input_len]`
    weights: Vec<f32>,
    bias: [f32; N_CLASSES],
}

impl DenseSoftmaxModel {
    /// Build a model, checking that the tensors agree with `input_len`
    pub fn new(input_len: usize, weights: Vec<f32>, bias: Vec<f32>) -> ModelResult<Self> {
        if input_len == 0 {
            return Err(ModelError::Shape("input length must be positive".into()));
        }
        let expected = input_len
            .checked_mul(N_CLASSES)
            .ok_or_else(|| ModelError::Shape(format!("input length {input_len} is too large")))?;
        if weights.len() != expected {
            return Err(ModelError::Shape(format!(
                "expected {} weights for {} inputs x {} classes, found {}",
                expected,
                input_len,
                N_CLASSES,
                weights.len()
            )));
        }
        let bias: [f32; N_CLASSES] = bias.as_slice().try_into().map_err(|_| {
            ModelError::Shape(format!(
                "expected {} bias values, found {}",
                N_CLASSES,
                bias.len()
            ))
        })?;

        Ok(Self {
            input_len,
            weights,
            bias,
        })
    }

    /// Model with all-zero weights; every input maps to the uniform distribution
    pub fn zeros(input_len: usize) -> ModelResult<Self> {
        let len = input_len.checked_mul(N_CLASSES).unwrap_or(0);
        Self::new(input_len, vec![0.0; len], vec![0.0; N_CLASSES])
    }

    /// Bytes of parameters the model carries
    pub fn parameter_bytes(&self) -> usize {
        (self.weights.len() + N_CLASSES) * std::mem::size_of::<f32>()
    }

    fn logits(&self, input: &[f32]) -> [f32; N_CLASSES] {
        let mut logits = self.bias;
        for (logit, row) in logits.iter_mut().zip(self.weights.chunks_exact(self.input_len)) {
            *logit += row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>();
        }
        logits
    }
}

/// Numerically stable softmax
pub fn softmax(logits: [f32; N_CLASSES]) -> Probabilities {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0; N_CLASSES];
    let mut total = 0.0;
    for (o, &l) in out.iter_mut().zip(logits.iter()) {
        *o = libm::expf(l - max);
        total += *o;
    }
    for o in out.iter_mut() {
        *o /= total;
    }
    out
}

impl InferenceEngine for DenseSoftmaxModel {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn invoke(&mut self, input: &[f32]) -> DeviceResult<Probabilities> {
        check_input(&*self, input)?;
        let probabilities = softmax(self.logits(input));
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(DeviceError::InferenceFailed {
                reason: "non-finite model output",
            });
        }
        Ok(probabilities)
    }
}
