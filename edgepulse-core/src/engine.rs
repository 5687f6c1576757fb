//! Inference engine contract
//!
//! The model is an external collaborator. The device only needs to hand it one
//! flat `f32` vector and get back `N_CLASSES` probabilities; everything else
//! about the model (layers, quantization, file format) stays behind this
//! trait.

use alloc::boxed::Box;

use crate::constants::{FEATURE_VECTOR_LEN, N_CLASSES};
use crate::errors::{DeviceError, DeviceResult};
use crate::sample::Probabilities;

/// Fixed-shape classifier
pub trait InferenceEngine {
    /// Number of values `invoke` expects
    fn input_len(&self) -> usize;

    /// Number of probabilities `invoke` produces
    fn output_len(&self) -> usize {
        N_CLASSES
    }

    /// Run the model on one input vector
    ///
    /// Implementations must reject an input whose length differs from
    /// [`input_len`](Self::input_len) with [`DeviceError::ShapeMismatch`].
    fn invoke(&mut self, input: &[f32]) -> DeviceResult<Probabilities>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn invoke(&mut self, input: &[f32]) -> DeviceResult<Probabilities> {
        (**self).invoke(input)
    }
}

/// Check an engine against the expected input length and `N_CLASSES` outputs
///
/// Run once at boot; a mismatch means the wrong model was flashed.
pub fn ensure_shape<E>(engine: &E, input_len: usize) -> DeviceResult<()>
where
    E: InferenceEngine + ?Sized,
{
    if engine.input_len() != input_len {
        return Err(DeviceError::ShapeMismatch {
            expected: input_len,
            actual: engine.input_len(),
        });
    }
    if engine.output_len() != N_CLASSES {
        return Err(DeviceError::ShapeMismatch {
            expected: N_CLASSES,
            actual: engine.output_len(),
        });
    }
    Ok(())
}

/// [`ensure_shape`] against the full-size window
pub fn ensure_default_shape<E: InferenceEngine + ?Sized>(engine: &E) -> DeviceResult<()> {
    ensure_shape(engine, FEATURE_VECTOR_LEN)
}

/// Check an input slice against the engine before invoking it
pub fn check_input<E: InferenceEngine + ?Sized>(engine: &E, input: &[f32]) -> DeviceResult<()> {
    if input.len() != engine.input_len() {
        return Err(DeviceError::ShapeMismatch {
            expected: engine.input_len(),
            actual: input.len(),
        });
    }
    Ok(())
}
