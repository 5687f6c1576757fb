//! Fixed-output engine
//!
//! Returns the same probabilities for every valid input and records what it
//! was called with. Used for dry runs without a trained model and to observe
//! the inference loop from outside the task that owns the engine.

use std::sync::{Arc, Mutex, MutexGuard};

use edgepulse_core::constants::N_CLASSES;
use edgepulse_core::engine::check_input;
use edgepulse_core::{DeviceResult, InferenceEngine, Probabilities};

/// What a [`FixedOutputEngine`] has seen
#[derive(Debug, Clone, Default)]
pub struct ProbeState {
    /// Successful invocations
    pub invocations: u64,
    /// Rejected invocations
    pub rejected: u64,
    /// Input of the most recent successful invocation
    pub last_input: Vec<f32>,
}

/// Shared view of a [`FixedOutputEngine`]'s history
#[derive(Debug, Clone, Default)]
pub struct EngineProbe(Arc<Mutex<ProbeState>>);

impl EngineProbe {
    fn lock(&self) -> MutexGuard<'_, ProbeState> {
        // a poisoned probe only means a test panicked mid-record
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Successful invocations so far
    pub fn invocations(&self) -> u64 {
        self.lock().invocations
    }

    /// Rejected invocations so far
    pub fn rejected(&self) -> u64 {
        self.lock().rejected
    }

    /// Copy of the recorded state
    pub fn snapshot(&self) -> ProbeState {
        self.lock().clone()
    }
}

/// Engine that always answers with the same distribution
#[derive(Debug, Clone)]
pub struct FixedOutputEngine {
    input_len: usize,
    output: Probabilities,
    probe: EngineProbe,
}

impl FixedOutputEngine {
    /// Engine accepting `input_len` values and returning `output`
    pub fn new(input_len: usize, output: Probabilities) -> Self {
        Self {
            input_len,
            output,
            probe: EngineProbe::default(),
        }
    }

    /// Engine returning the uniform distribution
    pub fn uniform(input_len: usize) -> Self {
        Self::new(input_len, [1.0 / N_CLASSES as f32; N_CLASSES])
    }

    /// Handle for observing invocations after the engine is moved away
    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl InferenceEngine for FixedOutputEngine {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn invoke(&mut self, input: &[f32]) -> DeviceResult<Probabilities> {
        if let Err(err) = check_input(&*self, input) {
            self.probe.lock().rejected += 1;
            return Err(err);
        }
        let mut state = self.probe.lock();
        state.invocations += 1;
        state.last_input.clear();
        state.last_input.extend_from_slice(input);
        Ok(self.output)
    }
}
