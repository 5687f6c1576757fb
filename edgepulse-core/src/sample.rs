//! Values that cross the two queues
//!
//! `Sample` travels from the acquisition core to the inference core;
//! `PredictionResult` leaves the pipeline through the result queue. Both are
//! small `Copy` types so the queues never allocate per item.

use crate::constants::N_CLASSES;

/// Class probabilities produced by one inference cycle
pub type Probabilities = [f32; N_CLASSES];

/// One two-channel reading from the pulse oximeter front end
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Infrared channel
    pub ir: f64,
    /// Red channel
    pub red: f64,
}

impl Sample {
    /// Build a sample from raw channel values
    pub const fn new(ir: f64, red: f64) -> Self {
        Self { ir, red }
    }

    /// Both channels are finite numbers
    pub fn is_finite(&self) -> bool {
        self.ir.is_finite() && self.red.is_finite()
    }
}

/// Output of one completed prediction cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionResult {
    /// Cycle number, starting at 0
    pub sequence: u64,
    /// Samples the window had seen when the cycle ran
    pub window_total: u64,
    /// Per-class probabilities
    pub probabilities: Probabilities,
}

impl PredictionResult {
    /// Index of the most probable class
    ///
    /// Ties resolve to the lowest index; NaN entries never win.
    pub fn predicted_class(&self) -> usize {
        let mut best: Option<usize> = None;
        for (idx, &p) in self.probabilities.iter().enumerate() {
            if p.is_nan() {
                continue;
            }
            match best {
                Some(b) if p <= self.probabilities[b] => {}
                _ => best = Some(idx),
            }
        }
        best.unwrap_or(0)
    }

    /// Probability of the predicted class
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.predicted_class()]
    }
}
