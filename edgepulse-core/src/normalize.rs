//! Per-Channel Normalization and Feature Vector Assembly
//!
//! Before each inference the inference core standardizes both channels over
//! the *whole* current window:
//!
//! ```text
//! mean = Σx / n
//! std  = sqrt(Σ(x - mean)² / n)     (population standard deviation)
//! std  = 1        if std < 1e-6
//! ```
//!
//! and interleaves them into the model input:
//!
//! ```text
//! features[2i]     = (ir[i]  - mean_ir)  / std_ir
//! features[2i + 1] = (red[i] - mean_red) / std_red
//! ```
//!
//! The floor on `std` keeps a flat channel (sensor saturated or unplugged)
//! from producing NaN or infinity; such a channel normalizes to all zeros.

use crate::constants::STD_FLOOR;
use crate::errors::{DeviceError, DeviceResult};
use crate::window::RollingWindow;

/// Mean and standard deviation of both channels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizationStats {
    /// Mean of the infrared channel
    pub mean_ir: f64,
    /// Floored standard deviation of the infrared channel
    pub std_ir: f64,
    /// Mean of the red channel
    pub mean_red: f64,
    /// Floored standard deviation of the red channel
    pub std_red: f64,
}

impl Default for NormalizationStats {
    /// Identity transform, used until the first window has been normalized
    fn default() -> Self {
        Self {
            mean_ir: 0.0,
            std_ir: 1.0,
            mean_red: 0.0,
            std_red: 1.0,
        }
    }
}

impl NormalizationStats {
    /// Compute statistics over every sample in the window
    pub fn from_window<const N: usize>(window: &RollingWindow<N>) -> DeviceResult<Self> {
        if window.is_empty() {
            return Err(DeviceError::EmptyWindow);
        }

        let (mean_ir, std_ir) = mean_and_std(|| window.ir(), window.len());
        let (mean_red, std_red) = mean_and_std(|| window.red(), window.len());

        Ok(Self {
            mean_ir,
            std_ir: floor_std(std_ir),
            mean_red,
            std_red: floor_std(std_red),
        })
    }
}

/// Two-pass mean / population standard deviation
fn mean_and_std<F, I>(values: F, count: usize) -> (f64, f64)
where
    F: Fn() -> I,
    I: Iterator<Item = f64>,
{
    let n = count as f64;
    let mean = values().sum::<f64>() / n;
    let variance = values().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, libm::sqrt(variance))
}

/// Replace a near-zero deviation with 1
pub fn floor_std(std: f64) -> f64 {
    if std < STD_FLOOR || std.is_nan() {
        1.0
    } else {
        std
    }
}

/// Owner of the current [`NormalizationStats`]
///
/// Lives inside the inference context; `update` is the "normalize" task and
/// `write_features` builds the model input from the same window.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    stats: NormalizationStats,
    updates: u64,
}

impl Normalizer {
    /// Normalizer holding identity statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest statistics
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Number of completed updates
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Recompute statistics from the entire window
    pub fn update<const N: usize>(
        &mut self,
        window: &RollingWindow<N>,
    ) -> DeviceResult<&NormalizationStats> {
        self.stats = NormalizationStats::from_window(window)?;
        self.updates += 1;
        Ok(&self.stats)
    }

    /// Write the interleaved feature vector for `window` into `out`
    ///
    /// `out` must hold exactly `2 × window.len()` values.
    pub fn write_features<const N: usize>(
        &self,
        window: &RollingWindow<N>,
        out: &mut [f32],
    ) -> DeviceResult<()> {
        let expected = window.len() * 2;
        if out.len() != expected {
            return Err(DeviceError::ShapeMismatch {
                expected,
                actual: out.len(),
            });
        }

        let s = &self.stats;
        for (pair, sample) in out.chunks_exact_mut(2).zip(window.iter()) {
            pair[0] = ((sample.ir - s.mean_ir) / s.std_ir) as f32;
            pair[1] = ((sample.red - s.mean_red) / s.std_red) as f32;
        }
        Ok(())
    }
}
