//! Core data model for EdgePulse
//!
//! EdgePulse simulates a dual-core microcontroller running a continuous
//! sense → buffer → infer loop for a pulse oximeter stress classifier. This
//! crate holds the parts that would run unchanged on the device:
//!
//! - memory regions with hard capacities (`memory`)
//! - the two-channel rolling window (`window`)
//! - per-channel normalization and feature vector assembly (`normalize`)
//! - the fixed-shape classifier contract (`engine`)
//! - sensor sources and recorded-data replay (`sensor`)
//! - RR-interval heart rate variability (`hrv`)
//!
//! Key constraints:
//! - No heap allocation in the per-sample path
//! - Window storage sized at compile time
//! - Errors are `Copy` and carry no strings
//!
//! ```no_run
//! use edgepulse_core::{Normalizer, RollingWindow, Sample};
//!
//! let mut window: RollingWindow = RollingWindow::new();
//! for _ in 0..1500 {
//!     window.push(Sample::new(1000.0, 800.0));
//! }
//!
//! let mut normalizer = Normalizer::new();
//! normalizer.update(&window).unwrap();
//!
//! let mut features = vec![0.0f32; 3000];
//! normalizer.write_features(&window, &mut features).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod constants;
pub mod engine;
pub mod errors;
pub mod hrv;
pub mod memory;
pub mod normalize;
pub mod sample;
pub mod sensor;
pub mod window;

// Public API
pub use engine::{ensure_default_shape, ensure_shape, InferenceEngine};
pub use errors::{DeviceError, DeviceResult};
pub use hrv::HrvCalculator;
pub use memory::{MemoryAllocator, MemoryRegion, RegionBuffer, RegionKind};
pub use normalize::{NormalizationStats, Normalizer};
pub use sample::{PredictionResult, Probabilities, Sample};
pub use sensor::{ReplaySource, SensorSource};
pub use window::RollingWindow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
