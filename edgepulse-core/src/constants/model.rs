//! Classifier Shape Contract
//!
//! The model is opaque to the device. The only thing the pipeline relies on is
//! this shape: one flattened `SEQUENCE_LENGTH × N_FEATURES` vector in, one
//! `N_CLASSES` probability vector out.

/// Samples per channel in the rolling window (15 s at 100 Hz).
pub const SEQUENCE_LENGTH: usize = 1500;

/// Channels per sample (IR and red).
pub const N_FEATURES: usize = 2;

/// Length of the interleaved feature vector fed to the model.
pub const FEATURE_VECTOR_LEN: usize = SEQUENCE_LENGTH * N_FEATURES;

/// Number of output classes.
pub const N_CLASSES: usize = 3;

/// Standard deviations below this are replaced by 1 before dividing.
pub const STD_FLOOR: f64 = 1e-6;
