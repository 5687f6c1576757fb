//! Synthetic PPG Sensor Parameters
//!
//! Values approximate raw counts from a MAX30102 pulse oximeter front end.

/// Mean of the infrared channel.
pub const IR_MEAN: f64 = 1000.0;
/// Spread of the infrared channel.
pub const IR_STD_DEV: f64 = 100.0;
/// Upper clamp for the infrared channel (lower clamp is 0).
pub const IR_MAX: f64 = 2000.0;

/// Mean of the red channel.
pub const RED_MEAN: f64 = 800.0;
/// Spread of the red channel.
pub const RED_STD_DEV: f64 = 80.0;
/// Upper clamp for the red channel (lower clamp is 0).
pub const RED_MAX: f64 = 1600.0;
