//! Timing of the two execution contexts

/// Acquisition tick period (100 Hz nominal sampling rate).
pub const ACQUISITION_TICK_MS: u64 = 10;

/// Longest time the inference context waits on an empty sample queue
/// before re-checking the stop signal.
pub const DEQUEUE_TIMEOUT_MS: u64 = 100;

/// Simulated cost of the floating-point normalization pass.
pub const NORMALIZE_LATENCY_MS: u64 = 1;

/// Simulated cost of a single model invocation.
pub const INFERENCE_LATENCY_MS: u64 = 5;
