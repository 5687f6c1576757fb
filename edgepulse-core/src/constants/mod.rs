//! Constants for EdgePulse Core
//!
//! Every numeric value the simulator depends on lives here, grouped by the
//! part of the device it describes. Loops and buffers take these as defaults;
//! the simulator configuration may override the timing and sensor values but
//! never the model shape.
//!
//! ## Organization
//!
//! - **Memory**: region capacities and startup reservations
//! - **Timing**: tick periods, queue timeouts and simulated task latencies
//! - **Model**: the fixed input/output shape of the classifier
//! - **Sensor**: synthetic photoplethysmography signal parameters

/// Memory region capacities and startup reservations.
pub mod memory;

/// Loop periods, queue timeouts and simulated task latencies.
pub mod timing;

/// Fixed classifier shape and window geometry.
pub mod model;

/// Synthetic sensor distribution parameters.
pub mod sensor;

pub use memory::{EXTENDED_REGION_BYTES, FAST_REGION_BYTES, TENSOR_ARENA_BYTES};
pub use model::{FEATURE_VECTOR_LEN, N_CLASSES, N_FEATURES, SEQUENCE_LENGTH, STD_FLOOR};
pub use timing::{
    ACQUISITION_TICK_MS, DEQUEUE_TIMEOUT_MS, INFERENCE_LATENCY_MS, NORMALIZE_LATENCY_MS,
};

/// Capacity of the bounded queue between the two cores.
pub const SAMPLE_QUEUE_CAPACITY: usize = 100;
