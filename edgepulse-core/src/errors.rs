//! Error Types for the Simulated Device
//!
//! ## Design Philosophy
//!
//! Errors here come from the parts of the device that would run on the
//! microcontroller itself, so they follow the same rules as the rest of the
//! core:
//!
//! 1. **No Heap Allocation**: messages are `&'static str`, sizes are `usize`.
//! 2. **Copy Semantics**: errors are cheap to return from hot paths and to
//!    store in loop reports.
//! 3. **Actionable Information**: each variant carries enough numbers to tell
//!    how far off the request was.
//!
//! ## Fatal vs. Per-Cycle
//!
//! | Variant          | Where                     | Effect                        |
//! |------------------|---------------------------|-------------------------------|
//! | `OutOfMemory`    | boot reservations         | boot aborts                   |
//! | `InvalidFree`    | allocator                 | `used` left untouched         |
//! | `ShapeMismatch`  | boot check / engine input | boot aborts / cycle discarded |
//! | `InferenceFailed`| engine                    | cycle discarded               |
//! | `EmptyWindow`    | normalizer                | cycle discarded               |
//!
//! Queue-full and queue-timeout are not errors: the producer drops, the
//! consumer retries.

use thiserror_no_std::Error;

use crate::memory::RegionKind;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Device errors - kept small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Allocation would push a region past its capacity
    #[error("{region} region out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Region the allocation targeted
        region: RegionKind,
        /// Bytes requested
        requested: usize,
        /// Bytes still free before the request
        available: usize,
    },

    /// Free of more bytes than the region has in use
    #[error("{region} region free of {size} bytes exceeds {used} bytes in use")]
    InvalidFree {
        /// Region the free targeted
        region: RegionKind,
        /// Bytes the caller tried to release
        size: usize,
        /// Bytes actually in use
        used: usize,
    },

    /// A vector handed to or returned by the model has the wrong length
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch {
        /// Length the contract requires
        expected: usize,
        /// Length observed
        actual: usize,
    },

    /// The engine refused or failed to run
    #[error("Inference failed: {reason}")]
    InferenceFailed {
        /// Engine-provided reason
        reason: &'static str,
    },

    /// Normalization requested on a window with no samples
    #[error("Cannot normalize an empty window")]
    EmptyWindow,
}

impl DeviceError {
    /// Whether the error must stop the device from booting
    pub fn is_fatal_at_boot(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory { .. } | Self::ShapeMismatch { .. }
        )
    }
}
