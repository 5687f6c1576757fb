//! Fixed-Capacity Rolling Window of Recent Samples
//!
//! ## Overview
//!
//! The classifier looks at the last `SEQUENCE_LENGTH` samples of both
//! channels. This module keeps exactly that: two parallel fixed-size deques,
//! one per channel, where every append past capacity evicts the oldest entry.
//!
//! ```text
//! ir  : [ i0 i1 i2 ... i1499 ]  ← push newest, pop oldest
//! red : [ r0 r1 r2 ... r1499 ]
//!         oldest        newest
//! ```
//!
//! ### Why heapless::Deque?
//!
//! The window lives in on-chip SRAM on the target, so its size is fixed at
//! compile time and it must never reallocate. `heapless::Deque` gives O(1)
//! push/pop at both ends without touching the heap, and chronological
//! iteration for the normalizer.
//!
//! ### The `total_seen` counter
//!
//! Besides the current length, the window counts every sample ever appended.
//! The length saturates at capacity; `total_seen` keeps growing. Which of the
//! two drives the prediction trigger is decided by the inference loop's
//! trigger policy, not here.
//!
//! ## Ownership
//!
//! Only the inference context holds a `RollingWindow`. It is not `Sync`-shared
//! and needs no locking.

use heapless::Deque;

use crate::constants::SEQUENCE_LENGTH;
use crate::sample::Sample;

/// Two-channel sliding window with capacity `N`
#[derive(Clone)]
pub struct RollingWindow<const N: usize = SEQUENCE_LENGTH> {
    ir: Deque<f64, N>,
    red: Deque<f64, N>,
    total_seen: u64,
}

impl<const N: usize> RollingWindow<N> {
    /// Create an empty window
    pub const fn new() -> Self {
        Self {
            ir: Deque::new(),
            red: Deque::new(),
            total_seen: 0,
        }
    }

    /// Maximum number of samples held
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append a sample, evicting and returning the oldest one when full
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.ir.is_full() {
            match (self.ir.pop_front(), self.red.pop_front()) {
                (Some(ir), Some(red)) => Some(Sample::new(ir, red)),
                _ => None,
            }
        } else {
            None
        };

        // Room is guaranteed: either the deque was not full or a slot was
        // just freed above.
        let _ = self.ir.push_back(sample.ir);
        let _ = self.red.push_back(sample.red);
        self.total_seen += 1;

        evicted
    }

    /// Samples currently held
    pub fn len(&self) -> usize {
        self.ir.len()
    }

    /// Whether no samples are held
    pub fn is_empty(&self) -> bool {
        self.ir.is_empty()
    }

    /// Whether the window holds `N` samples
    pub fn is_at_capacity(&self) -> bool {
        self.ir.is_full()
    }

    /// Samples appended since creation (or the last [`clear`](Self::clear))
    pub fn total_seen(&self) -> u64 {
        self.total_seen
    }

    /// Infrared channel, oldest first
    pub fn ir(&self) -> impl Iterator<Item = f64> + '_ {
        self.ir.iter().copied()
    }

    /// Red channel, oldest first
    pub fn red(&self) -> impl Iterator<Item = f64> + '_ {
        self.red.iter().copied()
    }

    /// Both channels as samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.ir().zip(self.red()).map(|(ir, red)| Sample::new(ir, red))
    }

    /// Most recent sample
    pub fn last(&self) -> Option<Sample> {
        match (self.ir.back(), self.red.back()) {
            (Some(&ir), Some(&red)) => Some(Sample::new(ir, red)),
            _ => None,
        }
    }

    /// Drop all samples and reset `total_seen`
    pub fn clear(&mut self) {
        self.ir.clear();
        self.red.clear();
        self.total_seen = 0;
    }

    /// Bytes of sample storage the window occupies on the device
    pub const fn storage_bytes() -> usize {
        2 * N * core::mem::size_of::<f64>()
    }
}

impl<const N: usize> Default for RollingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
