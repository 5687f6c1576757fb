//! Heart Rate Variability from RR Intervals
//!
//! Keeps the most recent RR intervals (time between successive heart beats,
//! in milliseconds) and reports RMSSD, the short-term HRV measure used as a
//! stress indicator alongside the classifier:
//!
//! ```text
//! RMSSD = sqrt( Σ (rr[i] - rr[i-1])² / (n - 1) )
//! ```
//!
//! Fewer than two intervals give an RMSSD of 0.

use heapless::Deque;

/// Number of RR intervals retained
pub const MAX_RR_INTERVALS: usize = 100;

/// Sliding RMSSD calculator
#[derive(Clone, Default)]
pub struct HrvCalculator {
    intervals: Deque<u32, MAX_RR_INTERVALS>,
}

impl HrvCalculator {
    /// Empty calculator
    pub const fn new() -> Self {
        Self {
            intervals: Deque::new(),
        }
    }

    /// Record one RR interval in milliseconds, dropping the oldest when full
    pub fn add_rr_interval(&mut self, rr_ms: u32) {
        if self.intervals.is_full() {
            self.intervals.pop_front();
        }
        let _ = self.intervals.push_back(rr_ms);
    }

    /// Intervals currently held
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether no intervals are held
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// RMSSD in milliseconds over the retained intervals
    pub fn rmssd(&self) -> f32 {
        if self.intervals.len() < 2 {
            return 0.0;
        }

        let mut sum_sq = 0.0f32;
        let mut count = 0u32;
        let mut prev: Option<u32> = None;
        for &rr in self.intervals.iter() {
            if let Some(p) = prev {
                let diff = rr as f32 - p as f32;
                sum_sq += diff * diff;
                count += 1;
            }
            prev = Some(rr);
        }

        libm::sqrtf(sum_sq / count as f32)
    }

    /// Forget all intervals
    pub fn reset(&mut self) {
        self.intervals.clear();
    }
}
