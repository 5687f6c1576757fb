//! Sensor sources
//!
//! The acquisition core reads one `(ir, red)` pair per tick from a
//! [`SensorSource`]. On hardware this is the pulse oximeter driver; in the
//! simulator it is either a synthetic generator or a recorded dataset played
//! back by [`ReplaySource`].

use alloc::vec::Vec;

use crate::sample::Sample;

/// Anything that yields one sample per call
pub trait SensorSource {
    /// Read the next sample
    fn read(&mut self) -> Sample;
}

impl<F> SensorSource for F
where
    F: FnMut() -> Sample,
{
    fn read(&mut self) -> Sample {
        self()
    }
}

/// Cyclic playback of a recorded sequence
///
/// When the recording runs out playback restarts from the first sample, so a
/// short capture can drive an arbitrarily long simulation.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<Sample>,
    cursor: usize,
    laps: u64,
}

impl ReplaySource {
    /// Replay `samples`; `None` if the recording is empty
    pub fn new(samples: Vec<Sample>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Some(Self {
            samples,
            cursor: 0,
            laps: 0,
        })
    }

    /// Recorded samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; an empty recording is rejected by [`new`](Self::new)
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Completed passes over the recording
    pub fn laps(&self) -> u64 {
        self.laps
    }
}

impl SensorSource for ReplaySource {
    fn read(&mut self) -> Sample {
        let sample = self.samples[self.cursor];
        self.cursor += 1;
        if self.cursor == self.samples.len() {
            self.cursor = 0;
            self.laps += 1;
        }
        sample
    }
}
