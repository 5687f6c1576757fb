//! Acquisition loop (application core)
//!
//! One sample per tick, offered to the sample queue without waiting. A full
//! queue costs the sample, never the tick.

use std::sync::Arc;
use std::time::Duration;

use edgepulse_core::SensorSource;
use tokio::time::{interval, MissedTickBehavior};

use crate::queue::SampleSender;
use crate::stop::StopSignal;
use crate::unit::{ExecutionUnit, TaskLabel};

/// Counters returned when the loop exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct AcquisitionReport {
    /// Ticks completed
    pub ticks: u64,
    /// Samples that entered the queue
    pub accepted: u64,
    /// Samples dropped at a full queue
    pub dropped: u64,
}

/// Periodic sample producer
pub struct AcquisitionLoop<S> {
    unit: Arc<ExecutionUnit>,
    source: S,
    queue: SampleSender,
    tick_period: Duration,
}

impl<S: SensorSource> AcquisitionLoop<S> {
    /// Producer reading `source` every `tick_period`
    pub fn new(
        unit: Arc<ExecutionUnit>,
        source: S,
        queue: SampleSender,
        tick_period: Duration,
    ) -> Self {
        Self {
            unit,
            source,
            queue,
            tick_period,
        }
    }

    /// Produce samples until stopped
    ///
    /// The stop flag is checked after every tick wait, so the loop exits
    /// within one tick period of a stop request.
    pub async fn run(mut self, stop: StopSignal) -> AcquisitionReport {
        let mut report = AcquisitionReport::default();
        let mut ticker = interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "acquisition loop started on unit {} ({:?} tick)",
            self.unit.id(),
            self.tick_period
        );
        loop {
            ticker.tick().await;
            if stop.is_stopped() {
                break;
            }

            let source = &mut self.source;
            let sample = self
                .unit
                .execute(TaskLabel::Acquire, async { source.read() })
                .await;
            if self.queue.offer(sample) {
                report.accepted += 1;
            } else {
                report.dropped += 1;
            }
            report.ticks += 1;
        }
        log::info!(
            "acquisition loop stopped: {} ticks, {} dropped",
            report.ticks,
            report.dropped
        );
        report
    }
}
