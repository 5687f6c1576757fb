//! Simulated Device: Boot, Run, Shutdown
//!
//! ## Boot
//!
//! Boot reserves memory in a fixed order and stops at the first failure:
//!
//! ```text
//! 1. model artifact bytes  → extended region
//! 2. tensor arena          → extended region
//! 3. rolling window        → fast region   (2 × 1500 × 8 bytes)
//! 4. engine shape check    (3000 in, 3 out)
//! ```
//!
//! Only then are the two loops spawned, each on its own unit:
//!
//! ```text
//! unit 0 ── AcquisitionLoop ──► SampleQueue ──► InferenceLoop ── unit 1
//!                                                    │
//!                                                    ▼
//!                                               ResultQueue ──► RunningDevice::results()
//! ```
//!
//! ## Shutdown
//!
//! [`RunningDevice::shutdown`] raises the stop flag and joins both loops. Each
//! loop notices within one iteration, so the join completes within
//! `max(tick period, dequeue timeout)` plus the task in flight.

use std::sync::Arc;

use edgepulse_core::constants::SEQUENCE_LENGTH;
use edgepulse_core::{
    ensure_default_shape, InferenceEngine, MemoryAllocator, PredictionResult, RegionBuffer,
    RegionKind, RollingWindow, SensorSource,
};
use tokio::task::JoinHandle;

use crate::acquisition::{AcquisitionLoop, AcquisitionReport};
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::inference::{InferenceContext, InferenceReport};
use crate::queue::{result_queue, sample_queue, QueueSnapshot, QueueStats, ResultReceiver};
use crate::stop::StopSignal;
use crate::unit::{ExecutionUnit, UnitLatencies, UnitStats};

/// Id of the application core
pub const ACQUISITION_UNIT: u8 = 0;
/// Id of the real-time core
pub const INFERENCE_UNIT: u8 = 1;

/// Buffers reserved at boot
#[derive(Debug)]
pub struct MemoryPlan {
    /// Model bytes
    pub model: RegionBuffer,
    /// Interpreter scratch space
    pub arena: RegionBuffer,
    /// Rolling window storage
    pub window: RegionBuffer,
}

/// Region usage after boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MemoryUsage {
    /// Fast region bytes in use
    pub fast_used: usize,
    /// Fast region capacity
    pub fast_capacity: usize,
    /// Extended region bytes in use
    pub extended_used: usize,
    /// Extended region capacity
    pub extended_capacity: usize,
}

/// A configured device that has not booted yet
#[derive(Debug)]
pub struct Device {
    config: SimConfig,
    allocator: MemoryAllocator,
}

impl Device {
    /// Validate `config` and set up empty memory regions
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let allocator = MemoryAllocator::with_capacities(
            config.memory.fast_bytes,
            config.memory.extended_bytes,
        );
        Ok(Self { config, allocator })
    }

    /// Active configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The device's allocator
    pub fn allocator(&self) -> &MemoryAllocator {
        &self.allocator
    }

    /// Reserve the boot buffers for a model of `model_bytes`
    pub fn reserve(&mut self, model_bytes: usize) -> SimResult<MemoryPlan> {
        let model = self.allocator.allocate(model_bytes, RegionKind::Extended)?;
        log::info!("reserved {} bytes for model in extended region", model_bytes);

        let arena_bytes = self.config.memory.tensor_arena_bytes;
        let arena = self.allocator.allocate(arena_bytes, RegionKind::Extended)?;
        log::info!("reserved {} bytes for tensor arena in extended region", arena_bytes);

        let window_bytes = RollingWindow::<SEQUENCE_LENGTH>::storage_bytes();
        let window = self.allocator.allocate(window_bytes, RegionKind::Fast)?;
        log::info!("reserved {} bytes for rolling window in fast region", window_bytes);

        Ok(MemoryPlan {
            model,
            arena,
            window,
        })
    }

    /// Region usage
    pub fn memory_usage(&self) -> MemoryUsage {
        MemoryUsage {
            fast_used: self.allocator.used(RegionKind::Fast),
            fast_capacity: self.allocator.capacity(RegionKind::Fast),
            extended_used: self.allocator.used(RegionKind::Extended),
            extended_capacity: self.allocator.capacity(RegionKind::Extended),
        }
    }

    /// Boot and start both loops
    ///
    /// Must be called from within a tokio runtime. Memory and shape failures
    /// are returned before anything is spawned.
    pub fn boot<S, E>(
        mut self,
        source: S,
        engine: E,
        model_bytes: usize,
    ) -> SimResult<RunningDevice>
    where
        S: SensorSource + Send + 'static,
        E: InferenceEngine + Send + 'static,
    {
        let plan = self.reserve(model_bytes)?;
        ensure_default_shape(&engine)?;
        let memory = self.memory_usage();

        let latencies = UnitLatencies::from_timing(&self.config.timing);
        let acquisition_unit = Arc::new(ExecutionUnit::new(ACQUISITION_UNIT, latencies));
        let inference_unit = Arc::new(ExecutionUnit::new(INFERENCE_UNIT, latencies));

        let (samples_tx, samples_rx) = sample_queue(self.config.queues.sample_capacity);
        let (results_tx, results_rx) = result_queue();
        let queue_stats = samples_tx.stats();
        let stop = StopSignal::new();

        let context: InferenceContext<E> = InferenceContext::new(
            Arc::clone(&inference_unit),
            engine,
            self.config.trigger,
            results_tx,
        )?;

        let timing = &self.config.timing;
        let acquisition = tokio::spawn(
            AcquisitionLoop::new(
                Arc::clone(&acquisition_unit),
                source,
                samples_tx,
                timing.tick_period(),
            )
            .run(stop.clone()),
        );
        let inference = tokio::spawn(context.run(
            samples_rx,
            timing.dequeue_timeout(),
            stop.clone(),
        ));

        log::info!(
            "device booted: fast {}/{} bytes, extended {}/{} bytes",
            memory.fast_used,
            memory.fast_capacity,
            memory.extended_used,
            memory.extended_capacity
        );

        Ok(RunningDevice {
            config: self.config,
            allocator: self.allocator,
            plan,
            memory,
            stop,
            results: results_rx,
            queue_stats,
            acquisition_unit,
            inference_unit,
            acquisition,
            inference,
        })
    }
}

/// Everything observed over one run
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShutdownReport {
    /// Region usage at boot
    pub memory: MemoryUsage,
    /// Sample queue counters
    pub queue: QueueSnapshot,
    /// Acquisition loop counters
    pub acquisition: AcquisitionReport,
    /// Inference loop counters
    pub inference: InferenceReport,
    /// Completed tasks on the application core
    #[serde(skip)]
    pub acquisition_unit: UnitStats,
    /// Completed tasks on the real-time core
    #[serde(skip)]
    pub inference_unit: UnitStats,
    /// Results still queued when both loops had stopped
    #[serde(skip)]
    pub remaining: Vec<PredictionResult>,
}

/// A booted device with both loops running
#[derive(Debug)]
pub struct RunningDevice {
    config: SimConfig,
    allocator: MemoryAllocator,
    plan: MemoryPlan,
    memory: MemoryUsage,
    stop: StopSignal,
    results: ResultReceiver,
    queue_stats: Arc<QueueStats>,
    acquisition_unit: Arc<ExecutionUnit>,
    inference_unit: Arc<ExecutionUnit>,
    acquisition: JoinHandle<AcquisitionReport>,
    inference: JoinHandle<InferenceReport>,
}

impl RunningDevice {
    /// Result queue consumer
    pub fn results(&mut self) -> &mut ResultReceiver {
        &mut self.results
    }

    /// Live sample queue counters
    pub fn queue_stats(&self) -> QueueSnapshot {
        self.queue_stats.snapshot()
    }

    /// Region usage at boot
    pub fn memory_usage(&self) -> MemoryUsage {
        self.memory
    }

    /// Stop both loops, wait for them and release the boot buffers
    ///
    /// Results published before the loops stopped end up in
    /// [`ShutdownReport::remaining`].
    pub async fn shutdown(mut self) -> SimResult<ShutdownReport> {
        self.stop.request_stop();
        log::info!(
            "stopping, expected within {:?}",
            self.config.timing.shutdown_bound()
        );

        let (acquisition, inference) = tokio::join!(self.acquisition, self.inference);
        let acquisition = acquisition?;
        let inference = inference?;

        let MemoryPlan {
            model,
            arena,
            window,
        } = self.plan;
        for buffer in [window, arena, model] {
            self.allocator.release(buffer)?;
        }

        let report = ShutdownReport {
            memory: self.memory,
            queue: self.queue_stats.snapshot(),
            acquisition,
            inference,
            acquisition_unit: self.acquisition_unit.stats(),
            inference_unit: self.inference_unit.stats(),
            remaining: self.results.drain(),
        };
        log::info!(
            "shutdown complete: {} predictions, {} samples dropped",
            report.inference.predictions,
            report.queue.dropped
        );
        Ok(report)
    }
}
