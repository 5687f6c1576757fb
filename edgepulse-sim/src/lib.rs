//! Simulated Dual-Core Device for EdgePulse
//!
//! ## Overview
//!
//! Runs the sense → buffer → infer pipeline of the target part on a tokio
//! runtime so its timing, buffering and control flow can be checked before
//! anything is flashed. Each core is one task:
//!
//! ```text
//!        unit 0                                     unit 1
//! ┌──────────────────┐   SampleQueue (100)   ┌───────────────────────┐
//! │ AcquisitionLoop  │ ────────────────────► │ InferenceLoop         │
//! │ 10 ms tick       │   drop on full        │ RollingWindow (1500)  │
//! │ sensor.read()    │                       │ Normalizer            │
//! └──────────────────┘                       │ InferenceEngine       │
//!                                            └──────────┬────────────┘
//!                                                       │ ResultQueue
//!                                                       ▼
//!                                               ConsoleReporter
//! ```
//!
//! The sample queue is the only synchronization point. The window,
//! normalization statistics and engine belong to the inference task; memory
//! regions belong to the device.
//!
//! ## Example
//!
//! ```no_run
//! use edgepulse_ml::FixedOutputEngine;
//! use edgepulse_sim::{Device, SimConfig, SyntheticSensor};
//!
//! # async fn run() -> edgepulse_sim::SimResult<()> {
//! let config = SimConfig::default();
//! let sensor = SyntheticSensor::new(config.sensor.clone());
//! let engine = FixedOutputEngine::uniform(3000);
//!
//! let mut device = Device::new(config)?.boot(sensor, engine, 0)?;
//! while let Some(result) = device.results().recv().await {
//!     println!("{:?}", result.probabilities);
//! }
//! device.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod acquisition;
pub mod config;
pub mod device;
pub mod error;
pub mod inference;
pub mod queue;
pub mod report;
pub mod sensor;
pub mod stop;
pub mod unit;

pub use acquisition::{AcquisitionLoop, AcquisitionReport};
pub use config::{SimConfig, TriggerPolicy};
pub use device::{Device, MemoryPlan, RunningDevice, ShutdownReport};
pub use error::{SimError, SimResult};
pub use inference::{CycleOutcome, InferenceContext, InferenceReport};
pub use queue::{result_queue, sample_queue, QueueSnapshot, Recv, ResultReceiver, ResultSender};
pub use report::ConsoleReporter;
pub use sensor::{dataset_source, load_dataset_csv, SyntheticSensor};
pub use stop::StopSignal;
pub use unit::{ExecutionUnit, TaskLabel, UnitLatencies, UnitStats};
