//! Simulated Execution Units
//!
//! ## Overview
//!
//! Each core of the target part is modelled as an [`ExecutionUnit`]. A unit
//! runs one labelled task at a time, adds the latency the real core would
//! spend on that kind of work, and exposes whether it is busy and what it is
//! running.
//!
//! ```text
//! unit A (application core)   acquire ─ acquire ─ acquire ─ ...
//! unit B (real-time core)     add-sample ─ predict ┬ normalize ┐ ─ add-sample
//!                                                  └───────────┘
//! ```
//!
//! Tasks may nest: `predict` runs a `normalize` sub-task on the same unit. When
//! the inner task finishes the unit reports the outer label again, and it only
//! goes idle when the outermost task returns.
//!
//! ## Latency Model
//!
//! | Label        | Category      | Added latency   |
//! |--------------|---------------|-----------------|
//! | `normalize`  | normalization | 1 ms (default)  |
//! | `predict`    | inference     | 5 ms (default)  |
//! | `add-sample` | other         | none            |
//! | `acquire`    | other         | none            |
//!
//! The latency is applied before the task body runs.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::time::Duration;

use crate::config::TimingConfig;

const IDLE: u8 = 0;

/// What a task is, for latency and accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskLabel {
    /// Read one sample from the sensor
    Acquire,
    /// Append a sample to the rolling window
    AddSample,
    /// Recompute normalization statistics
    Normalize,
    /// Full prediction cycle
    Predict,
}

/// Latency class of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
    /// Statistics over the window
    Normalization,
    /// Model invocation
    Inference,
    /// Everything else; no added latency
    Other,
}

impl TaskLabel {
    /// All labels, in counter order
    pub const ALL: [TaskLabel; 4] = [
        TaskLabel::Acquire,
        TaskLabel::AddSample,
        TaskLabel::Normalize,
        TaskLabel::Predict,
    ];

    /// Short name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acquire => "acquire",
            Self::AddSample => "add-sample",
            Self::Normalize => "normalize",
            Self::Predict => "predict",
        }
    }

    /// Latency class
    pub fn category(self) -> TaskCategory {
        match self {
            Self::Normalize => TaskCategory::Normalization,
            Self::Predict => TaskCategory::Inference,
            Self::Acquire | Self::AddSample => TaskCategory::Other,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Acquire => 0,
            Self::AddSample => 1,
            Self::Normalize => 2,
            Self::Predict => 3,
        }
    }

    fn code(self) -> u8 {
        self.index() as u8 + 1
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            IDLE => None,
            c => Self::ALL.get(usize::from(c) - 1).copied(),
        }
    }
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Added latency per task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitLatencies {
    /// Normalization tasks
    pub normalization: Duration,
    /// Inference tasks
    pub inference: Duration,
}

impl UnitLatencies {
    /// Latencies from the timing configuration
    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self {
            normalization: Duration::from_millis(timing.normalize_latency_ms),
            inference: Duration::from_millis(timing.inference_latency_ms),
        }
    }

    /// Latency for one task
    pub fn for_label(&self, label: TaskLabel) -> Duration {
        match label.category() {
            TaskCategory::Normalization => self.normalization,
            TaskCategory::Inference => self.inference,
            TaskCategory::Other => Duration::ZERO,
        }
    }
}

/// Completed task counts of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitStats {
    /// Unit identifier
    pub id: u8,
    /// Completed tasks, indexed like [`TaskLabel::ALL`]
    pub completed: [u64; 4],
}

impl UnitStats {
    /// Completed tasks with `label`
    pub fn completed(&self, label: TaskLabel) -> u64 {
        self.completed[label.index()]
    }
}

/// One simulated core
///
/// State is atomic so the device can observe a unit while the loop that owns
/// it is running on another thread.
#[derive(Debug)]
pub struct ExecutionUnit {
    id: u8,
    latencies: UnitLatencies,
    busy: AtomicBool,
    current: AtomicU8,
    completed: [AtomicU64; 4],
}

impl ExecutionUnit {
    /// Idle unit
    pub fn new(id: u8, latencies: UnitLatencies) -> Self {
        Self {
            id,
            latencies,
            busy: AtomicBool::new(false),
            current: AtomicU8::new(IDLE),
            completed: Default::default(),
        }
    }

    /// Unit identifier
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Whether a task is running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Label of the innermost running task
    pub fn current(&self) -> Option<TaskLabel> {
        TaskLabel::from_code(self.current.load(Ordering::Acquire))
    }

    /// Run `task` as `label`, adding the label's latency first
    ///
    /// The unit is busy for the whole call. On return the enclosing task's
    /// label is restored, or the unit goes idle if there was none.
    pub async fn execute<F, T>(&self, label: TaskLabel, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let previous = self.current.swap(label.code(), Ordering::AcqRel);
        self.busy.store(true, Ordering::Release);

        let latency = self.latencies.for_label(label);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let output = task.await;

        self.current.store(previous, Ordering::Release);
        self.busy.store(previous != IDLE, Ordering::Release);
        self.completed[label.index()].fetch_add(1, Ordering::Relaxed);
        output
    }

    /// Snapshot of completed task counts
    pub fn stats(&self) -> UnitStats {
        let mut completed = [0u64; 4];
        for (slot, counter) in completed.iter_mut().zip(&self.completed) {
            *slot = counter.load(Ordering::Relaxed);
        }
        UnitStats {
            id: self.id,
            completed,
        }
    }
}
