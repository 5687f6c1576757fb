//! Inference Loop (real-time core)
//!
//! ## Overview
//!
//! Owns the rolling window, the normalizer and the engine. For every sample
//! taken off the queue:
//!
//! ```text
//! add-sample ─► predicate? ─no─► next sample
//!                   │yes
//!                   ▼
//!            predict ┬─ normalize   (stats over whole window)
//!                    ├─ features    (interleaved, 2 × N values)
//!                    ├─ invoke      (engine → probabilities)
//!                    └─ publish     (result queue)
//! ```
//!
//! A failed engine invocation ends that cycle only. It is logged and counted;
//! the loop keeps consuming samples.

use std::sync::Arc;
use std::time::Duration;

use edgepulse_core::constants::{N_FEATURES, SEQUENCE_LENGTH};
use edgepulse_core::{
    ensure_shape, DeviceError, DeviceResult, InferenceEngine, Normalizer, PredictionResult,
    RollingWindow, Sample,
};

use crate::config::TriggerPolicy;
use crate::queue::{Recv, ResultSender, SampleReceiver};
use crate::stop::StopSignal;
use crate::unit::{ExecutionUnit, TaskLabel};

/// What happened to one consumed sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Appended; no prediction due
    Buffered,
    /// Appended and a prediction was published
    Predicted(PredictionResult),
    /// Appended but the prediction cycle failed
    Failed(DeviceError),
}

/// Counters returned when the loop exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct InferenceReport {
    /// Samples consumed
    pub samples: u64,
    /// Dequeue waits that timed out
    pub timeouts: u64,
    /// Results published
    pub predictions: u64,
    /// Prediction cycles that failed
    pub failed_cycles: u64,
}

/// State owned by the inference core
pub struct InferenceContext<E, const N: usize = SEQUENCE_LENGTH> {
    unit: Arc<ExecutionUnit>,
    window: RollingWindow<N>,
    normalizer: Normalizer,
    engine: E,
    features: Vec<f32>,
    trigger: TriggerPolicy,
    last_prediction_at: Option<u64>,
    results: ResultSender,
    report: InferenceReport,
}

impl<E: InferenceEngine, const N: usize> InferenceContext<E, N> {
    /// Set up the context; fails if `engine` does not take `N × 2` inputs
    pub fn new(
        unit: Arc<ExecutionUnit>,
        engine: E,
        trigger: TriggerPolicy,
        results: ResultSender,
    ) -> DeviceResult<Self> {
        ensure_shape(&engine, N * N_FEATURES)?;
        Ok(Self {
            unit,
            window: RollingWindow::new(),
            normalizer: Normalizer::new(),
            engine,
            features: vec![0.0; N * N_FEATURES],
            trigger,
            last_prediction_at: None,
            results,
            report: InferenceReport::default(),
        })
    }

    /// Window contents
    pub fn window(&self) -> &RollingWindow<N> {
        &self.window
    }

    /// Normalizer with the statistics of the last cycle
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Counters so far
    pub fn report(&self) -> InferenceReport {
        self.report
    }

    /// Whether the current window state is due for a prediction
    pub fn should_predict(&self) -> bool {
        self.trigger
            .should_predict(self.window.total_seen(), self.last_prediction_at, N)
    }

    /// Append one sample and run a prediction cycle if one is due
    pub async fn on_sample(&mut self, sample: Sample) -> CycleOutcome {
        let unit = Arc::clone(&self.unit);
        self.report.samples += 1;

        let window = &mut self.window;
        unit.execute(TaskLabel::AddSample, async {
            window.push(sample);
        })
        .await;

        if !self.should_predict() {
            return CycleOutcome::Buffered;
        }
        self.last_prediction_at = Some(self.window.total_seen());
        let sequence = self.report.predictions + self.report.failed_cycles;

        match self.predict(&unit, sequence).await {
            Ok(result) => {
                self.report.predictions += 1;
                log::debug!(
                    "prediction {} class {} ({:.3})",
                    result.sequence,
                    result.predicted_class(),
                    result.confidence()
                );
                if !self.results.push(result) {
                    log::warn!("result consumer gone, prediction {} discarded", sequence);
                }
                CycleOutcome::Predicted(result)
            }
            Err(err) => {
                self.report.failed_cycles += 1;
                log::error!("prediction cycle {} failed: {}", sequence, err);
                CycleOutcome::Failed(err)
            }
        }
    }

    async fn predict(
        &mut self,
        unit: &ExecutionUnit,
        sequence: u64,
    ) -> DeviceResult<PredictionResult> {
        let Self {
            window,
            normalizer,
            engine,
            features,
            ..
        } = self;

        unit.execute(TaskLabel::Predict, async move {
            unit.execute(TaskLabel::Normalize, async {
                normalizer.update(window).map(|_| ())
            })
            .await?;

            normalizer.write_features(window, &mut features[..])?;
            let probabilities = engine.invoke(&features[..])?;
            Ok(PredictionResult {
                sequence,
                window_total: window.total_seen(),
                probabilities,
            })
        })
        .await
    }

    /// Consume samples until stopped or the producer goes away
    pub async fn run(
        mut self,
        mut samples: SampleReceiver,
        dequeue_timeout: Duration,
        stop: StopSignal,
    ) -> InferenceReport {
        log::info!("inference loop started on unit {}", self.unit.id());
        while !stop.is_stopped() {
            match samples.recv_timeout(dequeue_timeout).await {
                Recv::Sample(sample) => {
                    self.on_sample(sample).await;
                }
                Recv::TimedOut => self.report.timeouts += 1,
                Recv::Closed => break,
            }
        }
        log::info!(
            "inference loop stopped: {} samples, {} predictions, {} failed",
            self.report.samples,
            self.report.predictions,
            self.report.failed_cycles
        );
        self.report
    }
}
