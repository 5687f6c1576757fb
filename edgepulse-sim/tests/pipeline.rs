//! End-to-end behavior of the simulated device

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use edgepulse_core::constants::{FEATURE_VECTOR_LEN, SEQUENCE_LENGTH};
use edgepulse_core::{
    DeviceError, DeviceResult, InferenceEngine, Probabilities, RegionKind, ReplaySource, Sample,
    SensorSource,
};
use edgepulse_ml::FixedOutputEngine;
use edgepulse_sim::{
    dataset_source, result_queue, CycleOutcome, Device, ExecutionUnit, InferenceContext,
    SimConfig, SimError, TaskLabel, TriggerPolicy, UnitLatencies,
};
use tokio::time::{timeout, Instant};

fn constant_source() -> ReplaySource {
    ReplaySource::new(vec![Sample::new(1000.0, 800.0)]).unwrap()
}

#[tokio::test(start_paused = true)]
async fn constant_window_yields_one_zero_input_prediction() {
    let unit = Arc::new(ExecutionUnit::new(1, UnitLatencies::default()));
    let (tx, mut rx) = result_queue();
    let engine = FixedOutputEngine::uniform(FEATURE_VECTOR_LEN);
    let probe = engine.probe();
    let mut ctx: InferenceContext<_> =
        InferenceContext::new(unit, engine, TriggerPolicy::default(), tx).unwrap();

    let mut predictions = 0;
    for _ in 0..SEQUENCE_LENGTH {
        if let CycleOutcome::Predicted(_) = ctx.on_sample(Sample::new(1000.0, 800.0)).await {
            predictions += 1;
        }
    }

    assert_eq!(predictions, 1);
    assert_eq!(probe.invocations(), 1);

    let stats = ctx.normalizer().stats();
    assert_eq!(stats.std_ir, 1.0);
    assert_eq!(stats.std_red, 1.0);

    let input = probe.snapshot().last_input;
    assert_eq!(input.len(), FEATURE_VECTOR_LEN);
    assert!(input.iter().all(|&v| v == 0.0));

    let results = rx.drain();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].window_total, SEQUENCE_LENGTH as u64);
}

/// Fails every other invocation
struct Flaky {
    calls: u32,
}

impl InferenceEngine for Flaky {
    fn input_len(&self) -> usize {
        4
    }

    fn invoke(&mut self, _input: &[f32]) -> DeviceResult<Probabilities> {
        self.calls += 1;
        if self.calls % 2 == 1 {
            Err(DeviceError::InferenceFailed {
                reason: "interpreter error",
            })
        } else {
            Ok([0.5, 0.25, 0.25])
        }
    }
}

#[tokio::test(start_paused = true)]
async fn engine_failure_ends_cycle_only() {
    let unit = Arc::new(ExecutionUnit::new(1, UnitLatencies::default()));
    let (tx, mut rx) = result_queue();
    let mut ctx =
        InferenceContext::<_, 2>::new(unit, Flaky { calls: 0 }, TriggerPolicy::default(), tx)
            .unwrap();

    ctx.on_sample(Sample::new(1.0, 1.0)).await;
    let failed = ctx.on_sample(Sample::new(2.0, 2.0)).await;
    assert!(matches!(
        failed,
        CycleOutcome::Failed(DeviceError::InferenceFailed { .. })
    ));
    assert!(rx.try_recv().is_none());

    let recovered = ctx.on_sample(Sample::new(3.0, 3.0)).await;
    let CycleOutcome::Predicted(result) = recovered else {
        panic!("expected a prediction, got {recovered:?}");
    };
    assert_eq!(result.sequence, 1);
    assert_eq!(rx.try_recv(), Some(result));

    let report = ctx.report();
    assert_eq!(report.samples, 3);
    assert_eq!(report.predictions, 1);
    assert_eq!(report.failed_cycles, 1);
}

#[tokio::test(start_paused = true)]
async fn device_runs_and_shuts_down_within_bound() {
    let config = SimConfig::default();
    let bound = config.timing.shutdown_bound();
    let engine = FixedOutputEngine::new(FEATURE_VECTOR_LEN, [0.1, 0.1, 0.8]);
    let probe = engine.probe();

    let mut device = Device::new(config)
        .unwrap()
        .boot(constant_source(), engine, 64 * 1024)
        .unwrap();

    let first = timeout(Duration::from_secs(20), device.results().recv())
        .await
        .expect("no prediction within 20 s")
        .unwrap();
    assert_eq!(first.sequence, 0);
    assert_eq!(first.window_total, SEQUENCE_LENGTH as u64);
    assert_eq!(first.predicted_class(), 2);

    let memory = device.memory_usage();
    assert_eq!(memory.extended_used, 64 * 1024 + 200 * 1024);
    assert_eq!(memory.fast_used, 2 * SEQUENCE_LENGTH * 8);

    let started = Instant::now();
    let report = device.shutdown().await.unwrap();
    assert!(started.elapsed() <= bound + Duration::from_millis(6));

    assert!(report.inference.predictions >= 1);
    assert_eq!(report.inference.failed_cycles, 0);
    assert_eq!(report.queue.accepted, report.acquisition.accepted);
    assert!(report.inference.samples <= report.queue.accepted);
    assert_eq!(
        report.inference_unit.completed(TaskLabel::Predict),
        report.inference.predictions
    );
    assert_eq!(
        report.inference_unit.completed(TaskLabel::Normalize),
        report.inference.predictions
    );
    assert_eq!(probe.invocations(), report.inference.predictions);
    assert!(probe.snapshot().last_input.iter().all(|&v| v == 0.0));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["inference"]["predictions"], report.inference.predictions);
    assert_eq!(json["queue"]["accepted"], report.queue.accepted);
    assert_eq!(json["memory"]["fast_used"], 2 * SEQUENCE_LENGTH * 8);
    assert!(json.get("remaining").is_none());
}

/// Uniform engine that records when the inference loop lets go of it
struct DropFlagEngine(Arc<AtomicBool>);

impl InferenceEngine for DropFlagEngine {
    fn input_len(&self) -> usize {
        FEATURE_VECTOR_LEN
    }

    fn invoke(&mut self, _input: &[f32]) -> DeviceResult<Probabilities> {
        Ok([1.0 / 3.0; 3])
    }
}

impl Drop for DropFlagEngine {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_joins_inference_when_acquisition_panics() {
    let mut config = SimConfig::default();
    config.timing.inference_latency_ms = 1_000;
    let dropped = Arc::new(AtomicBool::new(false));

    let mut reads = 0;
    let source = move || {
        reads += 1;
        assert!(reads <= SEQUENCE_LENGTH, "sensor fault");
        Sample::new(1000.0, 800.0)
    };

    let device = Device::new(config)
        .unwrap()
        .boot(source, DropFlagEngine(Arc::clone(&dropped)), 0)
        .unwrap();

    // acquisition has panicked, inference is inside the first predict task
    tokio::time::sleep(Duration::from_millis(15_500)).await;
    assert!(!dropped.load(Ordering::SeqCst));

    let err = device.shutdown().await.unwrap_err();
    assert!(matches!(err, SimError::Join(_)));
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn model_too_large_fails_boot() {
    let config = SimConfig::default();
    let extended = config.memory.extended_bytes;
    let engine = FixedOutputEngine::uniform(FEATURE_VECTOR_LEN);

    let err = Device::new(config)
        .unwrap()
        .boot(constant_source(), engine, extended)
        .unwrap_err();

    match err {
        SimError::Device(DeviceError::OutOfMemory { region, requested, .. }) => {
            assert_eq!(region, RegionKind::Extended);
            assert_eq!(requested, 200 * 1024);
        }
        other => panic!("expected out of memory, got {other:?}"),
    }
}

#[tokio::test]
async fn window_must_fit_fast_region() {
    let mut config = SimConfig::default();
    config.memory.fast_bytes = 16 * 1024;
    let engine = FixedOutputEngine::uniform(FEATURE_VECTOR_LEN);

    let err = Device::new(config)
        .unwrap()
        .boot(constant_source(), engine, 0)
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Device(DeviceError::OutOfMemory {
            region: RegionKind::Fast,
            ..
        })
    ));
}

#[tokio::test]
async fn wrong_model_shape_fails_boot() {
    let engine = FixedOutputEngine::uniform(100);
    let err = Device::new(SimConfig::default())
        .unwrap()
        .boot(constant_source(), engine, 0)
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Device(DeviceError::ShapeMismatch {
            expected: FEATURE_VECTOR_LEN,
            actual: 100
        })
    ));
}

#[test]
fn invalid_config_rejected_before_boot() {
    let mut config = SimConfig::default();
    config.timing.tick_period_ms = 0;
    assert!(matches!(Device::new(config), Err(SimError::Config(_))));
}

#[test]
fn dataset_file_replays() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ir,red").unwrap();
    writeln!(file, "1000,800").unwrap();
    writeln!(file, "1010,790").unwrap();
    file.flush().unwrap();

    let mut source = dataset_source(file.path()).unwrap();
    assert_eq!(source.len(), 2);
    assert_eq!(source.read(), Sample::new(1000.0, 800.0));
    assert_eq!(source.read(), Sample::new(1010.0, 790.0));
    assert_eq!(source.read(), Sample::new(1000.0, 800.0));
}

#[test]
fn empty_dataset_rejected() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(matches!(
        dataset_source(file.path()),
        Err(SimError::EmptyDataset)
    ));
}

#[test]
fn config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "queues": {{ "sample_capacity": 8 }}, "trigger": "per_window" }}"#).unwrap();
    file.flush().unwrap();

    let config = SimConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.queues.sample_capacity, 8);
    assert_eq!(config.trigger, TriggerPolicy::PerWindow);

    let written = config.to_json_pretty().unwrap();
    assert_eq!(SimConfig::from_json_str(&written).unwrap(), config);

    assert!(matches!(
        SimConfig::from_json_file("/nonexistent/config.json"),
        Err(SimError::ConfigIo { .. })
    ));
}
