//! Criterion benchmarks for the per-cycle work of the inference core.
//!
//! At 100 Hz with the literal trigger a full prediction cycle runs once per
//! tick, so append + normalize + feature assembly must stay well under 10 ms.
//!
//! Run with: cargo bench --bench prediction_path

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use edgepulse_core::constants::{FEATURE_VECTOR_LEN, SEQUENCE_LENGTH};
use edgepulse_core::{Normalizer, RollingWindow, Sample};

fn full_window() -> RollingWindow {
    let mut window = RollingWindow::new();
    for i in 0..SEQUENCE_LENGTH {
        let phase = i as f64 * 0.05;
        window.push(Sample::new(1000.0 + 50.0 * phase.sin(), 800.0 + 40.0 * phase.cos()));
    }
    window
}

fn window_push(c: &mut Criterion) {
    let mut window = full_window();
    c.bench_function("window_push_evict", |b| {
        b.iter(|| window.push(black_box(Sample::new(1000.0, 800.0))));
    });
}

fn normalize_and_features(c: &mut Criterion) {
    let window = full_window();
    let mut normalizer = Normalizer::new();
    let mut features = vec![0.0f32; FEATURE_VECTOR_LEN];

    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(SEQUENCE_LENGTH as u64));
    group.bench_function("update_stats", |b| {
        b.iter(|| {
            normalizer.update(black_box(&window)).unwrap();
        });
    });
    group.bench_function("update_and_write_features", |b| {
        b.iter(|| {
            normalizer.update(&window).unwrap();
            normalizer
                .write_features(black_box(&window), &mut features)
                .unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, window_push, normalize_and_features);
criterion_main!(benches);
