//! Property tests for window length, allocator accounting and normalization

use edgepulse_core::{
    DeviceError, MemoryAllocator, Normalizer, RegionKind, RollingWindow, Sample,
};
use proptest::prelude::*;

fn sample_strategy() -> impl Strategy<Value = Sample> {
    (0.0f64..2000.0, 0.0f64..1600.0).prop_map(|(ir, red)| Sample::new(ir, red))
}

fn region_strategy() -> impl Strategy<Value = RegionKind> {
    prop_oneof![Just(RegionKind::Fast), Just(RegionKind::Extended)]
}

proptest! {
    #[test]
    fn window_length_is_min_of_appends_and_capacity(
        samples in prop::collection::vec(sample_strategy(), 0..64)
    ) {
        let mut window = RollingWindow::<16>::new();
        prop_assert_eq!(window.len(), 0);

        for (i, sample) in samples.iter().enumerate() {
            window.push(*sample);
            prop_assert_eq!(window.len(), (i + 1).min(16));
            prop_assert_eq!(window.total_seen(), (i + 1) as u64);
        }
    }

    #[test]
    fn window_keeps_most_recent(
        samples in prop::collection::vec(sample_strategy(), 1..64)
    ) {
        let mut window = RollingWindow::<16>::new();
        for sample in &samples {
            window.push(*sample);
        }

        let start = samples.len().saturating_sub(16);
        let held: Vec<Sample> = window.iter().collect();
        prop_assert_eq!(&held[..], &samples[start..]);
    }

    #[test]
    fn allocation_fails_iff_over_capacity(
        capacity in 1usize..4096,
        first in 0usize..4096,
        second in 0usize..4096,
        region in region_strategy(),
    ) {
        let mut allocator = MemoryAllocator::with_capacities(capacity, capacity);

        let first_ok = allocator.allocate(first, region).is_ok();
        prop_assert_eq!(first_ok, first <= capacity);
        let used = allocator.used(region);
        prop_assert_eq!(used, if first_ok { first } else { 0 });

        match allocator.allocate(second, region) {
            Ok(buf) => {
                prop_assert!(used + second <= capacity);
                prop_assert_eq!(buf.len(), second);
                prop_assert_eq!(allocator.used(region), used + second);
            }
            Err(DeviceError::OutOfMemory { requested, available, .. }) => {
                prop_assert!(used + second > capacity);
                prop_assert_eq!(requested, second);
                prop_assert_eq!(available, capacity - used);
                prop_assert_eq!(allocator.used(region), used);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn normalized_features_are_always_finite(
        samples in prop::collection::vec(sample_strategy(), 1..32)
    ) {
        let mut window = RollingWindow::<32>::new();
        for sample in &samples {
            window.push(*sample);
        }

        let mut normalizer = Normalizer::new();
        normalizer.update(&window).unwrap();
        let mut features = vec![0.0f32; window.len() * 2];
        normalizer.write_features(&window, &mut features).unwrap();

        prop_assert!(features.iter().all(|f| f.is_finite()));
    }
}

#[test]
fn constant_window_normalizes_to_zeros() {
    let mut window: RollingWindow = RollingWindow::new();
    for _ in 0..1500 {
        window.push(Sample::new(1000.0, 800.0));
    }

    let mut normalizer = Normalizer::new();
    let stats = *normalizer.update(&window).unwrap();
    assert_eq!(stats.std_ir, 1.0);
    assert_eq!(stats.std_red, 1.0);

    let mut features = vec![1.0f32; 3000];
    normalizer.write_features(&window, &mut features).unwrap();
    assert!(features.iter().all(|&f| f == 0.0));
}

#[test]
fn capacity_minus_one_then_two() {
    for region in [RegionKind::Fast, RegionKind::Extended] {
        let mut allocator = MemoryAllocator::new();
        let capacity = allocator.capacity(region);

        allocator.allocate(capacity - 1, region).unwrap();
        let err = allocator.allocate(2, region).unwrap_err();

        assert!(matches!(err, DeviceError::OutOfMemory { .. }));
        assert_eq!(allocator.used(region), capacity - 1);
    }
}
