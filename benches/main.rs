use criterion::{black_box, criterion_group, criterion_main, Criterion};
use micro_pitch_tracker::iir::{FilterType, IirFilter};
use micro_pitch_tracker::mpm::{MpmEstimator, MpmPitchResult};
use micro_pitch_tracker::tracker::{EstimatorConfig, PeriodicityEstimator};
use micro_pitch_tracker::PitchTracker;

fn sine(sample_rate: f32, frequency: f32, sample_count: usize) -> Vec<f32> {
    (0..sample_count)
        .map(|i| 0.5 * (2.0 * core::f32::consts::PI * frequency * (i as f32) / sample_rate).sin())
        .collect()
}

fn run_result_benchmark(id: &str, c: &mut Criterion, window_size: usize, lag_count: usize) {
    let mut result = MpmPitchResult::new(window_size, lag_count);
    c.bench_function(id, |b| {
        b.iter(|| {
            result.compute(black_box(11025.0));
        })
    });
}

fn result_benchmarks(c: &mut Criterion) {
    run_result_benchmark("Window 256, lag 128", c, 256, 128);
    run_result_benchmark("Window 512, lag 256", c, 512, 256);
    run_result_benchmark("Window 512, lag 512", c, 512, 512);
    run_result_benchmark("Window 1024, lag 512", c, 1024, 512);
}

fn estimator_benchmarks(c: &mut Criterion) {
    let mut estimator = MpmEstimator::from_config(&EstimatorConfig {
        sample_rate: 44100.0,
        min_frequency: 50.0,
        max_frequency: 1600.0,
        detect_level_threshold: 0.01,
        window_size: 1780,
        crossover_frequency: 280.0,
    });
    let lo = sine(44100.0, 147.0, 1780);
    let hi = sine(44100.0, 587.0, 1780);
    c.bench_function("Estimator, lo band tone", |b| {
        b.iter(|| estimator.estimate(black_box(&lo), black_box(&lo)))
    });
    c.bench_function("Estimator, hi band tone", |b| {
        b.iter(|| estimator.estimate(black_box(&hi), black_box(&hi)))
    });
}

fn filter_benchmarks(c: &mut Criterion) {
    let mut filter = IirFilter::new(FilterType::LowPass, 5, 44100.0, 1500.0);
    let mut block = sine(44100.0, 440.0, 512);
    c.bench_function("Order 5 low pass, block 512", |b| {
        b.iter(|| filter.process_in_place(black_box(&mut block)))
    });
}

fn run_tracker_benchmark(id: &str, c: &mut Criterion, block_size: usize) {
    let mut tracker = PitchTracker::new(44100.0);
    let input = sine(44100.0, 220.0, 44100);
    c.bench_function(id, |b| {
        b.iter(|| {
            for block in input.chunks(block_size) {
                tracker.process(black_box(block), |_| {});
            }
        })
    });
}

fn tracker_benchmarks(c: &mut Criterion) {
    run_tracker_benchmark("Tracker, 1 s, block 64", c, 64);
    run_tracker_benchmark("Tracker, 1 s, block 512", c, 512);
    run_tracker_benchmark("Tracker, 1 s, block 4096", c, 4096);
}

criterion_group!(benches, tracker_benchmarks, estimator_benchmarks, filter_benchmarks, result_benchmarks);
criterion_main!(benches);
