//! Regression micro-benchmark.
//!
//! Measures the two fits run at the end of each drive test, on series the
//! size of a 50 Hz ramp (≈680 samples) and a 200 Hz ramp (≈2700 samples).

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use drivetune::regression::{fit_accel, fit_ramp, numerical_derivative};
use drivetune_common::series::{RampResult, SampleSeries};

const KV: f64 = 0.03;
const K_STATIC: f64 = 0.05;
const KA: f64 = 0.004;

/// Quasi-static ramp trace: power = kV·v + kStatic with v rising linearly.
fn ramp_series(samples: usize, dt: f64) -> SampleSeries {
    let accel = 1.08;
    let mut series = SampleSeries::with_capacity(samples);
    for i in 0..samples {
        let t = i as f64 * dt;
        let v = accel * t;
        series.push(t, 0.5 * accel * t * t, KV * v + K_STATIC);
    }
    series
}

/// Step response of the first-order plant at constant power.
fn constant_power_series(samples: usize, dt: f64) -> SampleSeries {
    let power = 0.7;
    let tau = KA / KV;
    let v_inf = (power - K_STATIC) / KV;
    let mut series = SampleSeries::with_capacity(samples);
    for i in 0..samples {
        let t = i as f64 * dt;
        let x = v_inf * (t - tau * (1.0 - (-t / tau).exp()));
        series.push(t, x, power);
    }
    series
}

fn bench_fit_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_ramp");
    for (samples, dt) in [(680, 0.02), (2720, 0.005)] {
        let series = ramp_series(samples, dt);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &series, |b, s| {
            b.iter(|| fit_ramp(s, true))
        });
    }
    group.finish();
}

fn bench_fit_accel(c: &mut Criterion) {
    let ramp = RampResult {
        kv: KV,
        k_static: K_STATIC,
        r_square: 1.0,
    };
    let mut group = c.benchmark_group("fit_accel");
    for (samples, dt) in [(238, 0.02), (952, 0.005)] {
        let series = constant_power_series(samples, dt);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &series, |b, s| {
            b.iter(|| fit_accel(s, ramp))
        });
    }
    group.finish();
}

fn bench_derivative(c: &mut Criterion) {
    let series = ramp_series(2720, 0.005);
    c.bench_function("numerical_derivative_2720", |b| {
        b.iter(|| numerical_derivative(series.times(), series.positions()))
    });
}

criterion_group!(benches, bench_fit_ramp, bench_fit_accel, bench_derivative);
criterion_main!(benches);
