//! Spectral estimation and filtering benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_dsp::{
    blackman_tukey, lp_fir_filter, spectrum_real, BlackmanTukeyOptions, ConvolutionMode,
    SpectrumOptions, WindowSpec,
};

fn signal(len: usize) -> Vec<f64> {
    (0..len).map(|i| (i as f64 * 0.01).sin()).collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp_fir_filter");
    let kernel: Vec<f64> = (0..129)
        .map(|i| (-((i as f64 - 64.0) / 16.0).powi(2)).exp())
        .collect();

    for signal_len in [1024, 4096, 16384, 65536].iter() {
        let x = signal(*signal_len);
        group.bench_with_input(BenchmarkId::new("same", signal_len), &x, |b, x| {
            b.iter(|| lp_fir_filter(black_box(&kernel), black_box(x), ConvolutionMode::Same, None));
        });
    }

    group.finish();
}

fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectrum");

    for oversample in [1u32, 2, 4].iter() {
        let x = signal(10_000);
        let opts = SpectrumOptions {
            n0: 5000.0,
            oversample: *oversample,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("oversample", oversample), &x, |b, x| {
            b.iter(|| spectrum_real(black_box(x), &opts));
        });
    }

    group.finish();
}

fn bench_blackman_tukey(c: &mut Criterion) {
    let mut group = c.benchmark_group("blackman_tukey");
    let x = signal(16384);
    let opts = BlackmanTukeyOptions {
        window: WindowSpec::Hann,
        ..Default::default()
    };

    for lags in [64, 256, 1024].iter() {
        group.bench_with_input(BenchmarkId::new("lags", lags), lags, |b, &m| {
            b.iter(|| blackman_tukey(black_box(&x), m, 4096, None, &opts));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_spectrum, bench_blackman_tukey);
criterion_main!(benches);
