//! Spectrum and filtering walkthrough.
//!
//! This example demonstrates:
//! 1. The spectrum of a sampled cosine, referenced to its centre sample
//! 2. The spectrum of a rectangular pulse against its analytic sinc
//! 3. Low-pass filtering a two-tone signal and reporting the filter response

use lib_dsp::window::generate_window;
use lib_dsp::{
    fir_response, lp_fir_filter, rect, spectrum_real, BandSpec, ConvolutionMode, SpectrumOptions,
    WindowSpec,
};
use std::f64::consts::PI;

fn main() -> anyhow::Result<()> {
    println!("=== magspec spectrum example ===\n");

    let dt = 1e-2;
    let t: Vec<f64> = (-100..=100).map(|i| i as f64 * dt).collect();
    let n0 = (t.len() - 1) as f64 / 2.0;

    // Cosine at 5 Hz, sampled symmetrically about t = 0
    let x: Vec<f64> = t.iter().map(|&ti| (2.0 * PI * 5.0 * ti).cos()).collect();
    let opts = SpectrumOptions {
        n0,
        sample_period: dt,
        oversample: 4,
        only_positive: true,
    };
    let spec = spectrum_real(&x, &opts)?;
    let (peak_bin, peak) = spec
        .magnitude()
        .into_iter()
        .enumerate()
        .fold((0, 0.0), |best, (i, m)| if m > best.1 { (i, m) } else { best });

    println!("Cosine spectrum:");
    println!("  {} bins, df = {:.4} Hz", spec.len(), spec.frequencies[1]);
    println!("  Peak |X| = {:.4} at {:.3} Hz", peak, spec.frequencies[peak_bin]);
    println!("  Imaginary norm: {:.3e}", spec.imag_norm());

    // Rect pulse of width 1 s; X(f) = sinc(f)
    let a = 1.0;
    let pulse = rect(&t, a);
    let spec = spectrum_real(&pulse, &SpectrumOptions { oversample: 1, ..opts })?;
    println!("\nRect spectrum (width {} s):", a);
    for (f, value) in spec.frequencies.iter().zip(spec.values.iter()).step_by(16).take(6) {
        let analytic = if *f == 0.0 { a } else { (PI * f * a).sin() / (PI * f) };
        println!("  f = {:7.3} Hz  X = {:+.5}  sinc = {:+.5}", f, value.re, analytic);
    }

    // Two tones through a 61-tap Kaiser low-pass
    println!("\nLow-pass filtering:");
    let taps = 61;
    let cutoff = 0.2;
    let window = generate_window(&WindowSpec::Kaiser { beta: 6.0 }, taps);
    let center = (taps - 1) as f64 / 2.0;
    let mut h: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let k = i as f64 - center;
            let sinc = if k == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * PI * cutoff * k).sin() / (PI * k)
            };
            sinc * w
        })
        .collect();
    let dc: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= dc);

    let signal: Vec<f64> = (0..512)
        .map(|i| {
            let n = i as f64;
            (2.0 * PI * 0.05 * n).sin() + (2.0 * PI * 0.35 * n).sin()
        })
        .collect();
    let filtered = lp_fir_filter(&h, &signal, ConvolutionMode::Same, None)?;
    println!(
        "  {} taps ({}), {} output samples",
        taps,
        filtered.linear_phase,
        filtered.samples.len()
    );

    let bands = BandSpec::new(vec![0.0, 0.15, 0.25, 0.5], vec![1.0, 0.0])?;
    let names = vec!["pass".to_string(), "stop".to_string()];
    println!();
    fir_response(&h, &bands, 1.0, Some(&names), true)?;

    Ok(())
}
