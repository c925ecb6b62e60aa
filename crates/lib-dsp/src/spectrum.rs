//! DFT-based spectrum estimation.
//!
//! The spectrum of a finite signal is evaluated on a power-of-two grid,
//! optionally oversampled by zero-padding, and returned in ascending
//! frequency order. A time origin `n0` re-references the phase so that
//! sample `x[n0]` sits at `t = 0`; for a signal that is even about `n0`
//! the returned spectrum is then real.

use crate::error::{DspError, DspResult};
use crate::fft::{fftfreq, fftshift, nextpow2, FftEngine};
use lib_types::Series;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Parameters for [`spectrum`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrumOptions {
    /// Sample index treated as time zero. May be fractional.
    pub n0: f64,

    /// Time between samples.
    pub sample_period: f64,

    /// Oversampling exponent: the grid is `2^(oversample - 1)` times denser
    /// than `nextpow2(len(x))`. Must be at least 1.
    pub oversample: u32,

    /// Keep only non-negative frequencies (real input only).
    pub only_positive: bool,
}

impl Default for SpectrumOptions {
    fn default() -> Self {
        Self {
            n0: 0.0,
            sample_period: 1.0,
            oversample: 1,
            only_positive: true,
        }
    }
}

impl SpectrumOptions {
    /// Options that take the sample period and time origin from `series`.
    ///
    /// The origin is the (possibly fractional) sample index of `t = 0`.
    pub fn for_series(series: &Series, oversample: u32, only_positive: bool) -> Self {
        Self {
            n0: series.origin_index(),
            sample_period: series.dt.0,
            oversample,
            only_positive,
        }
    }
}

/// Spectrum values with their frequencies, in ascending frequency order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    /// Complex amplitude per frequency bin.
    pub values: Vec<Complex64>,

    /// Bin frequencies (non-decreasing).
    pub frequencies: Vec<f64>,
}

impl Spectrum {
    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no bins were produced.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Magnitude of each bin.
    pub fn magnitude(&self) -> Vec<f64> {
        self.values.iter().map(|c| c.norm()).collect()
    }

    /// Euclidean norm of the imaginary parts.
    pub fn imag_norm(&self) -> f64 {
        self.values.iter().map(|c| c.im * c.im).sum::<f64>().sqrt()
    }
}

/// FFT size used by [`spectrum`] for a signal of `len` samples.
pub fn spectrum_size(len: usize, oversample: u32) -> DspResult<usize> {
    if oversample == 0 {
        return Err(DspError::invalid(
            "oversample",
            "must be a positive integer",
        ));
    }
    let base = nextpow2(len)?;
    1usize
        .checked_shl(oversample - 1)
        .and_then(|factor| base.checked_mul(factor))
        .ok_or_else(|| DspError::invalid("oversample", format!("{} overflows the FFT size", oversample)))
}

/// Spectrum of a complex signal.
///
/// The raw DFT is scaled by the sample period, phase corrected for `n0`
/// in natural bin order, then shifted to ascending frequency. With
/// `only_positive` the non-negative half is returned, which is only
/// defined for real-valued input.
pub fn spectrum(x: &[Complex64], opts: &SpectrumOptions) -> DspResult<Spectrum> {
    if opts.only_positive && x.iter().any(|c| c.im != 0.0) {
        return Err(DspError::ComplexOneSided);
    }

    let n = spectrum_size(x.len(), opts.oversample)?;
    tracing::debug!(
        "spectrum: len={}, fft size={}, oversample={}",
        x.len(),
        n,
        opts.oversample
    );

    let mut engine = FftEngine::new();
    let mut values = engine.fft_n(x, n)?;
    for v in values.iter_mut() {
        *v *= opts.sample_period;
    }

    if opts.n0 != 0.0 {
        apply_time_origin(&mut values, opts.n0);
    }

    let mut values = fftshift(&values);
    let mut frequencies = fftshift(&fftfreq(n, opts.sample_period));

    if opts.only_positive {
        let first = frequencies.iter().position(|&f| f >= 0.0).unwrap_or(n);
        values.drain(..first);
        frequencies.drain(..first);
    }

    Ok(Spectrum { values, frequencies })
}

/// Spectrum of a real signal. See [`spectrum`].
pub fn spectrum_real(x: &[f64], opts: &SpectrumOptions) -> DspResult<Spectrum> {
    let complex: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    spectrum(&complex, opts)
}

/// Spectrum of a labeled series, referenced to its `t = 0`.
pub fn spectrum_series(
    series: &Series,
    oversample: u32,
    only_positive: bool,
) -> DspResult<Spectrum> {
    let opts = SpectrumOptions::for_series(series, oversample, only_positive);
    spectrum_real(&series.samples, &opts)
}

/// Multiply natural-order bins by `exp(+j 2 pi k' n0 / N)`, where `k'` is the
/// signed bin index, so that `x[n0]` becomes the time origin.
///
/// For integer `n0` the signed and unsigned bin indices give identical
/// ramps; the signed form keeps fractional origins correct on the
/// negative-frequency half.
fn apply_time_origin(values: &mut [Complex64], n0: f64) {
    let n = values.len();
    let split = n.div_ceil(2);
    for (k, v) in values.iter_mut().enumerate() {
        let signed = if k < split { k as f64 } else { k as f64 - n as f64 };
        *v *= Complex64::from_polar(1.0, 2.0 * PI * signed * n0 / n as f64);
    }
}

/// Rectangular pulse of width `a` sampled at times `t`.
///
/// 1 inside `|t| < a/2`, 1/2 on the edges, 0 outside.
pub fn rect(t: &[f64], a: f64) -> Vec<f64> {
    let half = a / 2.0;
    t.iter()
        .map(|&ti| {
            let abs = ti.abs();
            if abs < half {
                1.0
            } else if abs == half {
                0.5
            } else {
                0.0
            }
        })
        .collect()
}
