//! FFT/IFFT operations using rustfft.
//!
//! This module provides a thin wrapper around rustfft and realfft with:
//! - Zero-padded transforms at a caller-chosen size (numpy `n=` semantics)
//! - Real-to-complex transforms for one-sided responses
//! - Power-of-two sizing and frequency-bin helpers (`fftfreq`, `fftshift`)

use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

/// Smallest power of two greater than or equal to `n`.
///
/// Fails for `n == 0`, where no such power exists in the FFT sense, and
/// when the result would overflow `usize`.
pub fn nextpow2(n: usize) -> DspResult<usize> {
    if n == 0 {
        return Err(DspError::Domain("nextpow2 requires N >= 1".into()));
    }
    n.checked_next_power_of_two()
        .ok_or_else(|| DspError::Domain(format!("nextpow2({}) overflows usize", n)))
}

/// FFT engine holding one planner per call site.
///
/// An engine is cheap to build; every public routine in this crate creates
/// its own so that no planner state is shared between calls.
pub struct FftEngine {
    /// Complex FFT planner.
    complex_planner: FftPlanner<f64>,

    /// Real FFT planner.
    real_planner: RealFftPlanner<f64>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            complex_planner: FftPlanner::new(),
            real_planner: RealFftPlanner::new(),
        }
    }

    /// Perform forward FFT on complex data in-place.
    pub fn fft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        let len = data.len();
        if len == 0 {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let fft = self.complex_planner.plan_fft_forward(len);
        fft.process(data);
        Ok(())
    }

    /// Perform inverse FFT on complex data in-place.
    pub fn ifft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        let len = data.len();
        if len == 0 {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let fft = self.complex_planner.plan_fft_inverse(len);
        fft.process(data);

        // Normalize
        let scale = 1.0 / len as f64;
        for x in data.iter_mut() {
            *x *= scale;
        }

        Ok(())
    }

    /// Forward FFT of `data` evaluated at `n` points.
    ///
    /// Shorter input is zero-padded, longer input is truncated.
    pub fn fft_n(&mut self, data: &[Complex64], n: usize) -> DspResult<Vec<Complex64>> {
        let mut buf = zero_pad(data, n);
        buf.truncate(n);
        self.fft_inplace(&mut buf)?;
        Ok(buf)
    }

    /// Forward FFT of real `data` evaluated at `n` points (full two-sided output).
    pub fn fft_real_n(&mut self, data: &[f64], n: usize) -> DspResult<Vec<Complex64>> {
        let complex: Vec<Complex64> = data.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.fft_n(&complex, n)
    }

    /// Inverse FFT of complex data, returning new buffer.
    pub fn ifft(&mut self, data: &[Complex64]) -> DspResult<Vec<Complex64>> {
        let mut result = data.to_vec();
        self.ifft_inplace(&mut result)?;
        Ok(result)
    }

    /// Forward real-to-complex FFT evaluated at `n` points.
    ///
    /// Input: real samples, zero-padded or truncated to `n`
    /// Output: n/2 + 1 complex samples (Hermitian symmetry exploited)
    pub fn rfft_n(&mut self, data: &[f64], n: usize) -> DspResult<Vec<Complex64>> {
        if n == 0 {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let r2c = self.real_planner.plan_fft_forward(n);
        let mut input = r2c.make_input_vec();
        let copied = n.min(data.len());
        input[..copied].copy_from_slice(&data[..copied]);
        let mut output = r2c.make_output_vec();

        r2c.process(&mut input, &mut output)
            .map_err(|e| DspError::NumericalInstability(e.to_string()))?;

        Ok(output)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample frequencies of an `n`-point DFT in natural bin order.
///
/// Matches `numpy.fft.fftfreq`: `[0, 1, ..., ceil(n/2)-1, -floor(n/2), ..., -1] / (n*d)`.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * d);
    let split = n.div_ceil(2);
    (0..n)
        .map(|k| {
            if k < split {
                k as f64 * scale
            } else {
                (k as f64 - n as f64) * scale
            }
        })
        .collect()
}

/// Sample frequencies of the one-sided `n`-point real DFT: `k / (n*d)` for `k = 0..=n/2`.
pub fn rfftfreq(n: usize, d: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * d);
    (0..=n / 2).map(|k| k as f64 * scale).collect()
}

/// Reorder natural-order DFT bins so the zero-frequency bin sits in the middle.
pub fn fftshift<T: Clone>(data: &[T]) -> Vec<T> {
    let mut out = data.to_vec();
    out.rotate_right(data.len() / 2);
    out
}

/// Inverse of [`fftshift`].
pub fn ifftshift<T: Clone>(data: &[T]) -> Vec<T> {
    let mut out = data.to_vec();
    out.rotate_left(data.len() / 2);
    out
}

/// Zero-pad a signal to a specific length.
pub fn zero_pad<T: Clone + Default>(signal: &[T], new_len: usize) -> Vec<T> {
    let mut result = signal.to_vec();
    if new_len > signal.len() {
        result.resize(new_len, T::default());
    }
    result
}
