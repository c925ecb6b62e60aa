//! Linear-phase FIR classification and delay-compensated filtering.
//!
//! A linear-phase FIR filter with `K = M + 1` taps delays every frequency by
//! the same `M/2` samples. [`lp_fir_filter`] convolves with the impulse
//! response through the FFT and then removes that delay so the output lines
//! up with the input. Types 2 and 4 (odd `M`) have a half-sample delay of
//! which only the integer part can be removed.

use crate::error::{DspError, DspResult};
use crate::fft::{nextpow2, FftEngine};
use lib_types::{Seconds, Series};
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

/// Relative tolerance of the symmetry test (numpy `isclose` default).
const SYMMETRY_RTOL: f64 = 1e-5;

/// Absolute tolerance of the symmetry test (numpy `isclose` default).
const SYMMETRY_ATOL: f64 = 1e-8;

/// Linear-phase classification of an FIR impulse response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinearPhase {
    /// Even order, symmetric.
    Type1,
    /// Odd order, symmetric.
    Type2,
    /// Even order, antisymmetric.
    Type3,
    /// Odd order, antisymmetric.
    Type4,
    /// Neither symmetric nor antisymmetric.
    NotLinearPhase,
}

impl LinearPhase {
    /// Conventional type number, `None` when not linear phase.
    pub fn number(self) -> Option<u8> {
        match self {
            LinearPhase::Type1 => Some(1),
            LinearPhase::Type2 => Some(2),
            LinearPhase::Type3 => Some(3),
            LinearPhase::Type4 => Some(4),
            LinearPhase::NotLinearPhase => None,
        }
    }

    /// Whether the group delay is a whole number of samples.
    pub fn has_integer_delay(self) -> bool {
        matches!(self, LinearPhase::Type1 | LinearPhase::Type3)
    }
}

impl fmt::Display for LinearPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(n) => write!(f, "type {}", n),
            None => write!(f, "not linear phase"),
        }
    }
}

#[inline]
fn isclose(a: f64, b: f64) -> bool {
    (a - b).abs() <= SYMMETRY_ATOL + SYMMETRY_RTOL * b.abs()
}

/// Classify `h` by the parity of its order and its symmetry about the midpoint.
pub fn lp_fir_type(h: &[f64]) -> LinearPhase {
    if h.is_empty() {
        return LinearPhase::NotLinearPhase;
    }

    let m = h.len() - 1;
    let symmetric = (0..=m).all(|n| isclose(h[n], h[m - n]));
    let antisymmetric = || (0..=m).all(|n| isclose(h[n], -h[m - n]));

    match (m % 2 == 0, symmetric) {
        (true, true) => LinearPhase::Type1,
        (false, true) => LinearPhase::Type2,
        (true, false) if antisymmetric() => LinearPhase::Type3,
        (false, false) if antisymmetric() => LinearPhase::Type4,
        _ => LinearPhase::NotLinearPhase,
    }
}

/// Portion of the full convolution returned by the filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvolutionMode {
    /// Same length as the input, delay compensated.
    #[default]
    Same,
    /// Only samples where the filter and input fully overlap.
    Valid,
    /// The entire `len(h) + len(x) - 1` sample convolution.
    Full,
}

impl FromStr for ConvolutionMode {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "same" => Ok(ConvolutionMode::Same),
            "valid" => Ok(ConvolutionMode::Valid),
            "full" => Ok(ConvolutionMode::Full),
            _ => Err(DspError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for ConvolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConvolutionMode::Same => "same",
            ConvolutionMode::Valid => "valid",
            ConvolutionMode::Full => "full",
        };
        f.write_str(name)
    }
}

/// Filtered samples with their companion index labels.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOutput<T> {
    /// Filter output for the requested mode.
    pub samples: Vec<T>,

    /// Labels aligned with `samples`, present when an index was supplied.
    pub index: Option<Vec<f64>>,

    /// Classification of the impulse response that produced the output.
    pub linear_phase: LinearPhase,
}

impl FilterOutput<Complex64> {
    /// Keep only the real part of each sample.
    pub fn into_real(self) -> FilterOutput<f64> {
        FilterOutput {
            samples: self.samples.into_iter().map(|c| c.re).collect(),
            index: self.index,
            linear_phase: self.linear_phase,
        }
    }
}

/// Apply the linear-phase FIR filter `h` to the real signal `x`, returning
/// the real part of the delay-compensated output.
///
/// See [`lp_fir_filter_complex`] for the mode and index semantics.
pub fn lp_fir_filter(
    h: &[f64],
    x: &[f64],
    mode: ConvolutionMode,
    index: Option<&[f64]>,
) -> DspResult<FilterOutput<f64>> {
    let complex: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    Ok(lp_fir_filter_complex(h, &complex, mode, index)?.into_real())
}

/// Apply the linear-phase FIR filter `h` to `x` and compensate for its
/// constant group delay.
///
/// With `K = len(h)`, `N = len(x)`, `M = K - 1` and `J = floor(M/2)`:
///
/// - `Same`: `N` samples starting at `J` of the full convolution.
/// - `Valid`: samples `min(K, N) - 1 .. max(K, N)` of the full convolution.
/// - `Full`: all `N + M` samples.
///
/// Sample `i` of the full convolution lines up with input sample `i - J`,
/// and the output `index` is read from the same positions. Positions before
/// or after the supplied labels are synthesized at the spacing of the first
/// two labels, so `Full` gains `J` labels in front and `M - J` behind.
///
/// # Errors
///
/// - [`DspError::NotLinearPhase`] if `h` is neither symmetric nor antisymmetric
/// - [`DspError::InsufficientData`] for an empty `h` or `x`, or when labels
///   must be synthesized from fewer than two
/// - [`DspError::LengthMismatch`] if `index` is not parallel to `x`
pub fn lp_fir_filter_complex(
    h: &[f64],
    x: &[Complex64],
    mode: ConvolutionMode,
    index: Option<&[f64]>,
) -> DspResult<FilterOutput<Complex64>> {
    if h.is_empty() || x.is_empty() {
        return Err(DspError::InsufficientData {
            needed: 1,
            got: h.len().min(x.len()),
        });
    }
    if let Some(index) = index {
        if index.len() != x.len() {
            return Err(DspError::LengthMismatch {
                expected: x.len(),
                actual: index.len(),
            });
        }
    }

    let linear_phase = lp_fir_type(h);
    match linear_phase {
        LinearPhase::NotLinearPhase => return Err(DspError::NotLinearPhase),
        LinearPhase::Type2 | LinearPhase::Type4 => {
            tracing::warn!(
                "linear phase FIR filter is {} --- cannot compensate for half sample delay (compensating for integer portion only)",
                linear_phase
            );
        }
        LinearPhase::Type1 | LinearPhase::Type3 => {}
    }

    let full = fft_convolve(h, x)?;

    let k = h.len();
    let n = x.len();
    let m = k - 1;
    let delay = m / 2;

    let (start, len) = match mode {
        ConvolutionMode::Same => (delay, n),
        ConvolutionMode::Valid => {
            let d_min = k.min(n);
            let d_max = k.max(n);
            (d_min - 1, d_max - d_min + 1)
        }
        ConvolutionMode::Full => (0, full.len()),
    };

    tracing::debug!(
        "lp_fir_filter: taps={}, samples={}, mode={}, delay={}, output={}",
        k,
        n,
        mode,
        delay,
        len
    );

    let samples = full[start..start + len].to_vec();
    let index = index
        .map(|labels| aligned_labels(labels, start as isize - delay as isize, len))
        .transpose()?;

    Ok(FilterOutput {
        samples,
        index,
        linear_phase,
    })
}

/// Filter a labeled series, carrying its time labels through the mode.
///
/// The output starts at the label of its first sample and keeps the input
/// period.
pub fn lp_fir_filter_series(
    h: &[f64],
    series: &Series,
    mode: ConvolutionMode,
) -> DspResult<(Series, LinearPhase)> {
    let labels = series.index_labels();
    let out = lp_fir_filter(h, &series.samples, mode, Some(&labels))?;
    let t_start = out
        .index
        .as_ref()
        .and_then(|index| index.first().copied())
        .unwrap_or(series.t_start.0);

    Ok((
        Series {
            samples: out.samples,
            dt: series.dt,
            t_start: Seconds(t_start),
        },
        out.linear_phase,
    ))
}

/// Full linear convolution of `h` and `x` through a power-of-two FFT.
fn fft_convolve(h: &[f64], x: &[Complex64]) -> DspResult<Vec<Complex64>> {
    let output_len = h.len() + x.len() - 1;
    let fft_size = nextpow2(output_len)?;

    let mut engine = FftEngine::new();
    let h_fft = engine.fft_real_n(h, fft_size)?;
    let mut x_fft = engine.fft_n(x, fft_size)?;

    // Multiply
    for (s, k) in x_fft.iter_mut().zip(h_fft.iter()) {
        *s *= *k;
    }

    engine.ifft_inplace(&mut x_fft)?;
    x_fft.truncate(output_len);
    Ok(x_fft)
}

/// `len` labels starting at input position `first` (may be negative or run
/// past the end), extrapolating at the spacing of the first two labels.
fn aligned_labels(labels: &[f64], first: isize, len: usize) -> DspResult<Vec<f64>> {
    let count = labels.len() as isize;
    let last = first + len as isize - 1;
    let in_range = first >= 0 && last < count;

    if in_range {
        let start = first as usize;
        return Ok(labels[start..start + len].to_vec());
    }

    if labels.len() < 2 {
        return Err(DspError::InsufficientData {
            needed: 2,
            got: labels.len(),
        });
    }

    let step = labels[1] - labels[0];
    let head = labels[0];
    let tail = labels[labels.len() - 1];

    Ok((first..=last)
        .map(|p| {
            if p < 0 {
                head + p as f64 * step
            } else if p >= count {
                tail + (p - count + 1) as f64 * step
            } else {
                labels[p as usize]
            }
        })
        .collect())
}
