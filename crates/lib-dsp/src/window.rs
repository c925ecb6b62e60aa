//! Windowing functions for spectral estimation.
//!
//! Windows are always generated in their symmetric form (the scipy
//! `sym=True` convention): a window of length `n` is centred on sample
//! `(n - 1) / 2` and is not aligned to FFT bins. That is the form lag
//! windows need, where the centre tap multiplies lag zero.
//!
//! Window selection is a capability: estimators ask a [`WindowResolver`] to
//! turn a [`WindowSpec`] into coefficients, so callers can plug in their own
//! window families without touching the estimator.

use crate::error::{DspError, DspResult};
use std::f64::consts::PI;

/// Window function specification.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum WindowSpec {
    /// No windowing (rectangular window).
    #[default]
    Boxcar,

    /// Triangular window without zero end points.
    Triang,

    /// Bartlett window: triangular with zero end points.
    Bartlett,

    /// Hann (raised cosine) window.
    Hann,

    /// Hamming window.
    Hamming,

    /// Blackman window.
    Blackman,

    /// Kaiser window with shape parameter `beta`.
    Kaiser { beta: f64 },

    /// Gaussian window with standard deviation `std` in samples.
    Gaussian { std: f64 },

    /// Tukey (tapered cosine) window; `alpha` is the tapered fraction.
    Tukey { alpha: f64 },
}

impl WindowSpec {
    /// Resolve a scipy-style `(name, parameters)` pair.
    ///
    /// ```
    /// use lib_dsp::window::WindowSpec;
    ///
    /// assert_eq!(WindowSpec::from_name("boxcar", &[]).unwrap(), WindowSpec::Boxcar);
    /// assert_eq!(
    ///     WindowSpec::from_name("kaiser", &[6.0]).unwrap(),
    ///     WindowSpec::Kaiser { beta: 6.0 }
    /// );
    /// ```
    pub fn from_name(name: &str, params: &[f64]) -> DspResult<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let unknown = |reason: &str| DspError::UnknownWindow {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let (spec, arity) = match lowered.as_str() {
            "boxcar" | "rectangular" | "rect" | "ones" => (WindowSpec::Boxcar, 0),
            "triang" | "triangle" => (WindowSpec::Triang, 0),
            "bartlett" => (WindowSpec::Bartlett, 0),
            "hann" | "hanning" => (WindowSpec::Hann, 0),
            "hamming" => (WindowSpec::Hamming, 0),
            "blackman" => (WindowSpec::Blackman, 0),
            "kaiser" => {
                let beta = *params.first().ok_or_else(|| unknown("kaiser requires beta"))?;
                (WindowSpec::Kaiser { beta }, 1)
            }
            "gaussian" => {
                let std = *params.first().ok_or_else(|| unknown("gaussian requires std"))?;
                if std <= 0.0 {
                    return Err(unknown("gaussian std must be positive"));
                }
                (WindowSpec::Gaussian { std }, 1)
            }
            "tukey" => {
                let alpha = params.first().copied().unwrap_or(0.5);
                (WindowSpec::Tukey { alpha }, 1)
            }
            _ => return Err(unknown("not a supported window family")),
        };

        if params.len() > arity {
            return Err(unknown(&format!(
                "expected at most {} parameter(s), got {}",
                arity,
                params.len()
            )));
        }

        Ok(spec)
    }

    /// Name of the window family.
    pub fn name(&self) -> &'static str {
        match self {
            WindowSpec::Boxcar => "boxcar",
            WindowSpec::Triang => "triang",
            WindowSpec::Bartlett => "bartlett",
            WindowSpec::Hann => "hann",
            WindowSpec::Hamming => "hamming",
            WindowSpec::Blackman => "blackman",
            WindowSpec::Kaiser { .. } => "kaiser",
            WindowSpec::Gaussian { .. } => "gaussian",
            WindowSpec::Tukey { .. } => "tukey",
        }
    }
}

/// Turns a window specification into coefficients.
pub trait WindowResolver {
    /// Symmetric window coefficients of length `length`.
    fn resolve(&self, spec: &WindowSpec, length: usize) -> DspResult<Vec<f64>>;
}

/// Resolver backed by [`generate_window`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardWindows;

impl WindowResolver for StandardWindows {
    fn resolve(&self, spec: &WindowSpec, length: usize) -> DspResult<Vec<f64>> {
        Ok(generate_window(spec, length))
    }
}

/// Compute the zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Sums the power series `sum_k ((x/2)^k / k!)^2` until terms stop
/// contributing at double precision.
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    loop {
        term *= (half / k) * (half / k);
        sum += term;
        if term < sum * f64::EPSILON {
            break;
        }
        k += 1.0;
    }
    sum
}

/// Generate symmetric window coefficients for a given window spec and length.
///
/// # Arguments
///
/// * `spec` - Window family and parameters
/// * `length` - Number of points in the window
///
/// # Returns
///
/// Vector of window coefficients, length `length`.
pub fn generate_window(spec: &WindowSpec, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let n = length as f64;
    let center = (n - 1.0) / 2.0;

    let cosine = |a: &[f64]| -> Vec<f64> {
        (0..length)
            .map(|i| {
                let x = 2.0 * PI * i as f64 / (n - 1.0);
                a.iter()
                    .enumerate()
                    .map(|(k, &ak)| {
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * ak * (k as f64 * x).cos()
                    })
                    .sum()
            })
            .collect()
    };

    match *spec {
        WindowSpec::Boxcar => vec![1.0; length],

        WindowSpec::Triang => {
            let half_width = if length % 2 == 0 { n / 2.0 } else { (n + 1.0) / 2.0 };
            (0..length)
                .map(|i| 1.0 - (i as f64 - center).abs() / half_width)
                .collect()
        }

        WindowSpec::Bartlett => (0..length)
            .map(|i| 1.0 - (i as f64 - center).abs() / center)
            .collect(),

        WindowSpec::Hann => cosine(&[0.5, 0.5]),

        WindowSpec::Hamming => cosine(&[0.54, 0.46]),

        WindowSpec::Blackman => cosine(&[0.42, 0.5, 0.08]),

        WindowSpec::Kaiser { beta } => {
            let denom = bessel_i0(beta);
            (0..length)
                .map(|i| {
                    let x = (i as f64 - center) / center; // Range [-1, 1]
                    bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / denom
                })
                .collect()
        }

        WindowSpec::Gaussian { std } => (0..length)
            .map(|i| {
                let x = (i as f64 - center) / std;
                (-0.5 * x * x).exp()
            })
            .collect(),

        WindowSpec::Tukey { alpha } => {
            if alpha <= 0.0 {
                return vec![1.0; length];
            }
            if alpha >= 1.0 {
                return generate_window(&WindowSpec::Hann, length);
            }
            let taper = alpha * (n - 1.0);
            let width = (taper / 2.0).floor() as usize;
            (0..length)
                .map(|i| {
                    let t = i as f64;
                    if i <= width {
                        0.5 * (1.0 + (PI * (-1.0 + 2.0 * t / taper)).cos())
                    } else if i + width + 2 > length {
                        0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * t / taper)).cos())
                    } else {
                        1.0
                    }
                })
                .collect()
        }
    }
}
