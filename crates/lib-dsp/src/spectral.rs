//! Blackman-Tukey and periodogram spectral density estimates.
//!
//! The cross-correlation of the inputs is truncated to lags `-M..=M`, tapered
//! by a lag window and transformed at `L` points. Truncating the high lags,
//! whose estimates rest on few products, trades resolution for variance.
//! The periodogram is the untruncated, untapered case `M = N - 1`.

use crate::error::{DspError, DspResult};
use crate::fft::{fftfreq, nextpow2, FftEngine};
use crate::window::{StandardWindows, WindowResolver, WindowSpec};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Parameters for [`blackman_tukey`].
#[derive(Clone, Debug, PartialEq)]
pub struct BlackmanTukeyOptions {
    /// Lag window applied to the truncated correlation.
    pub window: WindowSpec,

    /// Time between samples.
    pub d: f64,

    /// Also return the truncated correlation and window coefficients.
    pub full: bool,
}

impl Default for BlackmanTukeyOptions {
    fn default() -> Self {
        Self {
            window: WindowSpec::Boxcar,
            d: 1.0,
            full: false,
        }
    }
}

/// Spectral density estimate on an `L`-point grid.
#[derive(Clone, Debug, PartialEq)]
pub struct BlackmanTukey {
    /// Estimate per frequency bin, natural FFT order.
    pub spectrum: Vec<Complex64>,

    /// Bin frequencies, natural FFT order (`fftfreq(L, d)`).
    pub frequencies: Vec<f64>,

    /// Unwindowed correlation at lags `-M..=M` (with `full`).
    pub correlation: Option<Vec<f64>>,

    /// Lag window coefficients (with `full`).
    pub window: Option<Vec<f64>>,
}

/// Blackman-Tukey estimate of the (cross) power spectral density of `x`
/// and `y` (`y = x` when omitted), using `M = m` correlation lags evaluated
/// at `L = l` frequencies.
pub fn blackman_tukey(
    x: &[f64],
    m: usize,
    l: usize,
    y: Option<&[f64]>,
    opts: &BlackmanTukeyOptions,
) -> DspResult<BlackmanTukey> {
    blackman_tukey_with(&StandardWindows, x, m, l, y, opts)
}

/// [`blackman_tukey`] with a caller-supplied window resolver.
pub fn blackman_tukey_with(
    resolver: &dyn WindowResolver,
    x: &[f64],
    m: usize,
    l: usize,
    y: Option<&[f64]>,
    opts: &BlackmanTukeyOptions,
) -> DspResult<BlackmanTukey> {
    let n = x.len();
    if n == 0 {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    if m > n {
        return Err(DspError::invalid(
            "M",
            format!("number of lags {} exceeds signal length {}", m, n),
        ));
    }
    let y = y.unwrap_or(x);
    if y.len() != n {
        return Err(DspError::LengthMismatch {
            expected: n,
            actual: y.len(),
        });
    }
    let lags = 2 * m + 1;
    if l == 0 {
        return Err(DspError::invalid("L", "at least one evaluation point is required"));
    }
    if !(opts.d.is_finite() && opts.d > 0.0) {
        return Err(DspError::invalid(
            "d",
            format!("sample interval must be positive, got {}", opts.d),
        ));
    }

    let correlation = cross_correlation(x, y, m)?;

    let window = resolver.resolve(&opts.window, lags)?;
    if window.len() != lags {
        return Err(DspError::LengthMismatch {
            expected: lags,
            actual: window.len(),
        });
    }

    tracing::debug!(
        "blackman_tukey: N={}, M={}, L={}, window={}",
        n,
        m,
        l,
        opts.window.name()
    );

    // Fold the tapered lags modulo L: an L-point DFT of the folded sequence
    // samples the transform of all 2M+1 lags exactly at k/L.
    let mut folded = vec![0.0; l];
    for (i, (r, w)) in correlation.iter().zip(window.iter()).enumerate() {
        folded[i % l] += r * w;
    }

    let mut engine = FftEngine::new();
    let mut spectrum = engine.fft_real_n(&folded, l)?;

    // Lag -M sits at FFT position 0; rotate the phase so lag 0 is the origin.
    for (k, s) in spectrum.iter_mut().enumerate() {
        let phase = 2.0 * PI * ((k * m) % l) as f64 / l as f64;
        *s *= Complex64::from_polar(opts.d, phase);
    }

    let (correlation, window) = if opts.full {
        (Some(correlation), Some(window))
    } else {
        (None, None)
    };

    Ok(BlackmanTukey {
        spectrum,
        frequencies: fftfreq(l, opts.d),
        correlation,
        window,
    })
}

/// Periodogram of `x` (cross-periodogram with `y`) at `l` frequencies.
///
/// Same as [`blackman_tukey`] with every lag kept (`M = N - 1`) and a
/// boxcar lag window.
pub fn periodogram(
    x: &[f64],
    l: usize,
    y: Option<&[f64]>,
    d: f64,
    full: bool,
) -> DspResult<BlackmanTukey> {
    let m = x.len().saturating_sub(1);
    let opts = BlackmanTukeyOptions {
        window: WindowSpec::Boxcar,
        d,
        full,
    };
    blackman_tukey(x, m, l, y, &opts)
}

/// Biased cross-correlation `sum_n x[n+k] y[n] / N` for lags `-m..=m`,
/// evaluated through the FFT.
fn cross_correlation(x: &[f64], y: &[f64], m: usize) -> DspResult<Vec<f64>> {
    let n = x.len();
    // Lags beyond N-1 vanish, so N + M points keep -M..=M free of wrap-around.
    let fft_size = nextpow2(n + m)?;

    let mut engine = FftEngine::new();
    let mut spec = engine.fft_real_n(x, fft_size)?;
    let y_fft = engine.fft_real_n(y, fft_size)?;
    for (a, b) in spec.iter_mut().zip(y_fft.iter()) {
        *a *= b.conj();
    }
    engine.ifft_inplace(&mut spec)?;

    let scale = 1.0 / n as f64;
    Ok((0..=2 * m)
        .map(|i| {
            let lag = i as isize - m as isize;
            let pos = lag.rem_euclid(fft_size as isize) as usize;
            spec[pos].re * scale
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::generate_window;
    use approx::assert_abs_diff_eq;

    fn tone(n: usize, f0: f64) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * f0 * i as f64).cos()).collect()
    }

    /// Reference correlation by direct summation.
    fn direct_correlation(x: &[f64], y: &[f64], m: usize) -> Vec<f64> {
        let n = x.len() as isize;
        (-(m as isize)..=m as isize)
            .map(|k| {
                let mut acc = 0.0;
                for i in 0..n {
                    let j = i + k;
                    if j >= 0 && j < n {
                        acc += x[j as usize] * y[i as usize];
                    }
                }
                acc / n as f64
            })
            .collect()
    }

    struct Halves;

    impl WindowResolver for Halves {
        fn resolve(&self, _spec: &WindowSpec, length: usize) -> DspResult<Vec<f64>> {
            Ok(vec![0.5; length])
        }
    }

    #[test]
    fn test_correlation_matches_direct() {
        let x: Vec<f64> = (0..37).map(|i| (i as f64 * 0.37).sin() + 0.1 * i as f64).collect();
        let y: Vec<f64> = (0..37).map(|i| (i as f64 * 0.11).cos()).collect();

        for m in [0, 5, 36, 37] {
            let fast = cross_correlation(&x, &y, m).unwrap();
            let slow = direct_correlation(&x, &y, m);
            assert_eq!(fast.len(), 2 * m + 1);
            for (a, b) in fast.iter().zip(slow.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_periodogram_delegates() {
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.9).sin() * (i as f64 * 0.05).exp()).collect();
        let l = 128;

        let bt = blackman_tukey(&x, x.len() - 1, l, None, &BlackmanTukeyOptions::default()).unwrap();
        let pg = periodogram(&x, l, None, 1.0, false).unwrap();
        assert_eq!(bt, pg);
    }

    #[test]
    fn test_impulse_is_white() {
        let mut x = vec![0.0; 16];
        x[0] = 1.0;
        let opts = BlackmanTukeyOptions {
            d: 0.5,
            ..Default::default()
        };

        let est = blackman_tukey(&x, 8, 32, None, &opts).unwrap();
        assert_eq!(est.spectrum.len(), 32);
        for s in &est.spectrum {
            assert_abs_diff_eq!(s.re, 0.5 / 16.0, epsilon = 1e-12);
            assert_abs_diff_eq!(s.im, 0.0, epsilon = 1e-12);
        }
        assert_eq!(est.frequencies, fftfreq(32, 0.5));
    }

    #[test]
    fn test_mean_power_matches_zero_lag() {
        let x: Vec<f64> = (0..64).map(|i| (i as f64 * 0.7).sin() + 0.3).collect();
        let d = 2.0;
        let opts = BlackmanTukeyOptions {
            d,
            full: true,
            ..Default::default()
        };

        let est = blackman_tukey(&x, 20, 64, None, &opts).unwrap();
        let mean_power = x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64;
        let mean_s = est.spectrum.iter().map(|s| s.re).sum::<f64>() / est.spectrum.len() as f64;
        assert_abs_diff_eq!(mean_s / d, mean_power, epsilon = 1e-10);

        let correlation = est.correlation.unwrap();
        assert_eq!(correlation.len(), 41);
        assert_abs_diff_eq!(correlation[20], mean_power, epsilon = 1e-12);
    }

    #[test]
    fn test_autospectrum_is_real_and_peaks_at_tone() {
        let x = tone(256, 0.125);
        let opts = BlackmanTukeyOptions {
            window: WindowSpec::Hann,
            ..Default::default()
        };

        let est = blackman_tukey(&x, 64, 256, None, &opts).unwrap();
        assert!(est.spectrum.iter().all(|s| s.im.abs() < 1e-9));

        let peak = est
            .spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.re.total_cmp(&b.1.re))
            .map(|(k, _)| est.frequencies[k].abs())
            .unwrap();
        assert_abs_diff_eq!(peak, 0.125, epsilon = 1e-12);
    }

    /// Transform of the windowed lags `-m..=m` evaluated directly at `k / (l d)`.
    fn direct_dtft(correlation: &[f64], window: &[f64], m: usize, l: usize, d: f64) -> Vec<Complex64> {
        (0..l)
            .map(|k| {
                correlation
                    .iter()
                    .zip(window.iter())
                    .enumerate()
                    .map(|(i, (r, w))| {
                        let lag = i as f64 - m as f64;
                        let phase = -2.0 * PI * k as f64 * lag / l as f64;
                        Complex64::from_polar(r * w * d, phase)
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_periodogram_fewer_points_than_lags() {
        let x: Vec<f64> = (0..100).map(|i| (i as f64 * 0.31).sin() + 0.2 * (i as f64 * 1.7).cos()).collect();
        let l = 128;

        let est = periodogram(&x, l, None, 1.0, true).unwrap();
        assert_eq!(est.spectrum.len(), l);
        assert_eq!(est.frequencies, fftfreq(l, 1.0));

        let correlation = est.correlation.unwrap();
        let expected = direct_dtft(&correlation, &vec![1.0; 199], 99, l, 1.0);
        for (a, b) in est.spectrum.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_windowed_lags_fold_onto_short_grid() {
        let x: Vec<f64> = (0..120).map(|i| (i as f64 * 0.45).cos() * (1.0 + 0.01 * i as f64)).collect();
        let opts = BlackmanTukeyOptions {
            window: WindowSpec::Hann,
            d: 0.5,
            full: true,
        };

        let est = blackman_tukey(&x, 80, 128, None, &opts).unwrap();
        let correlation = est.correlation.unwrap();
        let window = est.window.unwrap();
        let expected = direct_dtft(&correlation, &window, 80, 128, 0.5);
        for (a, b) in est.spectrum.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cross_spectrum_of_identical_signals() {
        let x = tone(100, 0.1);
        let auto = blackman_tukey(&x, 30, 64, None, &BlackmanTukeyOptions::default()).unwrap();
        let cross = blackman_tukey(&x, 30, 64, Some(&x[..]), &BlackmanTukeyOptions::default()).unwrap();
        assert_eq!(auto, cross);
    }

    #[test]
    fn test_full_returns_window() {
        let x = tone(40, 0.2);
        let opts = BlackmanTukeyOptions {
            window: WindowSpec::Kaiser { beta: 4.0 },
            full: true,
            ..Default::default()
        };

        let est = blackman_tukey(&x, 10, 32, None, &opts).unwrap();
        assert_eq!(est.window.unwrap(), generate_window(&WindowSpec::Kaiser { beta: 4.0 }, 21));

        let brief = blackman_tukey(&x, 10, 32, None, &BlackmanTukeyOptions::default()).unwrap();
        assert!(brief.correlation.is_none());
        assert!(brief.window.is_none());
    }

    #[test]
    fn test_custom_resolver() {
        let x = tone(40, 0.2);
        let opts = BlackmanTukeyOptions::default();

        let base = blackman_tukey(&x, 10, 32, None, &opts).unwrap();
        let halved = blackman_tukey_with(&Halves, &x, 10, 32, None, &opts).unwrap();
        for (a, b) in base.spectrum.iter().zip(halved.spectrum.iter()) {
            assert_abs_diff_eq!(a.re * 0.5, b.re, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_argument_errors() {
        let x = vec![1.0; 10];
        let opts = BlackmanTukeyOptions::default();

        assert!(matches!(
            blackman_tukey(&x, 11, 64, None, &opts),
            Err(DspError::InvalidArgument { arg: "M", .. })
        ));
        assert_eq!(
            blackman_tukey(&x, 4, 64, Some(&[1.0; 9][..]), &opts),
            Err(DspError::LengthMismatch { expected: 10, actual: 9 })
        );
        assert!(matches!(
            blackman_tukey(&x, 4, 0, None, &opts),
            Err(DspError::InvalidArgument { arg: "L", .. })
        ));
        assert!(matches!(
            blackman_tukey(&x, 4, 16, None, &BlackmanTukeyOptions { d: 0.0, ..Default::default() }),
            Err(DspError::InvalidArgument { arg: "d", .. })
        ));
        assert!(matches!(
            periodogram(&[], 8, None, 1.0, false),
            Err(DspError::InsufficientData { .. })
        ));
    }
}
