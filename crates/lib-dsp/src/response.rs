//! Frequency-response report for a designed FIR filter.
//!
//! The band layout follows `scipy.signal.remez`: two boundaries per band and
//! one desired magnitude per band. The response is evaluated on a dense
//! one-sided grid and the deviation from the desired magnitude is
//! summarized per band.

use crate::error::{DspError, DspResult};
use crate::fft::{nextpow2, rfftfreq, FftEngine};
use crate::fir::{lp_fir_type, LinearPhase};
use crate::stats::{median, Stats};
use lib_types::Hertz;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};
use std::ops::Index;

/// Grid density relative to the number of taps.
const RESPONSE_OVERSAMPLE: usize = 10;

/// Band edges and desired magnitudes.
#[derive(Clone, Debug, PartialEq)]
pub struct BandSpec {
    bands: Vec<f64>,
    desired: Vec<f64>,
}

impl BandSpec {
    /// Pair `bands` (two boundaries per band) with `desired` (one magnitude
    /// per band).
    pub fn new(bands: Vec<f64>, desired: Vec<f64>) -> DspResult<Self> {
        if bands.len() % 2 != 0 {
            return Err(DspError::invalid("bands", "# of band boundaries must be even"));
        }
        if bands.len() != 2 * desired.len() {
            return Err(DspError::invalid(
                "desired",
                "# of band boundaries must equal twice the length of desired (2 boundaries per band and 1 desired amplitude per band)",
            ));
        }
        if bands.iter().any(|&b| b < 0.0) {
            return Err(DspError::invalid("bands", "no value of bands may be negative"));
        }
        Ok(Self { bands, desired })
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.desired.len()
    }

    /// True when no band is specified.
    pub fn is_empty(&self) -> bool {
        self.desired.is_empty()
    }

    /// `(lower, upper, desired)` for each band.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.bands
            .chunks_exact(2)
            .zip(self.desired.iter())
            .map(|(edges, &d)| (edges[0], edges[1], d))
    }

    fn check_nyquist(&self, sample_rate: f64) -> DspResult<()> {
        let nyquist = Hertz(sample_rate).nyquist().0;
        if self.bands.iter().any(|&b| b > nyquist) {
            return Err(DspError::invalid(
                "bands",
                format!(
                    "no value of bands may be larger than the Nyquist rate ({})",
                    nyquist
                ),
            ));
        }
        Ok(())
    }
}

/// Deviation summary for one band.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandStats {
    /// Band name, when names were supplied.
    pub name: Option<String>,
    pub lower: f64,
    pub upper: f64,
    pub desired: f64,
    /// Statistics of `|desired - |H(f)||` over the band.
    pub stats: Stats,
    /// Median of the signed deviation `desired - |H(f)|`.
    pub median_deviation: f64,
}

/// Per-band statistics, addressable by band index or by band name.
#[derive(Clone, Debug, PartialEq)]
pub struct BandStatsMap {
    bands: Vec<BandStats>,
    by_name: HashMap<String, usize>,
    linear_phase: LinearPhase,
}

impl BandStatsMap {
    /// Statistics for band `index`.
    pub fn get(&self, index: usize) -> Option<&BandStats> {
        self.bands.get(index)
    }

    /// Statistics for the band called `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&BandStats> {
        self.by_name.get(name).and_then(|&i| self.bands.get(i))
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// True when there are no bands.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Bands in the order they were given.
    pub fn iter(&self) -> std::slice::Iter<'_, BandStats> {
        self.bands.iter()
    }

    /// Linear-phase classification of the evaluated filter.
    pub fn linear_phase(&self) -> LinearPhase {
        self.linear_phase
    }

    /// Write the human-readable report.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.linear_phase.number() {
            Some(n) => writeln!(out, "FIR filter is linear phase type {}", n)?,
            None => writeln!(out, "FIR filter is NOT linear phase")?,
        }
        writeln!(out)?;

        for (index, band) in self.bands.iter().enumerate() {
            match &band.name {
                Some(name) => writeln!(
                    out,
                    "{} ({}) abs deviations from {}:",
                    name, index, band.desired
                )?,
                None => writeln!(out, "band {} abs deviations from {}:", index, band.desired)?,
            }
            writeln!(
                out,
                "min = {:.3e}  (db={:.6})",
                band.stats.min,
                20.0 * band.stats.min.log10()
            )?;
            writeln!(out, "med = {:.3e}", band.median_deviation)?;
            if band.desired == 1.0 {
                writeln!(out, "std = {:.3e}", band.stats.sigma)?;
            }
            writeln!(
                out,
                "max = {:.3e} (db={:.6})",
                band.stats.max,
                20.0 * band.stats.max.log10()
            )?;
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Index<usize> for BandStatsMap {
    type Output = BandStats;

    fn index(&self, index: usize) -> &BandStats {
        &self.bands[index]
    }
}

impl<'a> IntoIterator for &'a BandStatsMap {
    type Item = &'a BandStats;
    type IntoIter = std::slice::Iter<'a, BandStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}

/// Report on the magnitude response of the FIR filter `h` against `spec`.
///
/// When `verbose`, the report is printed to stdout.
pub fn fir_response(
    h: &[f64],
    spec: &BandSpec,
    sample_rate: f64,
    names: Option<&[String]>,
    verbose: bool,
) -> DspResult<BandStatsMap> {
    let report = evaluate_fir_response(h, spec, sample_rate, names)?;
    if verbose {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(e) = report.write_report(&mut lock) {
            tracing::warn!("failed to write FIR response report: {}", e);
        }
    }
    Ok(report)
}

/// Evaluate per-band deviation statistics without printing.
pub fn evaluate_fir_response(
    h: &[f64],
    spec: &BandSpec,
    sample_rate: f64,
    names: Option<&[String]>,
) -> DspResult<BandStatsMap> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(DspError::invalid(
            "sample_rate",
            format!("must be positive, got {}", sample_rate),
        ));
    }
    spec.check_nyquist(sample_rate)?;
    if let Some(names) = names {
        if names.len() != spec.len() {
            return Err(DspError::invalid(
                "names",
                "there should be an equal number of bands as names",
            ));
        }
    }
    if h.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }

    let fft_size = nextpow2(RESPONSE_OVERSAMPLE * h.len())?;
    let mut engine = FftEngine::new();
    let magnitude: Vec<f64> = engine
        .rfft_n(h, fft_size)?
        .iter()
        .map(|c| c.norm())
        .collect();
    let freqs = rfftfreq(fft_size, 1.0 / sample_rate);

    tracing::debug!(
        "fir_response: taps={}, grid={}, bands={}",
        h.len(),
        freqs.len(),
        spec.len()
    );

    let mut bands = Vec::with_capacity(spec.len());
    let mut by_name = HashMap::new();

    for (index, (lower, upper, desired)) in spec.iter().enumerate() {
        let deviation: Vec<f64> = freqs
            .iter()
            .zip(magnitude.iter())
            .filter(|(f, _)| lower <= **f && **f < upper)
            .map(|(_, &mag)| desired - mag)
            .collect();
        if deviation.is_empty() {
            return Err(DspError::EmptyBand {
                band: index,
                lower,
                upper,
            });
        }

        let abs: Vec<f64> = deviation.iter().map(|d| d.abs()).collect();
        let name = names.map(|names| names[index].clone());
        if let Some(name) = &name {
            by_name.insert(name.clone(), index);
        }

        bands.push(BandStats {
            name,
            lower,
            upper,
            desired,
            stats: Stats::new(&abs)?,
            median_deviation: median(&deviation),
        });
    }

    Ok(BandStatsMap {
        bands,
        by_name,
        linear_phase: lp_fir_type(h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_band_spec_validation() {
        assert!(matches!(
            BandSpec::new(vec![0.0, 0.1, 0.2], vec![1.0]),
            Err(DspError::InvalidArgument { arg: "bands", .. })
        ));
        assert!(matches!(
            BandSpec::new(vec![0.0, 0.1, 0.2, 0.5], vec![1.0]),
            Err(DspError::InvalidArgument { arg: "desired", .. })
        ));
        assert!(matches!(
            BandSpec::new(vec![-0.1, 0.1], vec![1.0]),
            Err(DspError::InvalidArgument { arg: "bands", .. })
        ));
    }

    #[test]
    fn test_above_nyquist_rejected() {
        let spec = BandSpec::new(vec![0.0, 0.6], vec![1.0]).unwrap();
        assert!(matches!(
            evaluate_fir_response(&[1.0], &spec, 1.0, None),
            Err(DspError::InvalidArgument { arg: "bands", .. })
        ));
    }

    #[test]
    fn test_name_count_mismatch() {
        let spec = BandSpec::new(vec![0.0, 1.0, 1.0, 2.0], vec![1.0, 0.0]).unwrap();
        let wrong = names(&["pass"]);
        assert!(matches!(
            fir_response(&[1.0], &spec, 4.0, Some(&wrong), false),
            Err(DspError::InvalidArgument { arg: "names", .. })
        ));
    }

    #[test]
    fn test_all_pass_has_no_deviation() {
        let spec = BandSpec::new(vec![0.0, 0.5], vec![1.0]).unwrap();
        let report = evaluate_fir_response(&[1.0], &spec, 1.0, None).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.linear_phase(), LinearPhase::Type1);
        assert_abs_diff_eq!(report[0].stats.max, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report[0].median_deviation, 0.0, epsilon = 1e-12);
        // [0, 0.5) on a 16-point grid: 0/16 .. 7/16
        assert_eq!(report[0].stats.n, 8);
    }

    #[test]
    fn test_two_tap_average() {
        // |H(f)| = |cos(pi f)| at unit sample rate
        let h = [0.5, 0.5];
        let spec = BandSpec::new(vec![0.0, 0.1, 0.4, 0.5], vec![1.0, 0.0]).unwrap();
        let labels = names(&["pass", "stop"]);
        let report = evaluate_fir_response(&h, &spec, 1.0, Some(&labels)).unwrap();

        let pass = report.get_by_name("pass").unwrap();
        assert_eq!(pass, &report[0]);
        assert_abs_diff_eq!(pass.stats.min, 0.0, epsilon = 1e-12);
        assert!(pass.stats.max < 1.0 - (std::f64::consts::PI * 0.1).cos() + 1e-12);
        assert!(pass.median_deviation >= 0.0);

        let stop = report.get_by_name("stop").unwrap();
        assert_eq!(stop.name.as_deref(), Some("stop"));
        // Signed deviation is negative in the stopband: desired 0 minus a magnitude
        assert!(stop.median_deviation < 0.0);
        assert!(stop.stats.max <= (std::f64::consts::PI * 0.4).cos() + 1e-12);
        assert!(report.get_by_name("transition").is_none());
    }

    #[test]
    fn test_sample_rate_scales_bands() {
        let h = [0.25, 0.5, 0.25];
        let spec = BandSpec::new(vec![0.0, 10.0, 40.0, 50.0], vec![1.0, 0.0]).unwrap();
        let report = evaluate_fir_response(&h, &spec, 100.0, None).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report[1].stats.max < 0.1);
        assert!(report.get_by_name("0").is_none());
    }

    #[test]
    fn test_empty_band() {
        let spec = BandSpec::new(vec![0.1, 0.1], vec![1.0]).unwrap();
        assert!(matches!(
            evaluate_fir_response(&[1.0], &spec, 1.0, None),
            Err(DspError::EmptyBand { band: 0, .. })
        ));
    }

    #[test]
    fn test_report_text() {
        let h = [0.25, 0.5, 0.25];
        let spec = BandSpec::new(vec![0.0, 0.1, 0.4, 0.5], vec![1.0, 0.0]).unwrap();
        let labels = names(&["pass", "stop"]);
        let report = evaluate_fir_response(&h, &spec, 1.0, Some(&labels)).unwrap();

        let mut buf = Vec::new();
        report.write_report(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("FIR filter is linear phase type 1\n"));
        assert!(text.contains("pass (0) abs deviations from 1:"));
        assert!(text.contains("stop (1) abs deviations from 0:"));
        // Standard deviation only for the passband
        assert_eq!(text.matches("std = ").count(), 1);
        assert_eq!(text.matches("max = ").count(), 2);
    }

    #[test]
    fn test_report_not_linear_phase() {
        let spec = BandSpec::new(vec![0.0, 0.5], vec![1.0]).unwrap();
        let report = evaluate_fir_response(&[1.0, 2.0, 5.0], &spec, 1.0, None).unwrap();

        let mut buf = Vec::new();
        report.write_report(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("FIR filter is NOT linear phase"));
        assert!(text.contains("band 0 abs deviations from 1:"));
    }
}
