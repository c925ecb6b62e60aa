//! Job orchestration.

use crate::config::{AnalysisConfig, JobConfig};
use crate::input::{read_series, read_taps};
use anyhow::{Context, Result};
use lib_dsp::{
    blackman_tukey, fir_response, lp_fir_filter_series, spectrum_real, BandSpec, BandStatsMap,
    BlackmanTukey, BlackmanTukeyOptions, ConvolutionMode, LinearPhase, Spectrum, SpectrumOptions,
    WindowSpec,
};
use lib_types::Series;

/// Job orchestrator.
pub struct Orchestrator {
    config: JobConfig,
}

/// Output of a single analysis.
#[derive(Debug)]
pub enum AnalysisResult {
    Spectrum(Spectrum),
    Filter {
        series: Series,
        linear_phase: LinearPhase,
    },
    Psd(BlackmanTukey),
    Response(BandStatsMap),
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(config: JobConfig) -> Self {
        Self { config }
    }

    /// Run the configured analysis.
    pub fn run(&self) -> Result<AnalysisResult> {
        tracing::info!(
            "Starting job: {} ({})",
            self.config.name,
            self.config.analysis.kind()
        );

        let result = match &self.config.analysis {
            AnalysisConfig::Spectrum {
                n0,
                oversample,
                only_positive,
            } => {
                let series = self.load_input()?;
                let mut opts = SpectrumOptions::for_series(&series, *oversample, *only_positive);
                if let Some(n0) = n0 {
                    opts.n0 = *n0;
                }
                tracing::info!(
                    "Spectrum: n0 = {}, oversample = {}, one-sided = {}, Nyquist = {} Hz",
                    opts.n0,
                    opts.oversample,
                    opts.only_positive,
                    series.sample_rate().nyquist().0
                );
                AnalysisResult::Spectrum(spectrum_real(&series.samples, &opts)?)
            }

            AnalysisConfig::Filter { taps, mode } => {
                let series = self.load_input()?;
                let h = read_taps(taps)?;
                let mode: ConvolutionMode = mode.parse()?;
                let (series, linear_phase) = lp_fir_filter_series(&h, &series, mode)
                    .context("Filtering failed")?;
                tracing::info!(
                    "Filtered with {} taps ({}), {} output samples",
                    h.len(),
                    linear_phase,
                    series.len()
                );
                AnalysisResult::Filter {
                    series,
                    linear_phase,
                }
            }

            AnalysisConfig::Psd {
                lags,
                points,
                window,
                window_params,
                cross,
            } => {
                let series = self.load_input()?;
                let other = match cross {
                    Some(path) => Some(read_series(path, Some(series.dt.0))?),
                    None => None,
                };
                let opts = BlackmanTukeyOptions {
                    window: WindowSpec::from_name(window, window_params)?,
                    d: series.dt.0,
                    full: false,
                };
                let psd = blackman_tukey(
                    &series.samples,
                    *lags,
                    *points,
                    other.as_ref().map(|s| s.samples.as_slice()),
                    &opts,
                )
                .context("Blackman-Tukey estimate failed")?;
                AnalysisResult::Psd(psd)
            }

            AnalysisConfig::Response {
                taps,
                bands,
                desired,
                sample_rate,
                names,
            } => {
                let h = read_taps(taps)?;
                let spec = BandSpec::new(bands.clone(), desired.clone())?;
                let report = fir_response(&h, &spec, *sample_rate, names.as_deref(), false)?;
                AnalysisResult::Response(report)
            }
        };

        tracing::info!("Job complete");
        Ok(result)
    }

    /// Load the input series, detrending if requested.
    fn load_input(&self) -> Result<Series> {
        let input = self
            .config
            .input
            .as_ref()
            .with_context(|| format!("Analysis '{}' requires an input", self.config.analysis.kind()))?;

        tracing::info!("Loading input from {:?}", input.path);
        let mut series = read_series(&input.path, input.sample_period)?;
        if input.detrend {
            series.detrend_mean();
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn pulse_csv(dir: &Path) -> PathBuf {
        let mut csv = String::from("time,value\n");
        for i in -8i32..=8 {
            let value = if i.abs() <= 2 { 1.0 } else { 0.0 };
            csv.push_str(&format!("{},{}\n", f64::from(i) * 0.25, value));
        }
        write_file(dir, "pulse.csv", &csv)
    }

    fn input(path: PathBuf) -> Option<InputConfig> {
        Some(InputConfig {
            path,
            sample_period: None,
            detrend: false,
        })
    }

    #[test]
    fn test_spectrum_job_uses_label_origin() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig {
            name: "pulse".into(),
            input: input(pulse_csv(dir.path())),
            analysis: AnalysisConfig::Spectrum {
                n0: None,
                oversample: 2,
                only_positive: false,
            },
        };

        match Orchestrator::new(config).run().unwrap() {
            AnalysisResult::Spectrum(spec) => {
                assert_eq!(spec.len(), 64);
                // Pulse is even about t = 0, so the spectrum is real
                assert!(spec.imag_norm() < 1e-12);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_filter_job_keeps_labels() {
        let dir = tempfile::tempdir().unwrap();
        let taps = write_file(dir.path(), "taps.txt", "0.25\n0.5\n0.25\n");
        let config = JobConfig {
            name: "smooth".into(),
            input: input(pulse_csv(dir.path())),
            analysis: AnalysisConfig::Filter {
                taps,
                mode: "full".into(),
            },
        };

        match Orchestrator::new(config).run().unwrap() {
            AnalysisResult::Filter {
                series,
                linear_phase,
            } => {
                assert_eq!(linear_phase, LinearPhase::Type1);
                assert_eq!(series.len(), 19);
                assert!((series.t_start.0 + 2.25).abs() < 1e-12);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_response_job_needs_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let taps = write_file(dir.path(), "taps.txt", "0.25\n0.5\n0.25\n");
        let config = JobConfig {
            name: "response".into(),
            input: None,
            analysis: AnalysisConfig::Response {
                taps,
                bands: vec![0.0, 0.1, 0.4, 0.5],
                desired: vec![1.0, 0.0],
                sample_rate: 1.0,
                names: Some(vec!["pass".into(), "stop".into()]),
            },
        };

        match Orchestrator::new(config).run().unwrap() {
            AnalysisResult::Response(report) => {
                assert_eq!(report.len(), 2);
                assert!(report.get_by_name("stop").is_some());
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_psd_job_frequencies_follow_period() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobConfig {
            name: "psd".into(),
            input: input(pulse_csv(dir.path())),
            analysis: AnalysisConfig::Psd {
                lags: 4,
                points: 16,
                window: "hann".into(),
                window_params: Vec::new(),
                cross: None,
            },
        };

        match Orchestrator::new(config).run().unwrap() {
            AnalysisResult::Psd(psd) => {
                assert_eq!(psd.spectrum.len(), 16);
                // fftfreq(16, 0.25): bin 1 at 1 / (16 * 0.25)
                assert!((psd.frequencies[1] - 0.25).abs() < 1e-12);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
