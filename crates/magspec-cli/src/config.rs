//! Job configuration loading and validation.

use anyhow::{Context, Result};
use lib_dsp::{ConvolutionMode, WindowSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level job configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name/description.
    #[serde(default = "default_name")]
    pub name: String,

    /// Measurement series to analyse. Not needed for `response`.
    pub input: Option<InputConfig>,

    /// Analysis to run.
    pub analysis: AnalysisConfig,
}

fn default_name() -> String {
    "magspec job".to_string()
}

/// Input series configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    /// CSV file with `index,value` columns.
    pub path: PathBuf,

    /// Sample period; inferred from the index column when absent.
    pub sample_period: Option<f64>,

    /// Subtract the mean before analysis.
    #[serde(default)]
    pub detrend: bool,
}

/// Analysis selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisConfig {
    /// Oversampled DFT spectrum.
    Spectrum {
        /// Time origin as a sample index; defaults to the (possibly fractional)
        /// index of the sample labelled `t = 0`.
        n0: Option<f64>,

        #[serde(default = "default_oversample")]
        oversample: u32,

        #[serde(default = "default_true")]
        only_positive: bool,
    },

    /// Delay-compensated linear-phase FIR filtering.
    Filter {
        /// File with one tap per line.
        taps: PathBuf,

        /// `same`, `valid` or `full`.
        #[serde(default = "default_mode")]
        mode: String,
    },

    /// Blackman-Tukey power spectral density.
    Psd {
        /// Correlation lags kept (`M`).
        lags: usize,

        /// Evaluation points (`L`).
        points: usize,

        /// Lag window name (scipy naming).
        #[serde(default = "default_window")]
        window: String,

        /// Window shape parameters (kaiser beta, gaussian std, tukey alpha).
        #[serde(default)]
        window_params: Vec<f64>,

        /// Second series for a cross spectral density.
        cross: Option<PathBuf>,
    },

    /// Per-band deviation report of a designed filter.
    Response {
        /// File with one tap per line.
        taps: PathBuf,

        /// Band boundaries, two per band.
        bands: Vec<f64>,

        /// Desired magnitude, one per band.
        desired: Vec<f64>,

        #[serde(default = "default_sample_rate")]
        sample_rate: f64,

        /// Optional band names.
        names: Option<Vec<String>>,
    },
}

fn default_oversample() -> u32 { 1 }
fn default_true() -> bool { true }
fn default_mode() -> String { "same".to_string() }
fn default_window() -> String { "boxcar".to_string() }
fn default_sample_rate() -> f64 { 1.0 }

impl AnalysisConfig {
    /// Short name of the analysis.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisConfig::Spectrum { .. } => "spectrum",
            AnalysisConfig::Filter { .. } => "filter",
            AnalysisConfig::Psd { .. } => "psd",
            AnalysisConfig::Response { .. } => "response",
        }
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: JobConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| "Failed to parse config as JSON")?
    } else {
        // Assume TOML
        toml::from_str(&content)
            .with_context(|| "Failed to parse config as TOML")?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration.
pub fn validate_config(config: &JobConfig) -> Result<()> {
    match &config.input {
        Some(input) => {
            if !input.path.exists() {
                anyhow::bail!("Input file not found: {:?}", input.path);
            }
            if let Some(period) = input.sample_period {
                if !(period.is_finite() && period > 0.0) {
                    anyhow::bail!("Sample period must be positive (got {})", period);
                }
            }
        }
        None => {
            if !matches!(config.analysis, AnalysisConfig::Response { .. }) {
                anyhow::bail!(
                    "Analysis '{}' requires an [input] section",
                    config.analysis.kind()
                );
            }
        }
    }

    match &config.analysis {
        AnalysisConfig::Spectrum { oversample, .. } => {
            if *oversample == 0 {
                anyhow::bail!("Oversample must be at least 1");
            }
        }
        AnalysisConfig::Filter { taps, mode } => {
            check_exists(taps, "Taps")?;
            mode.parse::<ConvolutionMode>()?;
        }
        AnalysisConfig::Psd {
            points,
            window,
            window_params,
            cross,
            ..
        } => {
            if *points == 0 {
                anyhow::bail!("PSD needs at least one evaluation point");
            }
            WindowSpec::from_name(window, window_params)?;
            if let Some(cross) = cross {
                check_exists(cross, "Cross input")?;
            }
        }
        AnalysisConfig::Response {
            taps,
            bands,
            desired,
            sample_rate,
            names,
        } => {
            check_exists(taps, "Taps")?;
            if bands.len() != 2 * desired.len() {
                anyhow::bail!(
                    "Expected two band boundaries per desired value (got {} boundaries, {} desired)",
                    bands.len(),
                    desired.len()
                );
            }
            if *sample_rate <= 0.0 {
                anyhow::bail!("Sample rate must be positive (got {})", sample_rate);
            }
            if let Some(names) = names {
                if names.len() != desired.len() {
                    anyhow::bail!(
                        "Expected {} band names (got {})",
                        desired.len(),
                        names.len()
                    );
                }
            }
        }
    }

    Ok(())
}

fn check_exists(path: &Path, label: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} file not found: {:?}", label, path);
    }
    Ok(())
}
