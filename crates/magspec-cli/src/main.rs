//! magspec CLI: spectral analysis and linear-phase FIR filtering of
//! sampled measurement series.
//!
//! This is the main entry point for the magspec tool.

mod config;
mod input;
mod orchestrator;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{AnalysisConfig, InputConfig, JobConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "magspec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Write results to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job described by a configuration file
    Run {
        /// Path to the job configuration file (TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Compute the spectrum of a series
    Spectrum {
        /// CSV file with `index,value` columns
        input: PathBuf,

        /// Sample period (inferred from the index column if omitted)
        #[arg(short = 'd', long)]
        sample_period: Option<f64>,

        /// Time origin as a sample index (defaults to the sample labelled t = 0)
        #[arg(long)]
        n0: Option<f64>,

        /// Oversampling exponent
        #[arg(long, default_value = "1")]
        oversample: u32,

        /// Return negative frequencies too
        #[arg(long)]
        two_sided: bool,
    },

    /// Filter a series with a linear-phase FIR filter
    Filter {
        /// CSV file with `index,value` columns
        input: PathBuf,

        /// File with one filter tap per line
        #[arg(short, long)]
        taps: PathBuf,

        /// Convolution mode (same, valid, full)
        #[arg(short, long, default_value = "same")]
        mode: String,

        /// Sample period (inferred from the index column if omitted)
        #[arg(short = 'd', long)]
        sample_period: Option<f64>,
    },

    /// Estimate the power spectral density (Blackman-Tukey)
    Psd {
        /// CSV file with `index,value` columns
        input: PathBuf,

        /// Correlation lags to keep
        #[arg(short = 'm', long)]
        lags: usize,

        /// Evaluation points
        #[arg(short = 'l', long)]
        points: usize,

        /// Lag window name
        #[arg(short, long, default_value = "boxcar")]
        window: String,

        /// Window shape parameter (repeatable)
        #[arg(long = "window-param")]
        window_params: Vec<f64>,

        /// Second series for a cross spectral density
        #[arg(long)]
        cross: Option<PathBuf>,

        /// Sample period (inferred from the index column if omitted)
        #[arg(short = 'd', long)]
        sample_period: Option<f64>,
    },

    /// Report the per-band frequency response of a FIR filter
    Response {
        /// File with one filter tap per line
        taps: PathBuf,

        /// Band boundaries, two per band
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        bands: Vec<f64>,

        /// Desired magnitude, one per band
        #[arg(long, value_delimiter = ',')]
        desired: Vec<f64>,

        /// Sample rate
        #[arg(short = 's', long, default_value = "1.0")]
        sample_rate: f64,

        /// Band names
        #[arg(long, value_delimiter = ',')]
        names: Option<Vec<String>>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let job = match cli.command {
        Commands::Run { config } => {
            tracing::info!("Loading configuration from {:?}", config);
            config::load_config(&config)?
        }
        Commands::Spectrum {
            input,
            sample_period,
            n0,
            oversample,
            two_sided,
        } => direct_job(
            "spectrum",
            Some(input_config(input, sample_period)),
            AnalysisConfig::Spectrum {
                n0,
                oversample,
                only_positive: !two_sided,
            },
        )?,
        Commands::Filter {
            input,
            taps,
            mode,
            sample_period,
        } => direct_job(
            "filter",
            Some(input_config(input, sample_period)),
            AnalysisConfig::Filter { taps, mode },
        )?,
        Commands::Psd {
            input,
            lags,
            points,
            window,
            window_params,
            cross,
            sample_period,
        } => direct_job(
            "psd",
            Some(input_config(input, sample_period)),
            AnalysisConfig::Psd {
                lags,
                points,
                window,
                window_params,
                cross,
            },
        )?,
        Commands::Response {
            taps,
            bands,
            desired,
            sample_rate,
            names,
        } => direct_job(
            "response",
            None,
            AnalysisConfig::Response {
                taps,
                bands,
                desired,
                sample_rate,
                names,
            },
        )?,
    };

    run_job(job, cli.output.as_deref(), cli.format)
}

fn input_config(path: PathBuf, sample_period: Option<f64>) -> InputConfig {
    InputConfig {
        path,
        sample_period,
        detrend: false,
    }
}

fn direct_job(name: &str, input: Option<InputConfig>, analysis: AnalysisConfig) -> Result<JobConfig> {
    let job = JobConfig {
        name: name.to_string(),
        input,
        analysis,
    };
    config::validate_config(&job)?;
    Ok(job)
}

fn run_job(job: JobConfig, output_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let orchestrator = orchestrator::Orchestrator::new(job);
    let result = orchestrator.run()?;
    output::write_result(&result, output_path, format)
}
