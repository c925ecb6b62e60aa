//! # lib-dsp
//!
//! Spectral analysis and linear-phase FIR filtering.
//!
//! This crate provides the numerical core of magspec:
//!
//! - **FFT/IFFT**: Zero-padded transforms, `nextpow2` sizing, frequency bins
//! - **Spectrum**: Oversampled DFT spectrum with a movable time origin
//! - **FIR Filtering**: Linear-phase classification and delay-compensated filtering
//! - **Spectral Density**: Blackman-Tukey and periodogram estimates
//! - **Windows**: Symmetric lag windows behind a pluggable resolver
//! - **Filter Response**: Per-band deviation report for designed filters

pub mod error;
pub mod fft;
pub mod fir;
pub mod response;
pub mod spectral;
pub mod spectrum;
pub mod stats;
pub mod window;

pub use error::{DspError, DspResult};
pub use fft::{nextpow2, FftEngine};
pub use fir::{lp_fir_filter, lp_fir_filter_complex, lp_fir_filter_series, lp_fir_type, ConvolutionMode, FilterOutput, LinearPhase};
pub use response::{evaluate_fir_response, fir_response, BandSpec, BandStats, BandStatsMap};
pub use spectral::{blackman_tukey, blackman_tukey_with, periodogram, BlackmanTukey, BlackmanTukeyOptions};
pub use spectrum::{rect, spectrum, spectrum_real, spectrum_series, Spectrum, SpectrumOptions};
pub use stats::Stats;
pub use window::{StandardWindows, WindowResolver, WindowSpec};
