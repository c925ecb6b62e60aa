//! Uniformly sampled measurement series.
//!
//! A `Series` holds point measurements at discrete, evenly spaced instants:
//!
//! ```text
//! t[i] = t_start + i * dt,  for i = 0, 1, ..., N-1
//! ```
//!
//! The labels produced by [`Series::index_labels`] are the companion index
//! array that the FIR filter carries through truncation and padding.

use crate::error::{TypesError, TypesResult};
use crate::units::{Hertz, Seconds};
use serde::{Deserialize, Serialize};

/// Relative tolerance used when checking label spacing.
const SPACING_RTOL: f64 = 1e-6;

/// A uniformly sampled real-valued series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Sample values.
    pub samples: Vec<f64>,

    /// Time step between consecutive samples.
    pub dt: Seconds,

    /// Time of the first sample (negative for windows centred on zero).
    pub t_start: Seconds,
}

impl Series {
    /// Create a new series from samples.
    pub fn new(samples: Vec<f64>, dt: Seconds, t_start: Seconds) -> TypesResult<Self> {
        if !(dt.0.is_finite() && dt.0 > 0.0) {
            return Err(TypesError::InvalidPeriod(dt.0));
        }
        Ok(Self { samples, dt, t_start })
    }

    /// Build a series from `(label, value)` columns, inferring the period
    /// from the labels.
    ///
    /// Labels must be strictly increasing and evenly spaced. A single sample
    /// gets a unit period.
    pub fn from_labeled(labels: &[f64], samples: Vec<f64>) -> TypesResult<Self> {
        if labels.len() != samples.len() {
            return Err(TypesError::LabelMismatch {
                labels: labels.len(),
                samples: samples.len(),
            });
        }

        let t_start = labels.first().copied().map_or(Seconds::ZERO, Seconds);
        if labels.len() < 2 {
            return Self::new(samples, Seconds(1.0), t_start);
        }

        let expected = labels[1] - labels[0];
        if !(expected.is_finite() && expected > 0.0) {
            return Err(TypesError::InvalidPeriod(expected));
        }

        for (i, pair) in labels.windows(2).enumerate().skip(1) {
            let step = pair[1] - pair[0];
            if (step - expected).abs() > SPACING_RTOL * expected.abs() {
                return Err(TypesError::NonUniform {
                    index: i + 1,
                    step,
                    expected,
                });
            }
        }

        Self::new(samples, Seconds(expected), t_start)
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the sample at `index`.
    #[inline]
    pub fn time_at(&self, index: usize) -> Seconds {
        self.t_start + self.dt * index as f64
    }

    /// Sample rate (reciprocal of dt).
    #[inline]
    pub fn sample_rate(&self) -> Hertz {
        self.dt.to_frequency()
    }

    /// Time labels parallel to the samples.
    pub fn index_labels(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|i| self.time_at(i).0).collect()
    }

    /// Fractional sample index at which `t = 0`.
    ///
    /// For a series sampled symmetrically about zero this is the centre
    /// sample.
    pub fn origin_index(&self) -> f64 {
        -self.t_start.0 / self.dt.0
    }

    /// Subtract the mean from every sample.
    pub fn detrend_mean(&mut self) {
        if self.samples.is_empty() {
            return;
        }
        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        for sample in &mut self.samples {
            *sample -= mean;
        }
    }
}
