//! Summary statistics over a sample.

use crate::error::{DspError, DspResult};
use serde::Serialize;

/// Min/max/mean/median/standard deviation of a finite sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Stats {
    /// Number of values summarized.
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub sigma: f64,
}

impl Stats {
    /// Summarize `values`. Fails on an empty sample.
    pub fn new(values: &[f64]) -> DspResult<Self> {
        if values.is_empty() {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Ok(Self {
            n,
            min,
            max,
            mean,
            median: median(values),
            sigma: variance.sqrt(),
        })
    }
}

/// Median of a non-empty slice (mean of the middle pair for even lengths).
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.is_empty() {
        f64::NAN
    } else if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
