//! Numeric summaries for cleaning statistics
//!
//! Small descriptive-statistics helpers used by the quality log and the
//! duration outlier stage. Quantiles use linear interpolation between order
//! statistics; the standard deviation is the sample deviation.

use serde::{Deserialize, Serialize};

/// Mean, median, and sample standard deviation of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

impl MetricSummary {
    /// Summarize a set of values
    ///
    /// An empty set yields zeros; a single value has zero deviation. Keeping
    /// the summary finite keeps the JSON artifact well-formed.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                median: 0.0,
                std: 0.0,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            mean: mean(values),
            median: quantile(&sorted, 0.5),
            std: sample_std(values),
        }
    }
}

/// Arithmetic mean; zero for an empty set
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); zero below two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Quantile of pre-sorted values with linear interpolation
///
/// `q` is clamped to [0, 1]. The input slice must be sorted ascending.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let fraction = position - lower as f64;
        sorted[lower] + fraction * (sorted[upper] - sorted[lower])
    }
}
