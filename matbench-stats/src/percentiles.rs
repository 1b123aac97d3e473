//! Percentile Computation
//!
//! Computed from raw samples, never from the trimmed set: the slowest run
//! is worth reporting even when it is excluded from the estimate.

use serde::{Deserialize, Serialize};

/// Minimum, median and maximum of a sample set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    /// Smallest sample
    pub min: f64,
    /// 50th percentile
    pub median: f64,
    /// Largest sample
    pub max: f64,
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (percentile / 100.0) * (n - 1) as f64;
            let lower_idx = rank.floor() as usize;
            let upper_idx = (lower_idx + 1).min(n - 1);
            let fraction = rank - lower_idx as f64;
            sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
        }
    }
}

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks.
///
/// # Examples
///
/// ```
/// # use matbench_stats::compute_percentile;
/// let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    percentile_of_sorted(&sorted(samples), percentile)
}

/// Compute min, median and max with a single sort
pub fn compute_extremes(samples: &[f64]) -> Extremes {
    let sorted = sorted(samples);
    Extremes {
        min: sorted.first().copied().unwrap_or(0.0),
        median: percentile_of_sorted(&sorted, 50.0),
        max: sorted.last().copied().unwrap_or(0.0),
    }
}
