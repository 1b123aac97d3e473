//! Outlier Trimming
//!
//! Standard-deviation band trimming: a sample is kept when its absolute
//! deviation from the population mean is at most `k * stddev`.
//!
//! Samples exactly on the band edge are kept. Trimming never produces an
//! empty set: if every sample would be excluded the unfiltered mean is used.

use crate::welford::RunningStats;
use serde::{Deserialize, Serialize};

/// Result of trimmed-mean estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimmedMean {
    /// Population mean of all samples
    pub mean: f64,
    /// Population standard deviation of all samples
    pub std_dev: f64,
    /// Mean of the samples inside the band
    pub trimmed_mean: f64,
    /// Samples outside the band
    pub excluded_count: usize,
    /// Samples that contributed to `trimmed_mean`
    pub included_count: usize,
}

impl TrimmedMean {
    fn empty() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            trimmed_mean: 0.0,
            excluded_count: 0,
            included_count: 0,
        }
    }

    /// Fraction of samples excluded, in percent
    pub fn excluded_percentage(&self) -> f64 {
        let total = self.excluded_count + self.included_count;
        if total == 0 {
            return 0.0;
        }
        (self.excluded_count as f64 / total as f64) * 100.0
    }
}

/// Compute mean, standard deviation and a trimmed mean over `samples`.
///
/// `num_std_devs == 0` disables trimming entirely.
///
/// # Examples
///
/// ```
/// # use matbench_stats::compute_trimmed_mean;
/// let mut samples = vec![10.0; 20];
/// samples.push(100.0);
/// let est = compute_trimmed_mean(&samples, 2);
/// assert_eq!(est.excluded_count, 1);
/// assert_eq!(est.trimmed_mean, 10.0);
/// ```
pub fn compute_trimmed_mean(samples: &[f64], num_std_devs: u32) -> TrimmedMean {
    if samples.is_empty() {
        return TrimmedMean::empty();
    }

    let all = RunningStats::from_samples(samples);
    let mean = all.mean();
    let std_dev = all.std_dev();

    let untrimmed = TrimmedMean {
        mean,
        std_dev,
        trimmed_mean: mean,
        excluded_count: 0,
        included_count: samples.len(),
    };

    if num_std_devs == 0 {
        return untrimmed;
    }

    let band = num_std_devs as f64 * std_dev;
    let mut kept = RunningStats::new();
    for &x in samples {
        if (x - mean).abs() <= band {
            kept.push(x);
        }
    }

    if kept.count() == 0 {
        return untrimmed;
    }

    TrimmedMean {
        mean,
        std_dev,
        trimmed_mean: kept.mean(),
        excluded_count: samples.len() - kept.count() as usize,
        included_count: kept.count() as usize,
    }
}
