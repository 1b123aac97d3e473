//! Welford Accumulator
//!
//! Single-pass mean and population variance. Avoids the catastrophic
//! cancellation of the naive sum-of-squares formula when thousands of
//! nearly identical samples are accumulated.

use serde::{Deserialize, Serialize};

/// Running mean/variance accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an accumulator from a slice of samples
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut stats = Self::new();
        for &x in samples {
            stats.push(x);
        }
        stats
    }

    /// Add one observation
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    /// Number of observations
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean (0.0 when empty)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (0.0 for fewer than two observations)
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            // Rounding can push m2 a hair below zero on constant input
            (self.m2 / self.count as f64).max(0.0)
        }
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
