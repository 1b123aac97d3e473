//! Benchmark configuration.

use crate::error::{BenchError, Result};
use crate::kernel::KernelVariant;
use serde::{Deserialize, Serialize};

/// Default number of timed runs
pub const DEFAULT_NUM_RUNS: usize = 10_000;

/// Default outlier band in standard deviations
pub const DEFAULT_NUM_STD_DEVS: u32 = matbench_stats::DEFAULT_NUM_STD_DEVS;

/// Resolved configuration for one benchmark.
///
/// Immutable once handed to a [`BenchmarkRunner`](crate::BenchmarkRunner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Kernel to benchmark
    pub variant: KernelVariant,
    /// Worker threads for the parallel kernel (ignored by the others)
    pub thread_count: usize,
    /// CPU the timing thread is pinned to; parallel workers start here
    pub cpu_id: usize,
    /// Effective problem dimension, recorded for reporting
    pub data_size: usize,
    /// Timed invocations
    pub num_runs: usize,
    /// Outlier band in standard deviations (0 disables trimming)
    pub num_std_devs: u32,
    /// Untimed invocations before measurement starts
    pub warmup_runs: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            variant: KernelVariant::Naive,
            thread_count: 1,
            cpu_id: 0,
            data_size: 0,
            num_runs: DEFAULT_NUM_RUNS,
            num_std_devs: DEFAULT_NUM_STD_DEVS,
            warmup_runs: 0,
        }
    }
}

impl BenchmarkConfig {
    /// Default configuration for `variant`
    pub fn new(variant: KernelVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Same configuration with a different kernel
    pub fn with_variant(self, variant: KernelVariant) -> Self {
        Self { variant, ..self }
    }

    /// Reject values the runner cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.num_runs == 0 {
            return Err(BenchError::Config("num_runs must be at least 1".into()));
        }
        if self.thread_count == 0 {
            return Err(BenchError::Config("thread_count must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 10_000);
        assert_eq!(config.num_std_devs, 3);
        assert_eq!(config.thread_count, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_runs_rejected() {
        let config = BenchmarkConfig {
            num_runs: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = BenchmarkConfig {
            thread_count: 0,
            ..BenchmarkConfig::new(KernelVariant::Parallel)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_variant_keeps_other_fields() {
        let config = BenchmarkConfig {
            num_runs: 5,
            ..Default::default()
        }
        .with_variant(KernelVariant::Vectorized);
        assert_eq!(config.variant, KernelVariant::Vectorized);
        assert_eq!(config.num_runs, 5);
    }
}
