#![warn(missing_docs)]
//! matbench Statistical Engine
//!
//! Turns a sequence of raw timing samples into a defensible runtime estimate:
//! - Numerically stable mean/variance via Welford's online algorithm
//! - Trimmed mean excluding samples beyond N standard deviations
//! - Percentile calculation for min/median/max reporting

mod outliers;
mod percentiles;
mod welford;

pub use outliers::{TrimmedMean, compute_trimmed_mean};
pub use percentiles::{Extremes, compute_extremes, compute_percentile};
pub use welford::RunningStats;

/// Default number of standard deviations beyond which a sample is excluded
pub const DEFAULT_NUM_STD_DEVS: u32 = 3;

