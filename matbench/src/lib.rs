#![warn(missing_docs)]
//! # matbench
//!
//! Benchmark harness for dense single-precision matrix multiplication.
//!
//! matbench times four implementations of `R = A * B` under controlled
//! conditions and reports outlier-trimmed runtimes:
//! - **Naive**: i-j-k triple loop, the semantic reference
//! - **Scalar-optimized**: i-k-j loop order for stride-1 access
//! - **Vectorized**: 8-wide SIMD over output columns (AVX2+FMA when available)
//! - **Parallel**: row partitions across pinned, scoped worker threads
//!
//! Every run is pinned to a chosen CPU, timed on a monotonic clock, and
//! summarized with a Welford mean/standard deviation plus a trimmed mean that
//! excludes samples beyond a configurable number of standard deviations.
//!
//! ## Quick Start
//!
//! ```no_run
//! use matbench::{BenchmarkConfig, BenchmarkRunner, KernelVariant, Matrix};
//!
//! let a = Matrix::zeros(64, 64);
//! let b = Matrix::zeros(64, 64);
//! let mut r = Matrix::zeros(64, 64);
//!
//! let config = BenchmarkConfig {
//!     num_runs: 100,
//!     ..BenchmarkConfig::new(KernelVariant::Vectorized)
//! };
//! let report = BenchmarkRunner::new(config).run(&a, &b, &mut r)?;
//! println!("{:.6} s", report.trimmed_mean);
//! # Ok::<(), matbench::BenchError>(())
//! ```

// Re-export core types
pub use matbench_core::{
    AffinityGuard, BenchError, BenchmarkConfig, BenchmarkRunner, Clock, DEFAULT_NUM_RUNS,
    DEFAULT_NUM_STD_DEVS, DEFAULT_TOLERANCE, Kernel, KernelArgs, KernelVariant, Matrix,
    MatrixDims, MonotonicClock, PinOutcome, ScriptedClock, TimingReport, Verification, kernel,
    matches, online_cpus, pin_current_thread, verify,
};

// Re-export stats
pub use matbench_stats::{RunningStats, TrimmedMean, compute_extremes, compute_trimmed_mean};

// Re-export reporting
pub use matbench_report::{
    Comparison, ComparisonEntry, OutputFormat, Report, ReportError, format_matrix_csv,
    write_matrix_csv,
};

// Re-export the CLI entry points
pub use matbench_cli::{Cli, run, run_with_cli};
