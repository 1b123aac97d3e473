//! Benchmark Runner
//!
//! Times repeated invocations of one kernel and condenses the samples into
//! a [`TimingReport`].
//!
//! ```text
//! validate config + shapes ──► pin timing thread ──► warmup (untimed)
//!                                                        │
//!        TimingReport ◄── trim outliers ◄── N timed runs ◄┘
//! ```
//!
//! The loop is strictly sequential: a run starts only after the previous
//! one has returned, so samples never overlap. There is no timeout; a kernel
//! that never returns blocks the benchmark.

use crate::affinity::{AffinityGuard, WorkerPlacement};
use crate::config::BenchmarkConfig;
use crate::error::{BenchError, Result};
use crate::kernel::{Kernel, KernelArgs, check_dims};
use crate::matrix::{Matrix, MatrixDims};
use crate::measure::{Clock, MonotonicClock};
use matbench_stats::{compute_extremes, compute_trimmed_mean};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Timing summary of one benchmark. All times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    /// Kernel name
    pub kernel: String,
    /// Configuration the benchmark ran with
    pub config: BenchmarkConfig,
    /// Operand shapes
    pub dims: MatrixDims,
    /// Per-run durations in invocation order
    pub raw_samples: Vec<f64>,
    /// Mean of all samples
    pub mean: f64,
    /// Population standard deviation of all samples
    pub std_dev: f64,
    /// Mean after excluding samples beyond `num_std_devs` standard deviations
    pub trimmed_mean: f64,
    /// Samples excluded from `trimmed_mean`
    pub excluded_count: usize,
    /// Fastest run
    pub min: f64,
    /// Median run
    pub median: f64,
    /// Slowest run
    pub max: f64,
    /// Whether the timing thread was pinned
    pub pinned: bool,
    /// Non-fatal problems encountered while benchmarking
    pub warnings: Vec<String>,
}

impl TimingReport {
    /// Number of timed runs
    pub fn sample_count(&self) -> usize {
        self.raw_samples.len()
    }

    /// Throughput derived from the trimmed mean
    pub fn gflops(&self) -> f64 {
        if self.trimmed_mean > 0.0 {
            self.dims.flops() / self.trimmed_mean / 1e9
        } else {
            0.0
        }
    }

    /// Speedup of this report relative to `baseline` (>1.0 = faster)
    pub fn speedup_over(&self, baseline: &TimingReport) -> f64 {
        if self.trimmed_mean > 0.0 {
            baseline.trimmed_mean / self.trimmed_mean
        } else {
            0.0
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Runs a kernel `num_runs` times and reports trimmed timing statistics
pub struct BenchmarkRunner<C: Clock = MonotonicClock> {
    config: BenchmarkConfig,
    clock: C,
}

impl BenchmarkRunner<MonotonicClock> {
    /// Runner timing with the wall clock
    pub fn new(config: BenchmarkConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> BenchmarkRunner<C> {
    /// Runner timing with a custom clock
    pub fn with_clock(config: BenchmarkConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Configuration in use
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Benchmark the configured kernel variant
    pub fn run(&mut self, a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<TimingReport> {
        let variant = self.config.variant;
        self.run_kernel(&variant, a, b, out, |_| {})
    }

    /// Benchmark the configured variant, calling `on_run` after each timed run
    /// with the number of runs completed so far
    pub fn run_with_progress(
        &mut self,
        a: &Matrix,
        b: &Matrix,
        out: &mut Matrix,
        on_run: impl FnMut(usize),
    ) -> Result<TimingReport> {
        let variant = self.config.variant;
        self.run_kernel(&variant, a, b, out, on_run)
    }

    /// Benchmark an arbitrary kernel.
    ///
    /// Configuration and shapes are checked before the first invocation; on
    /// error no kernel call is made and no samples exist. A panic in any run
    /// aborts the whole benchmark.
    pub fn run_kernel<K: Kernel + ?Sized>(
        &mut self,
        kernel: &K,
        a: &Matrix,
        b: &Matrix,
        out: &mut Matrix,
        mut on_run: impl FnMut(usize),
    ) -> Result<TimingReport> {
        let config = self.config;
        config.validate()?;
        let dims = check_dims(a, b, out)?;

        let mut samples = Vec::new();
        samples
            .try_reserve_exact(config.num_runs)
            .map_err(|e| BenchError::Allocation {
                elements: config.num_runs,
                message: e.to_string(),
            })?;

        let mut warnings = Vec::new();
        let guard = AffinityGuard::pin(config.cpu_id);
        if let Some(warning) = guard.outcome().warning() {
            tracing::warn!(cpu = config.cpu_id, "{warning}");
            warnings.push(warning);
        }
        let pinned = guard.outcome().is_pinned();
        // Workers spread over the mask the process had before the timing thread was pinned.
        let placement = WorkerPlacement::new(guard.allowed_cpus());

        tracing::info!(
            kernel = kernel.name(),
            %dims,
            runs = config.num_runs,
            warmup = config.warmup_runs,
            threads = config.thread_count,
            "starting benchmark"
        );

        for run in 0..config.warmup_runs {
            invoke(kernel, a, b, out, &config, &placement, "warmup", run)?;
        }

        for run in 0..config.num_runs {
            let start = self.clock.now();
            invoke(kernel, a, b, out, &config, &placement, "measurement", run)?;
            let end = self.clock.now();
            samples.push(end.saturating_sub(start).as_secs_f64());
            on_run(run + 1);
        }

        drop(guard);
        if let Some(warning) = placement.warning() {
            tracing::warn!(kernel = kernel.name(), "{warning}");
            warnings.push(warning);
        }

        let estimate = compute_trimmed_mean(&samples, config.num_std_devs);
        let extremes = compute_extremes(&samples);

        tracing::debug!(
            kernel = kernel.name(),
            mean = estimate.mean,
            std_dev = estimate.std_dev,
            trimmed_mean = estimate.trimmed_mean,
            excluded = estimate.excluded_count,
            "benchmark complete"
        );

        Ok(TimingReport {
            kernel: kernel.name().to_string(),
            config,
            dims,
            raw_samples: samples,
            mean: estimate.mean,
            std_dev: estimate.std_dev,
            trimmed_mean: estimate.trimmed_mean,
            excluded_count: estimate.excluded_count,
            min: extremes.min,
            median: extremes.median,
            max: extremes.max,
            pinned,
            warnings,
        })
    }
}

fn invoke<K: Kernel + ?Sized>(
    kernel: &K,
    a: &Matrix,
    b: &Matrix,
    out: &mut Matrix,
    config: &BenchmarkConfig,
    placement: &WorkerPlacement,
    phase: &'static str,
    run: usize,
) -> Result<()> {
    let args = KernelArgs::new(a, b, out)
        .with_threads(config.thread_count, config.cpu_id)
        .with_placement(placement);
    catch_unwind(AssertUnwindSafe(|| kernel.execute(args))).map_err(|panic| {
        BenchError::KernelFault {
            kernel: kernel.name().to_string(),
            phase,
            run,
            message: panic_message(panic),
        }
    })
}
