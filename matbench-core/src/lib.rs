#![warn(missing_docs)]
//! matbench Core - Benchmark Engine
//!
//! This crate provides the execution environment for matrix-multiplication
//! benchmarks:
//! - `Matrix`, a flat row-major `f32` buffer
//! - `KernelVariant`, the closed set of multiplication strategies behind one contract
//! - CPU affinity pinning for the timing thread and parallel workers
//! - `BenchmarkRunner`, which times repeated kernel invocations on an
//!   injectable monotonic clock and trims outliers into a `TimingReport`
//! - `verify`, tolerance-based comparison of result matrices

mod affinity;
mod config;
mod error;
pub mod kernel;
mod matrix;
mod measure;
mod runner;
mod verify;

pub use affinity::{
    AffinityGuard, PinOutcome, WorkerPlacement, allowed_cpus, online_cpus, pin_current_thread,
};
pub use config::{BenchmarkConfig, DEFAULT_NUM_RUNS, DEFAULT_NUM_STD_DEVS};
pub use error::{BenchError, Result};
pub use kernel::{Kernel, KernelArgs, KernelVariant};
pub use matrix::{Matrix, MatrixDims};
pub use measure::{Clock, MonotonicClock, ScriptedClock};
pub use runner::{BenchmarkRunner, TimingReport};
pub use verify::{DEFAULT_TOLERANCE, Verification, matches, verify};
