//! Matrix-multiplication kernels.
//!
//! Every kernel computes `R = A * B` over row-major `f32` slices and fully
//! overwrites `R`; none of them accumulates into stale output.
//!
//! Available implementations:
//! - `naive`: i-j-k triple loop, the semantic reference
//! - `scalar_opt`: i-k-j loop order for stride-1 access to B and R
//! - `vectorized`: 8 output columns per step (AVX2+FMA when detected)
//! - `parallel`: row partitions across scoped, pinned worker threads

pub mod naive;
pub mod parallel;
pub mod scalar_opt;
pub mod vectorized;

use crate::affinity::WorkerPlacement;
use crate::error::{BenchError, Result};
use crate::matrix::{Matrix, MatrixDims};
use serde::{Deserialize, Serialize};

/// Arguments for one kernel invocation.
///
/// Borrows its operands for exactly one call; a kernel cannot retain them.
#[derive(Debug)]
pub struct KernelArgs<'a> {
    /// Left operand (`m x k`)
    pub a: &'a Matrix,
    /// Right operand (`k x n`)
    pub b: &'a Matrix,
    /// Output (`m x n`), overwritten
    pub out: &'a mut Matrix,
    /// Worker threads hint
    pub thread_count: usize,
    /// First CPU for worker pinning
    pub cpu_id: usize,
    /// Shared worker placement; kernels detect their own when absent
    pub placement: Option<&'a WorkerPlacement>,
}

impl<'a> KernelArgs<'a> {
    /// Bundle operands with a single-threaded hint
    pub fn new(a: &'a Matrix, b: &'a Matrix, out: &'a mut Matrix) -> Self {
        Self {
            a,
            b,
            out,
            thread_count: 1,
            cpu_id: 0,
            placement: None,
        }
    }

    /// Set the worker thread hint and first worker CPU
    pub fn with_threads(mut self, thread_count: usize, cpu_id: usize) -> Self {
        self.thread_count = thread_count;
        self.cpu_id = cpu_id;
        self
    }

    /// Place parallel workers with `placement` and collect their pin failures there
    pub fn with_placement(mut self, placement: &'a WorkerPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Check the shape precondition shared by all kernels
    pub fn validate(&self) -> Result<MatrixDims> {
        check_dims(self.a, self.b, self.out)
    }
}

/// Validate `A.cols == B.rows`, `R.rows == A.rows` and `R.cols == B.cols`
pub fn check_dims(a: &Matrix, b: &Matrix, out: &Matrix) -> Result<MatrixDims> {
    if a.cols() != b.rows() || out.rows() != a.rows() || out.cols() != b.cols() {
        return Err(BenchError::DimensionMismatch {
            a_rows: a.rows(),
            a_cols: a.cols(),
            b_rows: b.rows(),
            b_cols: b.cols(),
            r_rows: out.rows(),
            r_cols: out.cols(),
        });
    }
    Ok(MatrixDims {
        m: a.rows(),
        k: a.cols(),
        n: b.cols(),
    })
}

/// A strategy that computes `R = A * B`.
///
/// `execute` must be synchronous: any threads it starts are joined before
/// it returns. Shape violations are caller bugs and panic.
pub trait Kernel: Sync {
    /// Display name used in reports
    fn name(&self) -> &str;

    /// Overwrite `args.out` with `args.a * args.b`
    fn execute(&self, args: KernelArgs<'_>);
}

/// The closed set of kernel implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelVariant {
    /// i-j-k reference loop
    Naive,
    /// Cache-friendly i-k-j loop
    #[serde(alias = "opt")]
    ScalarOptimized,
    /// SIMD over output columns
    #[serde(alias = "vec")]
    Vectorized,
    /// Row-partitioned worker threads
    #[serde(alias = "para")]
    Parallel,
}

impl KernelVariant {
    /// Every variant, reference first
    pub const ALL: [KernelVariant; 4] = [
        KernelVariant::Naive,
        KernelVariant::ScalarOptimized,
        KernelVariant::Vectorized,
        KernelVariant::Parallel,
    ];

    /// Long name, also accepted by `FromStr`
    pub fn as_str(self) -> &'static str {
        match self {
            KernelVariant::Naive => "naive",
            KernelVariant::ScalarOptimized => "scalar-optimized",
            KernelVariant::Vectorized => "vectorized",
            KernelVariant::Parallel => "parallel",
        }
    }

    /// Short command-line name
    pub fn short_name(self) -> &'static str {
        match self {
            KernelVariant::Naive => "naive",
            KernelVariant::ScalarOptimized => "opt",
            KernelVariant::Vectorized => "vec",
            KernelVariant::Parallel => "para",
        }
    }

    /// Whether results are bit-identical across repeated runs and equal to
    /// the naive reference summation order
    pub fn is_exact(self) -> bool {
        matches!(self, KernelVariant::Naive | KernelVariant::ScalarOptimized)
    }
}

impl std::fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KernelVariant {
    type Err = BenchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "naive" => Ok(KernelVariant::Naive),
            "opt" | "scalar-optimized" | "scalar_optimized" => Ok(KernelVariant::ScalarOptimized),
            "vec" | "vectorized" => Ok(KernelVariant::Vectorized),
            "para" | "parallel" | "parallelized" => Ok(KernelVariant::Parallel),
            other => Err(BenchError::UnknownVariant(other.to_string())),
        }
    }
}

impl Kernel for KernelVariant {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn execute(&self, args: KernelArgs<'_>) {
        let dims = match args.validate() {
            Ok(dims) => dims,
            Err(e) => panic!("{e}"),
        };
        let MatrixDims { m, k, n } = dims;
        let (a, b) = (args.a.as_slice(), args.b.as_slice());
        let c = args.out.as_mut_slice();

        match self {
            KernelVariant::Naive => naive::matmul_naive(a, b, c, m, n, k),
            KernelVariant::ScalarOptimized => scalar_opt::matmul_ikj(a, b, c, m, n, k),
            KernelVariant::Vectorized => vectorized::matmul_vectorized(a, b, c, m, n, k),
            KernelVariant::Parallel => {
                let (threads, cpu) = (args.thread_count, args.cpu_id);
                match args.placement {
                    Some(placement) => {
                        parallel::matmul_parallel(a, b, c, m, n, k, threads, cpu, placement)
                    }
                    None => {
                        let placement = WorkerPlacement::detect();
                        parallel::matmul_parallel(a, b, c, m, n, k, threads, cpu, &placement)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> (Matrix, Matrix) {
        let a = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::from_rows(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]).unwrap();
        (a, b)
    }

    #[test]
    fn test_every_variant_on_known_product() {
        let (a, b) = sample_inputs();
        for variant in KernelVariant::ALL {
            let mut out = Matrix::zeros(2, 2);
            variant.execute(KernelArgs::new(&a, &b, &mut out).with_threads(2, 0));
            let expected = [58.0, 64.0, 139.0, 154.0];
            for (got, want) in out.as_slice().iter().zip(expected) {
                if variant.is_exact() {
                    assert_eq!(*got, want, "{variant}");
                } else {
                    assert!((got - want).abs() < 1e-5, "{variant}: {got} vs {want}");
                }
            }
        }
    }

    #[test]
    fn test_stale_output_is_overwritten() {
        let (a, b) = sample_inputs();
        for variant in KernelVariant::ALL {
            let mut out = Matrix::from_vec(2, 2, vec![1e6; 4]).unwrap();
            variant.execute(KernelArgs::new(&a, &b, &mut out).with_threads(3, 0));
            assert!((out[(0, 0)] - 58.0).abs() < 1e-5, "{variant}");
        }
    }

    #[test]
    fn test_check_dims_rejects_inner_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(4, 2);
        let out = Matrix::zeros(2, 2);
        assert!(check_dims(&a, &b, &out).is_err());
    }

    #[test]
    fn test_check_dims_rejects_bad_output() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(3, 2);
        assert!(check_dims(&a, &b, &Matrix::zeros(2, 3)).is_err());
        let dims = check_dims(&a, &b, &Matrix::zeros(2, 2)).unwrap();
        assert_eq!(dims, MatrixDims { m: 2, k: 3, n: 2 });
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn test_execute_panics_on_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 2);
        let mut out = Matrix::zeros(2, 2);
        KernelVariant::Naive.execute(KernelArgs::new(&a, &b, &mut out));
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("naive".parse::<KernelVariant>().unwrap(), KernelVariant::Naive);
        assert_eq!("opt".parse::<KernelVariant>().unwrap(), KernelVariant::ScalarOptimized);
        assert_eq!("VEC".parse::<KernelVariant>().unwrap(), KernelVariant::Vectorized);
        assert_eq!("parallelized".parse::<KernelVariant>().unwrap(), KernelVariant::Parallel);
        assert!("both".parse::<KernelVariant>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for variant in KernelVariant::ALL {
            assert_eq!(variant.to_string().parse::<KernelVariant>().unwrap(), variant);
            assert_eq!(variant.short_name().parse::<KernelVariant>().unwrap(), variant);
        }
    }
}
