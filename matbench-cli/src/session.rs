//! Benchmark session execution
//!
//! Runs one kernel, or every kernel in comparison mode, against the same
//! inputs. Kernels are benchmarked strictly one after another; the result
//! check against the naive reference happens only after all timing is done,
//! so it can use every core without disturbing a measurement.

use indicatif::{ProgressBar, ProgressStyle};
use matbench_core::{
    BenchError, BenchmarkConfig, BenchmarkRunner, KernelVariant, Matrix, MatrixDims, TimingReport,
    verify,
};
use matbench_report::Comparison;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// What to benchmark
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Kernels in run order; the first is the comparison baseline
    pub variants: Vec<KernelVariant>,
    /// Configuration shared by every kernel (its `variant` is replaced per run)
    pub base: BenchmarkConfig,
    /// Verifier tolerance
    pub tolerance: f32,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl SessionPlan {
    /// Whether kernels are compared against each other
    pub fn is_comparison(&self) -> bool {
        self.variants.len() > 1
    }
}

/// Everything a session produced
#[derive(Debug)]
pub struct SessionOutcome {
    /// Timing per kernel, in run order
    pub results: Vec<TimingReport>,
    /// Output matrix per kernel, in run order
    pub outputs: Vec<(KernelVariant, Matrix)>,
    /// Speedup and verification table in comparison mode
    pub comparison: Option<Comparison>,
    /// Result drift warnings
    pub warnings: Vec<String>,
}

/// Random integer-valued inputs for `dims`, reproducible from `seed`
pub fn generate_inputs(dims: MatrixDims, seed: u64) -> Result<(Matrix, Matrix), BenchError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = Matrix::random(dims.m, dims.k, &mut rng)?;
    let b = Matrix::random(dims.k, dims.n, &mut rng)?;
    Ok((a, b))
}

fn progress_bar(show: bool, runs: usize, kernel: KernelVariant) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(runs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(kernel.to_string());
    pb
}

/// Check every output against the first one and tabulate speedups.
///
/// `results` and `outputs` are parallel slices in run order; the first entry
/// is the baseline. Each candidate whose output drifts beyond `tolerance`
/// yields one warning. Returns `None` when there is no baseline.
pub fn compare_to_baseline(
    results: &[TimingReport],
    outputs: &[(KernelVariant, Matrix)],
    tolerance: f32,
) -> Option<(Comparison, Vec<String>)> {
    let (baseline, candidates) = results.split_first()?;
    let ((_, baseline_output), candidate_outputs) = outputs.split_first()?;

    let checks: Vec<_> = candidate_outputs
        .par_iter()
        .map(|(_, candidate)| verify(baseline_output, candidate, tolerance))
        .collect();

    let mut table = Comparison::new(baseline, tolerance);
    let mut warnings = Vec::new();
    for (report, check) in candidates.iter().zip(checks) {
        if !check.matches {
            let warning = format!(
                "{} differs from {}: {}",
                report.kernel,
                baseline.kernel,
                check.describe()
            );
            tracing::warn!("{warning}");
            warnings.push(warning);
        }
        table.push(report, check);
    }
    Some((table, warnings))
}

/// Benchmark every planned kernel on `a * b`.
///
/// Any benchmark error aborts the session; there is no partial outcome.
pub fn run_session(
    plan: &SessionPlan,
    a: &Matrix,
    b: &Matrix,
) -> Result<SessionOutcome, BenchError> {
    let mut results = Vec::with_capacity(plan.variants.len());
    let mut outputs = Vec::with_capacity(plan.variants.len());

    for &variant in &plan.variants {
        let mut out = Matrix::try_zeros(a.rows(), b.cols())?;
        let config = plan.base.with_variant(variant);
        let pb = progress_bar(plan.show_progress, config.num_runs, variant);

        let report = BenchmarkRunner::new(config).run_with_progress(a, b, &mut out, |done| {
            pb.set_position(done as u64)
        });
        match report {
            Ok(report) => {
                pb.finish_with_message(format!("{variant} complete"));
                results.push(report);
                outputs.push((variant, out));
            }
            Err(e) => {
                pb.abandon_with_message(format!("{variant} failed"));
                return Err(e);
            }
        }
    }

    let compared = if plan.is_comparison() {
        compare_to_baseline(&results, &outputs, plan.tolerance)
    } else {
        None
    };
    let (comparison, warnings) = match compared {
        Some((table, warnings)) => (Some(table), warnings),
        None => (None, Vec::new()),
    };

    Ok(SessionOutcome {
        results,
        outputs,
        comparison,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(variants: Vec<KernelVariant>) -> SessionPlan {
        SessionPlan {
            variants,
            base: BenchmarkConfig {
                num_runs: 3,
                thread_count: 2,
                ..BenchmarkConfig::default()
            },
            tolerance: matbench_core::DEFAULT_TOLERANCE,
            show_progress: false,
        }
    }

    #[test]
    fn test_inputs_are_seeded() {
        let dims = MatrixDims { m: 3, k: 4, n: 5 };
        let (a1, b1) = generate_inputs(dims, 7).unwrap();
        let (a2, b2) = generate_inputs(dims, 7).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_eq!((a1.rows(), a1.cols()), (3, 4));
        assert_eq!((b1.rows(), b1.cols()), (4, 5));
        assert!(a1.as_slice().iter().all(|&x| (0.0..10.0).contains(&x) && x.fract() == 0.0));
    }

    #[test]
    fn test_single_kernel_session() {
        let (a, b) = generate_inputs(MatrixDims { m: 4, k: 5, n: 6 }, 1).unwrap();
        let outcome = run_session(&plan(vec![KernelVariant::ScalarOptimized]), &a, &b).unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].kernel, "scalar-optimized");
        assert_eq!(outcome.results[0].sample_count(), 3);
        assert!(outcome.comparison.is_none());
        assert_eq!(outcome.outputs[0].1.rows(), 4);
        assert_eq!(outcome.outputs[0].1.cols(), 6);
    }

    #[test]
    fn test_comparison_session_verifies_all_kernels() {
        let (a, b) = generate_inputs(MatrixDims { m: 9, k: 13, n: 17 }, 3).unwrap();
        let outcome = run_session(&plan(KernelVariant::ALL.to_vec()), &a, &b).unwrap();

        let cmp = outcome.comparison.unwrap();
        assert_eq!(cmp.baseline, "naive");
        assert_eq!(cmp.entries.len(), 4);
        assert!(cmp.all_verified());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_drifted_candidate_is_flagged() {
        let (a, b) = generate_inputs(MatrixDims { m: 5, k: 4, n: 3 }, 11).unwrap();
        let p = plan(vec![KernelVariant::Naive, KernelVariant::ScalarOptimized]);
        let mut outcome = run_session(&p, &a, &b).unwrap();
        assert!(outcome.warnings.is_empty());

        outcome.outputs[1].1.as_mut_slice()[7] += 0.5;
        let (table, warnings) =
            compare_to_baseline(&outcome.results, &outcome.outputs, p.tolerance).unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("scalar-optimized differs from naive: "));
        assert!(warnings[0].contains("1 of 15 elements exceed tolerance"));
        assert!(warnings[0].contains("max abs diff"));
        assert!(!table.all_verified());
        let entry = table.entry("scalar-optimized").unwrap();
        let check = entry.verification.as_ref().unwrap();
        assert!(!check.matches);
        assert_eq!(check.worst_index, Some((2, 1)));
    }

    #[test]
    fn test_compare_without_baseline() {
        assert!(compare_to_baseline(&[], &[], 1e-4).is_none());
    }

    #[test]
    fn test_zero_runs_aborts_session() {
        let (a, b) = generate_inputs(MatrixDims { m: 2, k: 2, n: 2 }, 0).unwrap();
        let mut p = plan(vec![KernelVariant::Naive]);
        p.base.num_runs = 0;
        assert!(run_session(&p, &a, &b).unwrap_err().is_configuration());
    }
}
