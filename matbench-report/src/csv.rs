//! CSV Output
//!
//! Two CSV shapes are produced: the matrix export (one matrix row per line,
//! six decimal places, comma-separated) and a one-row-per-kernel timing summary.

use crate::error::ReportError;
use crate::report::Report;
use matbench_core::Matrix;
use std::path::{Path, PathBuf};

/// Render a matrix as CSV
pub fn format_matrix_csv(matrix: &Matrix) -> String {
    let mut out = String::with_capacity(matrix.len() * 12);
    for row in matrix.rows_iter() {
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            out.push_str(&format!("{:.6}", value));
        }
        out.push('\n');
    }
    out
}

/// Write a matrix as CSV to `path`
pub fn write_matrix_csv(path: &Path, matrix: &Matrix) -> Result<(), ReportError> {
    std::fs::write(path, format_matrix_csv(matrix)).map_err(|e| ReportError::io(path, e))?;
    tracing::debug!(
        path = %path.display(),
        rows = matrix.rows(),
        cols = matrix.cols(),
        "exported matrix"
    );
    Ok(())
}

/// Create the result directory if it does not exist yet.
///
/// Returns `true` when the directory was created by this call.
pub fn ensure_result_dir(dir: &Path) -> Result<bool, ReportError> {
    if dir.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
    tracing::info!(path = %dir.display(), "created result directory");
    Ok(true)
}

/// Export file name for the result of `kernel`
pub fn matrix_file_name(kernel: &str) -> PathBuf {
    PathBuf::from(format!("R_{kernel}.csv"))
}

/// Generate the timing summary CSV, one row per kernel.
///
/// Times are in seconds.
pub fn generate_csv_report(report: &Report) -> String {
    let mut csv = String::from(concat!(
        "kernel,m,k,n,threads,cpu,runs,",
        "mean_s,std_dev_s,trimmed_mean_s,excluded,min_s,median_s,max_s,",
        "gflops,speedup,verified\n",
    ));

    for result in &report.results {
        let entry = report
            .comparison
            .as_ref()
            .and_then(|c| c.entry(&result.kernel));
        let speedup = entry.map(|e| format!("{:.4}", e.speedup)).unwrap_or_default();
        let verified = entry
            .and_then(|e| e.verification.as_ref())
            .map(|v| v.matches.to_string())
            .unwrap_or_default();

        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{:.9},{:.9},{:.9},{},{:.9},{:.9},{:.9},{:.4},{},{}\n",
            escape_csv(&result.kernel),
            result.dims.m,
            result.dims.k,
            result.dims.n,
            result.config.thread_count,
            result.config.cpu_id,
            result.sample_count(),
            result.mean,
            result.std_dev,
            result.trimmed_mean,
            result.excluded_count,
            result.min,
            result.median,
            result.max,
            result.gflops(),
            speedup,
            verified,
        ));
    }

    csv
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{meta, timing};
    use crate::report::{Comparison, Report};
    use matbench_core::{KernelVariant, verify};

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("matbench-report-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_matrix_csv_format() {
        let m = Matrix::from_rows(&[&[1.0, 2.0], &[3.5, -4.25]]).unwrap();
        assert_eq!(
            format_matrix_csv(&m),
            "1.000000,2.000000\n3.500000,-4.250000\n"
        );
    }

    #[test]
    fn test_single_column_has_no_commas() {
        let m = Matrix::from_rows(&[&[7.0], &[8.0]]).unwrap();
        assert_eq!(format_matrix_csv(&m), "7.000000\n8.000000\n");
    }

    #[test]
    fn test_write_and_ensure_dir() {
        let dir = scratch_dir("write").join("Result");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_result_dir(&dir).unwrap());
        assert!(!ensure_result_dir(&dir).unwrap());

        let path = dir.join(matrix_file_name("naive"));
        let m = Matrix::from_rows(&[&[1.0, 2.0]]).unwrap();
        write_matrix_csv(&path, &m).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.000000,2.000000\n");
        assert!(path.ends_with("R_naive.csv"));

        let _ = std::fs::remove_dir_all(scratch_dir("write"));
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let path = scratch_dir("missing").join("nope").join("A.csv");
        let err = write_matrix_csv(&path, &Matrix::zeros(1, 1)).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn test_timing_csv_rows() {
        let naive = timing(KernelVariant::Naive, &[0.2]);
        let opt = timing(KernelVariant::ScalarOptimized, &[0.1]);
        let m = Matrix::zeros(2, 2);
        let mut cmp = Comparison::new(&naive, 1e-4);
        cmp.push(&opt, verify(&m, &m, 1e-4));

        let mut report = Report::new(meta());
        report.results = vec![naive, opt];
        report.comparison = Some(cmp);

        let csv = generate_csv_report(&report);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("kernel,m,k,n"));
        assert!(lines[1].starts_with("naive,2,3,2,"));
        assert!(lines[1].ends_with(",1.0000,"));
        assert!(lines[2].starts_with("scalar-optimized,"));
        assert!(lines[2].ends_with(",2.0000,true"));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
    }
}
