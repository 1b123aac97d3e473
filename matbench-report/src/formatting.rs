//! Output Formatting
//!
//! Human-readable rendering of a [`Report`] and of individual matrices.
//!
//! Generates terminal-friendly output with:
//! - Per-kernel timing (trimmed mean, spread, excluded samples, throughput)
//! - A speedup table against the baseline in comparison mode
//! - Verification outcome and collected warnings

use crate::report::Report;
use matbench_core::Matrix;

/// Render a matrix with two decimals per element, one row per line
pub fn format_matrix(name: &str, matrix: &Matrix) -> String {
    let mut out = format!("{name}:\n");
    for row in matrix.rows_iter() {
        for value in row {
            out.push_str(&format!("{:.2} ", value));
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Compact CPU list in the style of `taskset -c`, e.g. `0-3,6,8-9`
pub fn format_cpu_list(cpus: &[usize]) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &cpu in cpus {
        match ranges.last_mut() {
            Some((_, end)) if end.checked_add(1) == Some(cpu) => *end = cpu,
            _ => ranges.push((cpu, cpu)),
        }
    }
    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();
    let system = &report.meta.system;

    output.push('\n');
    output.push_str("matbench Results\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  cpu: {} ({} online, allowed {})\n",
        system.cpu_model,
        system.online_cpus,
        format_cpu_list(&system.allowed_cpus)
    ));
    output.push_str(&format!(
        "  simd: {}  seed: {}\n",
        system.simd_backend, report.meta.seed
    ));
    output.push('\n');

    for result in &report.results {
        output.push_str(&format!(
            "{} Implementation Runtime: {:.6} seconds\n",
            result.kernel, result.trimmed_mean
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "      dims: {}  threads: {}  cpu: {}{}\n",
            result.dims,
            result.config.thread_count,
            result.config.cpu_id,
            if result.pinned { "" } else { " (unpinned)" }
        ));
        output.push_str(&format!(
            "      mean: {:.6} s  stddev: {:.6} s  trimmed: {:.6} s\n",
            result.mean, result.std_dev, result.trimmed_mean
        ));
        output.push_str(&format!(
            "      min: {:.6} s  median: {:.6} s  max: {:.6} s\n",
            result.min, result.median, result.max
        ));
        output.push_str(&format!(
            "      runs: {}  excluded: {} (>{} stddev)  throughput: {:.3} GFLOP/s\n",
            result.sample_count(),
            result.excluded_count,
            result.config.num_std_devs,
            result.gflops()
        ));
        output.push('\n');
    }

    if let Some(cmp) = &report.comparison {
        output.push_str(&format!("Speedup vs {}\n", cmp.baseline));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        let width = cmp
            .entries
            .iter()
            .map(|e| e.kernel.len())
            .max()
            .unwrap_or(10);

        output.push_str(&format!(
            "  {:<width$}  {:>14}  {:>10}  {:>8}\n",
            "Kernel", "Trimmed (s)", "Speedup", "Result",
        ));
        output.push_str(&format!("  {}\n", "-".repeat(width + 38)));

        for entry in &cmp.entries {
            let result = match &entry.verification {
                None => "ref",
                Some(v) if v.matches => "ok",
                Some(_) => "MISMATCH",
            };
            output.push_str(&format!(
                "  {:<width$}  {:>14.6}  {:>9.2}x  {:>8}\n",
                entry.kernel, entry.trimmed_mean, entry.speedup, result,
            ));
        }
        output.push('\n');
    }

    let warnings: Vec<_> = report.all_warnings().collect();
    if !warnings.is_empty() {
        output.push_str("Warnings\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for warning in warnings {
            output.push_str(&format!("  ! {warning}\n"));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Comparison;
    use crate::report::tests::{meta, timing};
    use matbench_core::{KernelVariant, verify};

    #[test]
    fn test_format_matrix() {
        let m = Matrix::from_rows(&[&[1.0, 2.5], &[3.0, 4.126]]).unwrap();
        assert_eq!(
            format_matrix("Matrix A", &m),
            "Matrix A:\n1.00 2.50 \n3.00 4.13 \n\n"
        );
    }

    #[test]
    fn test_format_cpu_list() {
        assert_eq!(format_cpu_list(&[0, 1, 2, 3, 6, 8, 9]), "0-3,6,8-9");
        assert_eq!(format_cpu_list(&[5]), "5");
        assert_eq!(format_cpu_list(&[]), "");
    }

    #[test]
    fn test_human_output_single() {
        let mut meta = meta();
        meta.system.allowed_cpus = vec![0, 1, 2, 3];
        meta.system.online_cpus = 8;
        let mut report = Report::new(meta);
        report.results.push(timing(KernelVariant::Vectorized, &[0.25]));

        let text = format_human_output(&report);
        assert!(text.contains("vectorized Implementation Runtime: 0.250000 seconds"));
        assert!(text.contains("(8 online, allowed 0-3)"));
        assert!(!text.contains("Speedup vs"));
        assert!(!text.contains("Warnings"));
    }

    #[test]
    fn test_human_output_comparison_and_warnings() {
        let naive = timing(KernelVariant::Naive, &[0.4]);
        let vec = timing(KernelVariant::Vectorized, &[0.1]);
        let r = Matrix::zeros(1, 2);
        let c = Matrix::from_vec(1, 2, vec![0.0, 1.0]).unwrap();
        let mut cmp = Comparison::new(&naive, 1e-4);
        cmp.push(&vec, verify(&r, &c, 1e-4));

        let mut report = Report::new(meta());
        report.results = vec![naive, vec];
        report.comparison = Some(cmp);
        report.warnings.push("vectorized drifted".to_string());

        let text = format_human_output(&report);
        assert!(text.contains("Speedup vs naive"));
        assert!(text.contains("4.00x"));
        assert!(text.contains("MISMATCH"));
        assert!(text.contains("! vectorized drifted"));
    }
}
