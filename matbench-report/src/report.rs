//! Report Data Structures

use chrono::{DateTime, Utc};
use matbench_core::{TimingReport, Verification};
use serde::{Deserialize, Serialize};

/// Complete benchmark session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Session metadata
    pub meta: ReportMeta,
    /// One timing report per benchmarked kernel, in run order
    pub results: Vec<TimingReport>,
    /// Cross-kernel comparison, present in comparison mode
    pub comparison: Option<Comparison>,
    /// Session-level warnings (result drift, export problems)
    pub warnings: Vec<String>,
}

impl Report {
    /// Empty report with the given metadata
    pub fn new(meta: ReportMeta) -> Self {
        Self {
            meta,
            results: Vec::new(),
            comparison: None,
            warnings: Vec::new(),
        }
    }

    /// Every warning in the report, session-level first
    pub fn all_warnings(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .chain(self.results.iter().flat_map(|r| r.warnings.iter()))
            .map(String::as_str)
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// matbench version
    pub version: String,
    /// UTC time of report generation
    pub timestamp: DateTime<Utc>,
    /// Host description
    pub system: SystemInfo,
    /// Input generation seed
    pub seed: u64,
}

/// System information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu_model: String,
    /// Online CPU count
    pub online_cpus: usize,
    /// CPUs the process may run on, ascending
    pub allowed_cpus: Vec<usize>,
    /// Backend the vectorized kernel dispatches to
    pub simd_backend: String,
}

/// Speedup table of every kernel against a baseline, with result verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Baseline kernel name
    pub baseline: String,
    /// Verifier tolerance
    pub tolerance: f32,
    /// Entries in run order, baseline first
    pub entries: Vec<ComparisonEntry>,
}

/// Single row of a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Kernel name
    pub kernel: String,
    /// Trimmed mean runtime in seconds
    pub trimmed_mean: f64,
    /// Speedup vs baseline (1.0 = same, >1.0 = faster, <1.0 = slower)
    pub speedup: f64,
    /// Whether this is the baseline
    pub is_baseline: bool,
    /// Result check against the baseline output; absent for the baseline itself
    pub verification: Option<Verification>,
}

impl Comparison {
    /// Start a comparison whose first entry is `baseline`
    pub fn new(baseline: &TimingReport, tolerance: f32) -> Self {
        Self {
            baseline: baseline.kernel.clone(),
            tolerance,
            entries: vec![ComparisonEntry {
                kernel: baseline.kernel.clone(),
                trimmed_mean: baseline.trimmed_mean,
                speedup: 1.0,
                is_baseline: true,
                verification: None,
            }],
        }
    }

    /// Add a candidate measured against the baseline
    pub fn push(&mut self, candidate: &TimingReport, verification: Verification) {
        let baseline_mean = self.entries[0].trimmed_mean;
        let speedup = if candidate.trimmed_mean > 0.0 {
            baseline_mean / candidate.trimmed_mean
        } else {
            0.0
        };
        self.entries.push(ComparisonEntry {
            kernel: candidate.kernel.clone(),
            trimmed_mean: candidate.trimmed_mean,
            speedup,
            is_baseline: false,
            verification: Some(verification),
        });
    }

    /// True when every candidate matched the baseline output
    pub fn all_verified(&self) -> bool {
        self.entries
            .iter()
            .filter_map(|e| e.verification.as_ref())
            .all(|v| v.matches)
    }

    /// Entry for `kernel`
    pub fn entry(&self, kernel: &str) -> Option<&ComparisonEntry> {
        self.entries.iter().find(|e| e.kernel == kernel)
    }
}
