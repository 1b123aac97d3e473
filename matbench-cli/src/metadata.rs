//! Host Description
//!
//! Describes the machine a session ran on: CPU model, the CPUs the process
//! may be scheduled on, and the SIMD path the vectorized kernel takes. The
//! allowed set is what matters for reading pinned timings, since `--cpu-id`
//! and the parallel workers only land on CPUs inside it.

use chrono::Utc;
use matbench_core::{allowed_cpus, kernel, online_cpus};
use matbench_report::{ReportMeta, SystemInfo};

/// `/proc/cpuinfo` keys that carry a model name, in order of preference.
/// x86 uses `model name`; many ARM kernels only expose `Processor` or `Hardware`.
const CPU_MODEL_KEYS: [&str; 4] = ["model name", "Processor", "Hardware", "cpu model"];

/// Build report metadata for a session whose inputs came from `seed`
pub fn build_report_meta(seed: u64) -> ReportMeta {
    ReportMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        system: describe_host(),
        seed,
    }
}

/// Describe the current host
pub fn describe_host() -> SystemInfo {
    let cpu_model = read_cpuinfo()
        .as_deref()
        .and_then(parse_cpu_model)
        .unwrap_or_else(|| "unknown".to_string());

    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu_model,
        online_cpus: online_cpus(),
        allowed_cpus: allowed_cpus(),
        simd_backend: kernel::vectorized::backend().to_string(),
    }
}

#[cfg(target_os = "linux")]
fn read_cpuinfo() -> Option<String> {
    std::fs::read_to_string("/proc/cpuinfo").ok()
}

#[cfg(not(target_os = "linux"))]
fn read_cpuinfo() -> Option<String> {
    None
}

/// First non-empty model name in `/proc/cpuinfo` text
fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    CPU_MODEL_KEYS.iter().find_map(|wanted| {
        cpuinfo.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            let value = value.trim();
            (key.trim() == *wanted && !value.is_empty()).then(|| value.to_string())
        })
    })
}
