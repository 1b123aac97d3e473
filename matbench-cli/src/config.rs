//! Configuration loading from matbench.toml
//!
//! Defaults for the benchmark session can be kept in a `matbench.toml` file.
//! The file is discovered by walking up from the current directory; flags
//! given on the command line always win over values from the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched for by [`MatbenchConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "matbench.toml";

/// matbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatbenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration; unset fields fall back to built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Timed runs per kernel
    #[serde(default)]
    pub runs: Option<usize>,
    /// Outlier band in standard deviations
    #[serde(default)]
    pub nstdevs: Option<u32>,
    /// Untimed warmup runs per kernel
    #[serde(default)]
    pub warmup: Option<usize>,
    /// Worker threads for the parallel kernel
    #[serde(default)]
    pub threads: Option<usize>,
    /// CPU the timing thread is pinned to
    #[serde(default)]
    pub cpu: Option<usize>,
    /// Verifier tolerance
    #[serde(default)]
    pub tolerance: Option<f32>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format: "human", "json" or "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory receiving exported matrices
    #[serde(default = "default_result_dir")]
    pub result_dir: String,
    /// Export A, B and every result matrix as CSV
    #[serde(default = "default_true")]
    pub export: bool,
    /// Print the matrices to stdout
    #[serde(default)]
    pub print_matrices: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            result_dir: default_result_dir(),
            export: true,
            print_matrices: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_result_dir() -> String {
    "Result".to_string()
}
fn default_true() -> bool {
    true
}

impl MatbenchConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for a configuration file.
    ///
    /// A file that exists but fails to parse is logged and ignored.
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            "ignoring configuration: {e}"
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# matbench configuration
# Values given on the command line override this file.

[runner]
# Timed runs per kernel (default 10000)
# runs = 10000
# Exclude samples more than this many standard deviations from the mean (0 disables)
# nstdevs = 3
# Untimed warmup runs per kernel
# warmup = 0
# Worker threads for the parallel kernel
# threads = 1
# CPU the timing thread is pinned to
# cpu = 0
# Verifier tolerance used in comparison mode
# tolerance = 1e-4

[output]
# Report format: "human", "json" or "csv"
format = "human"
# Directory receiving A.csv, B.csv and R_<kernel>.csv
result_dir = "Result"
# Export matrices as CSV
export = true
# Print A, B and the results to stdout
print_matrices = false
"#
        .to_string()
    }
}
