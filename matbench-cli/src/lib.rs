#![warn(missing_docs)]
//! matbench CLI Library
//!
//! Command-line driver for the matrix-multiplication benchmark: parses
//! arguments, layers them over `matbench.toml`, prompts for missing matrix
//! dimensions, runs the session and writes the report and matrix exports.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     matbench_cli::run()
//! }
//! ```

mod config;
mod metadata;
mod prompt;
mod session;

pub use config::{CONFIG_FILE_NAME, MatbenchConfig, OutputConfig, RunnerConfig};
pub use metadata::build_report_meta;
pub use prompt::{PartialDims, resolve_dims};
pub use session::{
    SessionOutcome, SessionPlan, compare_to_baseline, generate_inputs, run_session,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use matbench_core::{
    BenchmarkConfig, DEFAULT_NUM_RUNS, DEFAULT_NUM_STD_DEVS, DEFAULT_TOLERANCE, KernelVariant,
    Matrix,
};
use matbench_report::{
    OutputFormat, Report, ensure_result_dir, format_matrix, matrix_file_name, write_matrix_csv,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Kernel selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Benchmark one kernel
    Single(KernelVariant),
    /// Benchmark every kernel and compare against naive
    Both,
}

impl Selection {
    /// Kernels to run, baseline first
    pub fn variants(self) -> Vec<KernelVariant> {
        match self {
            Selection::Single(v) => vec![v],
            Selection::Both => KernelVariant::ALL.to_vec(),
        }
    }
}

impl std::str::FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("both") || s.eq_ignore_ascii_case("all") {
            return Ok(Selection::Both);
        }
        s.parse::<KernelVariant>()
            .map(Selection::Single)
            .map_err(|e| e.to_string())
    }
}

/// matbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "matbench")]
#[command(
    author,
    version,
    about = "matbench - naive, scalar, vectorized and parallel matrix multiplication benchmark"
)]
pub struct Cli {
    /// Optional subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Implementation: naive, opt, vec, para or both
    #[arg(short = 'i', long = "impl")]
    pub implementation: Option<Selection>,

    /// Number of threads for the parallel kernel
    #[arg(short = 'n', long = "nthreads", value_parser = clap::value_parser!(u64).range(1..))]
    pub nthreads: Option<u64>,

    /// Main CPU for the benchmark
    #[arg(short, long)]
    pub cpu: Option<usize>,

    /// Timed runs per kernel [default: 10000]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub runs: Option<u64>,

    /// Exclude samples further than this many standard deviations from the mean [default: 3]
    #[arg(short = 's', long = "nstdevs")]
    pub nstdevs: Option<u32>,

    /// Untimed warmup runs per kernel
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Rows of matrix A (prompted if omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub rows_a: Option<u64>,

    /// Columns of matrix A, rows of matrix B (prompted if omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub cols_a: Option<u64>,

    /// Columns of matrix B (prompted if omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub cols_b: Option<u64>,

    /// Seed for input generation (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for exported matrices [default: Result]
    #[arg(long)]
    pub result_dir: Option<PathBuf>,

    /// Skip CSV export of the matrices
    #[arg(long)]
    pub no_export: bool,

    /// Print A, B and every result matrix
    #[arg(long)]
    pub print_matrices: bool,

    /// Verifier tolerance for comparison mode [default: 1e-4]
    #[arg(long)]
    pub tolerance: Option<f32>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default matbench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Session settings after layering CLI flags over the configuration file
#[derive(Debug, Clone)]
pub struct Settings {
    /// Kernels to run
    pub selection: Selection,
    /// Per-kernel benchmark configuration (variant is replaced per run)
    pub base: BenchmarkConfig,
    /// Verifier tolerance
    pub tolerance: f32,
    /// Report format
    pub format: OutputFormat,
    /// Matrix export directory, `None` when export is disabled
    pub export_dir: Option<PathBuf>,
    /// Print matrices to stdout
    pub print_matrices: bool,
    /// Dimensions given on the command line
    pub dims: PartialDims,
}

impl Settings {
    /// Resolve settings: CLI flag, then config file, then built-in default
    pub fn resolve(cli: &Cli, config: &MatbenchConfig) -> anyhow::Result<Self> {
        let Some(selection) = cli.implementation else {
            bail!("no implementation selected; pass -i {{naive|opt|vec|para|both}}");
        };

        let format_name = cli.format.as_deref().unwrap_or(&config.output.format);
        let format: OutputFormat = format_name.parse().map_err(anyhow::Error::msg)?;

        let runner = &config.runner;
        let base = BenchmarkConfig {
            variant: selection.variants()[0],
            thread_count: to_usize(cli.nthreads).or(runner.threads).unwrap_or(1),
            cpu_id: cli.cpu.or(runner.cpu).unwrap_or(0),
            data_size: 0,
            num_runs: to_usize(cli.runs).or(runner.runs).unwrap_or(DEFAULT_NUM_RUNS),
            num_std_devs: cli.nstdevs.or(runner.nstdevs).unwrap_or(DEFAULT_NUM_STD_DEVS),
            warmup_runs: cli.warmup.or(runner.warmup).unwrap_or(0),
        };
        base.validate()?;

        let tolerance = cli.tolerance.or(runner.tolerance).unwrap_or(DEFAULT_TOLERANCE);
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            bail!("tolerance must be a non-negative number, got {tolerance}");
        }

        let export_dir = if cli.no_export || !config.output.export {
            None
        } else {
            Some(
                cli.result_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.output.result_dir)),
            )
        };

        Ok(Self {
            selection,
            base,
            tolerance,
            format,
            export_dir,
            print_matrices: cli.print_matrices || config.output.print_matrices,
            dims: PartialDims {
                rows_a: to_usize(cli.rows_a),
                cols_a: to_usize(cli.cols_a),
                cols_b: to_usize(cli.cols_b),
            },
        })
    }
}

fn to_usize(value: Option<u64>) -> Option<usize> {
    value.map(|v| usize::try_from(v).unwrap_or(usize::MAX))
}

/// Run the matbench CLI with process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the matbench CLI with pre-parsed arguments
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if let Some(Commands::Init { force }) = cli.command {
        return write_default_config(Path::new(CONFIG_FILE_NAME), force);
    }

    let config = MatbenchConfig::discover().unwrap_or_default();
    let settings = Settings::resolve(&cli, &config)?;

    let stdin = std::io::stdin();
    let dims = resolve_dims(settings.dims, &mut stdin.lock(), &mut std::io::stdout())?;
    let seed = cli.seed.unwrap_or_else(rand::random);

    tracing::info!(%dims, seed, "generating inputs");
    let (a, b) = generate_inputs(dims, seed)?;

    if settings.print_matrices {
        print!("{}", format_matrix("Matrix A", &a));
        print!("{}", format_matrix("Matrix B", &b));
    }

    let plan = SessionPlan {
        variants: settings.selection.variants(),
        base: BenchmarkConfig {
            data_size: dims.m,
            ..settings.base
        },
        tolerance: settings.tolerance,
        show_progress: !cli.quiet,
    };
    let outcome = run_session(&plan, &a, &b)?;

    if settings.print_matrices {
        for (variant, result) in &outcome.outputs {
            print!("{}", format_matrix(&format!("Result Matrix R ({variant})"), result));
        }
    }

    let mut report = Report::new(build_report_meta(seed));
    report.warnings = outcome.warnings;

    if let Some(dir) = &settings.export_dir {
        if let Err(e) = export_matrices(dir, &a, &b, &outcome.outputs) {
            tracing::warn!("matrix export failed: {e}");
            report.warnings.push(format!("matrix export failed: {e}"));
        }
    }

    report.results = outcome.results;
    report.comparison = outcome.comparison;

    let output = settings.format.render(&report)?;
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "matbench=debug" } else { "matbench=info" };
    // Repeated runs in one process keep the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Write `A.csv`, `B.csv` and `R_<kernel>.csv` into `dir`, creating it if needed
pub fn export_matrices(
    dir: &Path,
    a: &Matrix,
    b: &Matrix,
    outputs: &[(KernelVariant, Matrix)],
) -> anyhow::Result<Vec<PathBuf>> {
    if ensure_result_dir(dir)? {
        println!("Result directory created successfully.");
    }

    let mut written = vec![dir.join("A.csv"), dir.join("B.csv")];
    write_matrix_csv(&written[0], a)?;
    write_matrix_csv(&written[1], b)?;

    for (variant, result) in outputs {
        let path = dir.join(matrix_file_name(variant.as_str()));
        write_matrix_csv(&path, result)?;
        written.push(path);
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "exported matrices");
    Ok(written)
}

fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, MatbenchConfig::default_toml())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("matbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!("both".parse::<Selection>().unwrap(), Selection::Both);
        assert_eq!(
            "para".parse::<Selection>().unwrap(),
            Selection::Single(KernelVariant::Parallel)
        );
        assert!("fast".parse::<Selection>().is_err());
        assert_eq!(Selection::Both.variants()[0], KernelVariant::Naive);
        assert_eq!(Selection::Both.variants().len(), 4);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["-i", "vec"]);
        let settings = Settings::resolve(&cli, &MatbenchConfig::default()).unwrap();
        assert_eq!(settings.selection, Selection::Single(KernelVariant::Vectorized));
        assert_eq!(settings.base.num_runs, 10_000);
        assert_eq!(settings.base.num_std_devs, 3);
        assert_eq!(settings.base.thread_count, 1);
        assert_eq!(settings.base.cpu_id, 0);
        assert_eq!(settings.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(settings.format, OutputFormat::Human);
        assert_eq!(settings.export_dir, Some(PathBuf::from("Result")));
        assert_eq!(settings.dims, PartialDims::default());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let config: MatbenchConfig = toml::from_str(
            "[runner]\nruns = 50\nnstdevs = 2\nthreads = 8\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let cli = parse(&["-i", "para", "-r", "5", "-n", "3", "--format", "csv"]);
        let settings = Settings::resolve(&cli, &config).unwrap();
        assert_eq!(settings.base.num_runs, 5);
        assert_eq!(settings.base.thread_count, 3);
        assert_eq!(settings.base.num_std_devs, 2);
        assert_eq!(settings.format, OutputFormat::Csv);
    }

    #[test]
    fn test_short_flags_and_dims() {
        let cli = parse(&[
            "-i", "both", "-c", "1", "-s", "0", "--rows-a", "2", "--cols-a", "3", "--cols-b", "4",
            "--no-export",
        ]);
        let settings = Settings::resolve(&cli, &MatbenchConfig::default()).unwrap();
        assert_eq!(settings.base.cpu_id, 1);
        assert_eq!(settings.base.num_std_devs, 0);
        assert!(settings.export_dir.is_none());
        assert_eq!(
            settings.dims.complete(),
            Some(matbench_core::MatrixDims { m: 2, k: 3, n: 4 })
        );
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(Cli::try_parse_from(["matbench", "-i", "turbo"]).is_err());
        assert!(Cli::try_parse_from(["matbench", "-i", "naive", "-r", "0"]).is_err());
        assert!(Cli::try_parse_from(["matbench", "-i", "naive", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["matbench", "-i", "naive", "--rows-a", "0"]).is_err());
    }

    #[test]
    fn test_missing_selection_is_error() {
        let cli = parse(&[]);
        assert!(Settings::resolve(&cli, &MatbenchConfig::default()).is_err());
    }

    #[test]
    fn test_bad_format_is_error() {
        let cli = parse(&["-i", "naive", "--format", "xml"]);
        assert!(Settings::resolve(&cli, &MatbenchConfig::default()).is_err());
    }

    #[test]
    fn test_export_matrices_layout() {
        let dir = std::env::temp_dir().join(format!("matbench-export-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let a = Matrix::from_rows(&[&[1.0, 2.0]]).unwrap();
        let b = Matrix::from_rows(&[&[3.0], &[4.0]]).unwrap();
        let r = Matrix::from_rows(&[&[11.0]]).unwrap();

        let written = export_matrices(&dir, &a, &b, &[(KernelVariant::Vectorized, r)]).unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read_to_string(dir.join("A.csv")).unwrap(), "1.000000,2.000000\n");
        assert_eq!(std::fs::read_to_string(dir.join("B.csv")).unwrap(), "3.000000\n4.000000\n");
        assert_eq!(
            std::fs::read_to_string(dir.join("R_vectorized.csv")).unwrap(),
            "11.000000\n"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
