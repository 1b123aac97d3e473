#![warn(missing_docs)]
//! matbench Report - Reporting and Export
//!
//! Generates the output of a benchmark session:
//! - Human-readable terminal summary
//! - JSON (machine-readable)
//! - CSV timing summary (spreadsheet-compatible)
//! - CSV matrix export for the inputs and every result matrix

mod csv;
mod error;
mod formatting;
mod json;
mod report;

pub use csv::{
    ensure_result_dir, format_matrix_csv, generate_csv_report, matrix_file_name,
    write_matrix_csv,
};
pub use error::ReportError;
pub use formatting::{format_cpu_list, format_human_output, format_matrix};
pub use json::generate_json_report;
pub use report::{Comparison, ComparisonEntry, Report, ReportMeta, SystemInfo};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON with the full report
    Json,
    /// CSV timing summary
    Csv,
}

impl OutputFormat {
    /// Render `report` in this format
    pub fn render(self, report: &Report) -> Result<String, ReportError> {
        match self {
            OutputFormat::Human => Ok(format_human_output(report)),
            OutputFormat::Json => generate_json_report(report),
            OutputFormat::Csv => Ok(generate_csv_report(report)),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
