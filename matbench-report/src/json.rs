//! JSON Output

use crate::error::ReportError;
use crate::report::Report;

/// Generate a prettified JSON report
pub fn generate_json_report(report: &Report) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}
