//! Report generation.
//!
//! - **CSV**: one `<model>,<score>` line per scored model on stdout
//! - **JSON**: structured report with per-model diagnostics

pub mod csv;
pub mod json;

use std::str::FromStr;

pub use csv::{csv_line, write_csv};
pub use json::{JsonReport, ModelEntry, ReportMetadata, ReportSummary};

/// Output format for a batch report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}': expected csv or json", other)),
        }
    }
}

/// Render a score as a decimal, spelling non-finite values `NaN`,
/// `Infinity` and `-Infinity`.
pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{:?}", value)
    }
}
