//! Merged report assembly and serialization.
//!
//! The thin command wrappers around the engine run each analysis and merge
//! their JSON; this module holds the merged [`ProjectReport`] and the
//! writers for it: machine-readable JSON and a human-oriented Markdown
//! summary.

pub mod json;
pub mod markdown;

use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::complexity::ComplexityReport;
use crate::analysis::dependencies::{DependencyGraphReport, OrphanReport};
use crate::analysis::duplicates::DuplicateReport;
use crate::analysis::unused::UnusedExportReport;

/// Report output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!(
                "Unknown report format: '{}'. Valid formats: json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// All five analyses merged for one project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    /// Project root the analyses ran against.
    pub root: String,
    pub dependency_graph: DependencyGraphReport,
    pub duplicates: DuplicateReport,
    pub complexity: ComplexityReport,
    pub unused_exports: UnusedExportReport,
    pub orphans: OrphanReport,
}

/// Trait for report writers.
pub trait Reporter {
    /// Write the report to the given writer.
    fn write<W: Write>(&self, report: &ProjectReport, writer: &mut W) -> io::Result<()>;
}

/// Write a report in the specified format.
pub fn write_report<W: Write>(
    format: ReportFormat,
    report: &ProjectReport,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ReportFormat::Json => json::JsonReporter.write(report, writer),
        ReportFormat::Markdown => markdown::MarkdownReporter.write(report, writer),
    }
}

/// Render a report to a string.
pub fn report_to_string(format: ReportFormat, report: &ProjectReport) -> io::Result<String> {
    let mut buffer = Vec::new();
    write_report(format, report, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!(
            "markdown".parse::<ReportFormat>().unwrap(),
            ReportFormat::Markdown
        );
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("csv".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_report_format_display() {
        assert_eq!(format!("{}", ReportFormat::Json), "json");
        assert_eq!(format!("{}", ReportFormat::Markdown), "markdown");
    }
}
