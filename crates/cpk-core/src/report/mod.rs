//! Report output
//!
//! Formats a [`CpkReport`] as JSON (compact or pretty) or as a console
//! summary.
//!
//! # Example
//!
//! ```no_run
//! use cpk_core::report::{OutputFormat, Reporter};
//! use cpk_core::runner::CpkReport;
//!
//! # fn example(report: CpkReport) -> anyhow::Result<()> {
//! Reporter::new(OutputFormat::Console).report(&report)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::JsonPretty).write_to_file(&report, "report.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::runner::CpkReport;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    #[default]
    JsonPretty,
    /// Human-readable summary
    Console,
}

/// Reporter for Cpk reports
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report to stdout
    pub fn report(&self, report: &CpkReport) -> Result<()> {
        let output = self.format_results(report)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    /// Write to a file, creating its parent directory if needed
    pub fn write_to_file<P: AsRef<Path>>(&self, report: &CpkReport, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let output = self.format_results(report)?;
        fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Write into `dir` under the report's own output file name
    pub fn write_to_dir<P: AsRef<Path>>(&self, report: &CpkReport, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(report.output_file_name());
        self.write_to_file(report, &path)?;
        Ok(path)
    }

    pub fn format_results(&self, report: &CpkReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Local, TimeZone};

    use crate::aggregate::GroupSeries;
    use crate::analysis::{AnalysisOptions, GroupAnalysis};
    use crate::compare::build_table;
    use crate::reshape::{NormalizedRecord, Setting};
    use crate::runner::CpkReport;

    fn records(values: &[f64]) -> Vec<NormalizedRecord> {
        values
            .iter()
            .map(|&value| NormalizedRecord {
                hardware_id: "HW1".to_string(),
                measurement_point: "P1".to_string(),
                measurement_name: "frequency".to_string(),
                value,
                upper_limit: Some(20.0),
                lower_limit: Some(0.0),
                reference: Some(10.0),
                settings: vec![Setting {
                    name: "mode".to_string(),
                    value: "fast".to_string(),
                }],
            })
            .collect()
    }

    pub fn sample_report() -> CpkReport {
        let options = AnalysisOptions::default();
        let before =
            GroupAnalysis::analyze(GroupSeries::aggregate(1, vec![records(&[9.0, 10.0, 11.0])]), &options);
        let after =
            GroupAnalysis::analyze(GroupSeries::aggregate(2, vec![records(&[10.0, 11.0, 12.0])]), &options);

        CpkReport {
            file_name: "nightly".to_string(),
            started_at: Local.with_ymd_and_hms(2018, 5, 1, 12, 30, 15).unwrap(),
            files_selected: 3,
            files_rejected: 1,
            tests: build_table("Clock", vec![before, after], true).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::sample_report;

    #[test]
    fn test_reporter_json_format() {
        let reporter = Reporter::new(OutputFormat::Json);
        let output = reporter.format_results(&sample_report()).unwrap();

        assert!(output.contains("\"test_name\":\"Clock\""));
        assert!(output.contains("HW1|P1|frequency"));
    }

    #[test]
    fn test_reporter_console_format() {
        let reporter = Reporter::new(OutputFormat::Console);
        let output = reporter.format_results(&sample_report()).unwrap();

        assert!(output.contains("Clock"));
        assert!(output.contains("frequency"));
    }

    #[test]
    fn test_write_to_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");

        let path = Reporter::default()
            .write_to_dir(&sample_report(), &target)
            .unwrap();

        assert_eq!(path, target.join("nightly_2018-05-01_12h30m15s.json"));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("\"files_rejected\": 1"));
    }

    #[test]
    fn test_default_format() {
        let reporter = Reporter::default();
        assert_eq!(reporter.format, OutputFormat::JsonPretty);
    }
}
