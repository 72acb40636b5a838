//! Report run orchestration
//!
//! The runner drives every stage strictly sequentially: selection, then per
//! test and per group the extraction and reshaping of each log, aggregation,
//! per-series analysis, and finally the cross-group join.
//!
//! # Example
//!
//! ```no_run
//! use cpk_core::{Config, runner::Runner};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("cpk.toml")?;
//! let report = Runner::run(&config)?;
//!
//! for table in &report.tests {
//!     println!("{}: {} series", table.test_name, table.rows.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::GroupSeries;
use crate::analysis::{AnalysisOptions, GroupAnalysis};
use crate::compare::{build_table, TestTable};
use crate::config::Config;
use crate::error::{CpkError, Result};
use crate::extract::extract_file;
use crate::reshape::{reshape, NormalizedRecord};
use crate::selection::{select_files, GroupFiles, Selection, TestSelection};

/// Timestamp layout used in output file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%Hh%Mm%Ss";

/// Results of a complete report run
#[derive(Debug, Clone, Serialize)]
pub struct CpkReport {
    /// Stem of the output file name
    pub file_name: String,
    /// When the run started
    pub started_at: DateTime<Local>,
    /// Number of log files selected
    pub files_selected: usize,
    /// Selected logs that contributed nothing (unreadable or malformed)
    pub files_rejected: usize,
    /// One joined table per test name with at least one non-empty group
    pub tests: Vec<TestTable>,
}

impl CpkReport {
    /// `<file_name>_<YYYY-MM-DD_HHhMMmSSs>.json`
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_{}.json",
            self.file_name,
            self.started_at.format(FILE_TIMESTAMP_FORMAT)
        )
    }
}

/// Sequential report runner
#[derive(Debug, Clone)]
pub struct Runner {
    options: AnalysisOptions,
    keep_settings: bool,
    file_name: String,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            options: AnalysisOptions::default(),
            keep_settings: true,
            file_name: "cpk_report".to_string(),
        }
    }
}

impl Runner {
    pub fn new(options: AnalysisOptions, keep_settings: bool) -> Self {
        Self {
            options,
            keep_settings,
            ..Self::default()
        }
    }

    /// Runner configured from the `[report]` table
    pub fn from_config(config: &Config) -> Self {
        Self {
            options: config.analysis_options(),
            keep_settings: config.report.keep_settings,
            file_name: config.report.file_name.clone(),
        }
    }

    /// Select the configured logs and build the report
    ///
    /// # Errors
    ///
    /// Fails when no group is configured or a filename filter is not a valid
    /// regex. Unreadable or malformed logs are skipped.
    #[instrument(skip(config), fields(groups = config.groups.len()))]
    pub fn run(config: &Config) -> Result<CpkReport> {
        if config.groups.is_empty() {
            return Err(CpkError::Config("no groups configured".to_string()));
        }

        let selection = select_files(&config.groups, &config.excludes())?;
        info!(
            tests = selection.tests.len(),
            files = selection.file_count(),
            "Selected log files"
        );

        Ok(Self::from_config(config).run_selection(&selection))
    }

    /// Build the report from an existing selection
    pub fn run_selection(&self, selection: &Selection) -> CpkReport {
        let started_at = Local::now();
        let mut files_rejected = 0;
        let mut tests = Vec::new();

        for test in &selection.tests {
            if let Some(table) = self.run_test(test, &mut files_rejected) {
                tests.push(table);
            }
        }

        info!(
            tests = tests.len(),
            rejected = files_rejected,
            "Report complete"
        );

        CpkReport {
            file_name: self.file_name.clone(),
            started_at,
            files_selected: selection.file_count(),
            files_rejected,
            tests,
        }
    }

    #[instrument(skip(self, test, files_rejected), fields(test = %test.name))]
    fn run_test(&self, test: &TestSelection, files_rejected: &mut usize) -> Option<TestTable> {
        let mut groups = Vec::new();

        for files in &test.groups {
            let tables = self.load_group(files, files_rejected);
            if tables.is_empty() {
                debug!(group = files.group, "No usable logs in group");
                continue;
            }

            // Groups are renumbered over the non-empty ones
            let index = groups.len() + 1;
            let series = GroupSeries::aggregate(index, tables);
            info!(
                group = files.group,
                index,
                keys = series.len(),
                "Aggregated group"
            );
            groups.push(GroupAnalysis::analyze(series, &self.options));
        }

        if groups.is_empty() {
            info!("Skipping test: every group is empty");
            return None;
        }

        build_table(&test.name, groups, self.keep_settings)
    }

    #[instrument(skip(self, files, files_rejected), fields(group = files.group))]
    fn load_group(
        &self,
        files: &GroupFiles,
        files_rejected: &mut usize,
    ) -> Vec<Vec<NormalizedRecord>> {
        let mut tables = Vec::with_capacity(files.files.len());
        for path in &files.files {
            match load_records(path) {
                Some(records) => tables.push(records),
                None => *files_rejected += 1,
            }
        }
        tables
    }
}

fn load_records(path: &Path) -> Option<Vec<NormalizedRecord>> {
    let parsed = match extract_file(path) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            debug!(file = %path.display(), "Rejected log: malformed usage lines or data rows");
            return None;
        }
        Err(err) => {
            warn!(file = %path.display(), error = %err, "Skipping unreadable log");
            return None;
        }
    };

    let records = reshape(&parsed.table);
    if records.is_none() {
        debug!(file = %path.display(), "Rejected log: table could not be reshaped");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_output_file_name() {
        let report = CpkReport {
            file_name: "nightly".to_string(),
            started_at: Local.with_ymd_and_hms(2018, 5, 1, 12, 30, 15).unwrap(),
            files_selected: 0,
            files_rejected: 0,
            tests: Vec::new(),
        };
        assert_eq!(report.output_file_name(), "nightly_2018-05-01_12h30m15s.json");
    }

    #[test]
    fn test_run_without_groups_fails() {
        let config = Config::from_str("[report]\nbins = 5\n").unwrap();
        assert!(matches!(Runner::run(&config), Err(CpkError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_rejected_not_fatal() {
        let selection = Selection {
            tests: vec![TestSelection {
                name: "Clock".to_string(),
                groups: vec![GroupFiles {
                    group: 1,
                    files: vec!["/no/such/log.log".into()],
                }],
            }],
        };
        let report = Runner::default().run_selection(&selection);
        assert_eq!(report.files_selected, 1);
        assert_eq!(report.files_rejected, 1);
        assert!(report.tests.is_empty());
    }
}
