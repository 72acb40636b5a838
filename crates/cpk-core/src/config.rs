//! Configuration parsing for Cpk report runs
//!
//! This module provides TOML-based configuration describing the report
//! output, the analysis knobs, and the comparison groups with their log
//! directories and filename filters.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisOptions, DEFAULT_BINS, DEFAULT_OUTLIERS_PERCENT, MAX_BINS};
use crate::stats::{CapabilityOptions, LimitSource};

/// Test names containing any of these tokens are never selected
pub const BUILTIN_EXCLUDES: [&str; 6] = [
    "linearity",
    "ReadFromHardware",
    "DutyCycleCheck",
    "BadcLinearity",
    "WritePartitionTable",
    "MaintenanceRunSummary",
];

/// Output directory used when none is configured or the configured one is missing
pub const DEFAULT_OUTPUT_DIR: &str = "./cpk_output";

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Report output and analysis settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Extra exclude tokens, appended to [`BUILTIN_EXCLUDES`]
    #[serde(default)]
    pub exclude_files: Vec<String>,
    /// Comparison groups, in comparison order
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cpk_core::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("cpk.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use cpk_core::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [report]
    ///     bins = 8
    ///
    ///     [[groups]]
    ///     paths = ["/data/before"]
    ///     year = ["2018"]
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// assert_eq!(config.report.bins(), 8);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Built-in exclude tokens followed by the configured ones
    pub fn excludes(&self) -> Vec<String> {
        BUILTIN_EXCLUDES
            .iter()
            .map(|s| s.to_string())
            .chain(self.exclude_files.iter().cloned())
            .collect()
    }

    /// Analysis knobs with the value checks applied
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            bins: self.report.bins(),
            outliers_percent: self.report.outliers_percent(),
            keep_histogram: self.report.keep_histogram,
            capability: CapabilityOptions {
                source: self.report.limit_source,
                factor: self.report.limit_factor,
            },
        }
    }
}

/// Report output and analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Stem of the output file name (default: "cpk_report")
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Output directory; see [`ReportConfig::output_dir`]
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Histogram bin count, any TOML value; see [`ReportConfig::bins`]
    #[serde(default)]
    pub bins: Option<toml::Value>,
    /// Outlier budget in percent; see [`ReportConfig::outliers_percent`]
    #[serde(default)]
    pub outliers_percent: Option<toml::Value>,
    /// Keep histogram bins in the report (default: true)
    #[serde(default = "default_true")]
    pub keep_histogram: bool,
    /// Keep the settings snapshot in the report (default: true)
    #[serde(default = "default_true")]
    pub keep_settings: bool,
    /// Limits the capability window is built from
    #[serde(default)]
    pub limit_source: LimitSource,
    /// Scale factor applied to the chosen limits (default: 1.0)
    #[serde(default = "default_limit_factor")]
    pub limit_factor: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            output_dir: None,
            bins: None,
            outliers_percent: None,
            keep_histogram: true,
            keep_settings: true,
            limit_source: LimitSource::default(),
            limit_factor: default_limit_factor(),
        }
    }
}

impl ReportConfig {
    /// Bin count; a non-integer or a value below 5 gives 5, and values above
    /// [`MAX_BINS`] are capped.
    pub fn bins(&self) -> usize {
        value_check(self.bins.as_ref(), DEFAULT_BINS as i64).min(MAX_BINS as i64) as usize
    }

    /// Outlier budget; a non-integer or a value below 10 gives 10.
    pub fn outliers_percent(&self) -> u32 {
        value_check(
            self.outliers_percent.as_ref(),
            DEFAULT_OUTLIERS_PERCENT as i64,
        )
        .min(u32::MAX as i64) as u32
    }

    /// The configured directory if it exists, [`DEFAULT_OUTPUT_DIR`] otherwise.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) if dir.is_dir() => dir.clone(),
            _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

fn value_check(value: Option<&toml::Value>, default: i64) -> i64 {
    match value {
        Some(toml::Value::Integer(v)) if *v >= default => *v,
        _ => default,
    }
}

fn default_file_name() -> String {
    "cpk_report".to_string()
}

fn default_true() -> bool {
    true
}

fn default_limit_factor() -> f64 {
    1.0
}

/// One comparison group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Directories searched recursively for logs
    pub paths: Vec<PathBuf>,
    /// Filename filter; an empty list matches anything
    #[serde(flatten)]
    pub filter: FilenameFilter,
}

/// Allowed values per filename field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameFilter {
    #[serde(default)]
    pub variant: Vec<String>,
    #[serde(default)]
    pub hw: Vec<String>,
    #[serde(default)]
    pub task: Vec<String>,
    #[serde(default)]
    pub transition: TransitionFilter,
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(default)]
    pub year: Vec<String>,
    #[serde(default)]
    pub month: Vec<String>,
}

/// Allowed transition types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionFilter {
    #[serde(default)]
    pub type1: Vec<String>,
    #[serde(default)]
    pub type2: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [[groups]]
            paths = ["/data/before"]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.report.file_name, "cpk_report");
        assert_eq!(config.report.bins(), 5);
        assert_eq!(config.report.outliers_percent(), 10);
        assert!(config.report.keep_histogram);
        assert!(config.report.keep_settings);
        assert_eq!(config.report.limit_source, LimitSource::Default);
        assert_eq!(config.report.limit_factor, 1.0);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].filter, FilenameFilter::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            exclude_files = ["Linearity"]

            [report]
            file_name = "nightly"
            bins = 8
            outliers_percent = 15
            keep_histogram = false
            keep_settings = false
            limit_source = "adjusted"
            limit_factor = 1.5

            [[groups]]
            paths = ["/data/before"]
            variant = ["Alpha", "Beta"]
            hw = ["Hw"]
            task = []
            transition = { type1 = ["Diagnostic"], type2 = [] }
            test = ["Clock"]
            year = ["2018"]
            month = ["05"]

            [[groups]]
            paths = ["/data/after"]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.report.file_name, "nightly");
        assert_eq!(config.report.bins(), 8);
        assert_eq!(config.report.outliers_percent(), 15);
        assert_eq!(config.report.limit_source, LimitSource::Adjusted);

        let options = config.analysis_options();
        assert!(!options.keep_histogram);
        assert_eq!(options.capability.factor, 1.5);

        let filter = &config.groups[0].filter;
        assert_eq!(filter.variant, vec!["Alpha", "Beta"]);
        assert_eq!(filter.transition.type1, vec!["Diagnostic"]);
        assert!(filter.transition.type2.is_empty());
        assert_eq!(config.groups[1].paths, vec![PathBuf::from("/data/after")]);

        let excludes = config.excludes();
        assert_eq!(excludes.len(), BUILTIN_EXCLUDES.len() + 1);
        assert_eq!(excludes.last().map(String::as_str), Some("Linearity"));
    }

    #[test]
    fn test_value_check_falls_back_to_defaults() {
        let toml = r#"
            [report]
            bins = 3
            outliers_percent = "lots"
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.report.bins(), 5);
        assert_eq!(config.report.outliers_percent(), 10);

        let config = Config::from_str("[report]\nbins = 6.5\n").unwrap();
        assert_eq!(config.report.bins(), 5);
    }

    #[test]
    fn test_huge_bin_count_is_capped() {
        let config = Config::from_str("[report]\nbins = 10000000000000\n").unwrap();
        assert_eq!(config.report.bins(), MAX_BINS);
        assert_eq!(config.analysis_options().bins, MAX_BINS);

        let config = Config::from_str("[report]\nbins = 40\n").unwrap();
        assert_eq!(config.report.bins(), 40);
    }

    #[test]
    fn test_missing_output_dir_uses_default() {
        let config = Config::from_str("[report]\noutput_dir = \"/no/such/dir\"\n").unwrap();
        assert_eq!(config.report.output_dir(), PathBuf::from(DEFAULT_OUTPUT_DIR));

        let dir = tempfile::tempdir().unwrap();
        let mut report = ReportConfig::default();
        report.output_dir = Some(dir.path().to_path_buf());
        assert_eq!(report.output_dir(), dir.path());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(Config::from_str("[report\nbins = 5").is_err());
        assert!(Config::from_str("[report]\nkeep_histogram = \"yes\"\n").is_err());
    }
}
