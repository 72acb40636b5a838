//! Process capability (Cpk) reports from hardware test logs
//!
//! This crate turns semi-structured test logs into per-measurement sample
//! series, compares cohorts of logs against each other and summarizes every
//! series with outlier-adjusted limits, histograms and capability indices.
//!
//! # Pipeline
//!
//! - **Extraction** ([`extract`]): ordered line patterns split one log into
//!   metadata, session records and a raw wide table
//! - **Reshaping** ([`reshape`]): the wide table is melted into one
//!   [`NormalizedRecord`] per measurement code and data row
//! - **Aggregation** ([`aggregate`]): records of every log of a group are
//!   collected into sample series keyed by `hardware|point|measurement`
//! - **Statistics** ([`stats`]): generalized ESD outlier detection, limit
//!   tightening, histograms and Cp/Cpk
//! - **Comparison** ([`compare`]): groups of one test are inner-joined on the
//!   series key
//!
//! Malformed logs never abort a run: they contribute nothing and are counted
//! as rejected.
//!
//! # Example
//!
//! ```no_run
//! use cpk_core::{Config, OutputFormat, Reporter, Runner};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("cpk.toml")?;
//! let report = Runner::run(&config)?;
//!
//! Reporter::new(OutputFormat::Console).report(&report)?;
//! Reporter::new(OutputFormat::Json).write_to_dir(&report, config.report.output_dir())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! exclude_files = ["Linearity"]
//!
//! [report]
//! file_name = "nightly"
//! bins = 8
//! outliers_percent = 10
//! limit_source = "adjusted"
//!
//! [[groups]]
//! paths = ["/data/before"]
//! year = ["2018"]
//!
//! [[groups]]
//! paths = ["/data/after"]
//! year = ["2019"]
//! ```

pub mod aggregate;
pub mod analysis;
pub mod compare;
pub mod config;
pub mod error;
pub mod extract;
pub mod patterns;
pub mod report;
pub mod reshape;
pub mod runner;
pub mod schema;
pub mod selection;
pub mod stats;

// Re-export main types for convenience
pub use aggregate::{GroupSeries, SeriesEntry};
pub use analysis::{AnalysisOptions, GroupAnalysis, SeriesAnalysis};
pub use compare::{build_table, ComparisonRow, TestTable};
pub use config::Config;
pub use error::{CpkError, Result};
pub use extract::{extract_file, extract_str, ParsedLog, RawTable};
pub use report::{OutputFormat, Reporter};
pub use reshape::{reshape, NormalizedRecord};
pub use runner::{CpkReport, Runner};
pub use selection::{select_files, Selection};
