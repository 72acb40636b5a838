//! Record extraction from a single test log
//!
//! A log is read line by line. Each line is classified against the ordered
//! pattern table in [`crate::patterns`] and routed into one of three buckets:
//! metadata (last write wins), session records (appended), or test data
//! (usage-line headers and data rows). Only logs with exactly four usage lines
//! yield a [`RawTable`].

use std::fs;
use std::path::Path;

use regex::Captures;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CpkError, Result};
use crate::patterns::{classify, LineKind, COLUMN_CODE, FIELD_SEPARATOR, USAGE_LINE_COUNT};

/// Wide table built from the usage-line header and the data rows of one log.
///
/// Columns are restricted to short codes (`A1`, `U1`, `s0`, ...). The first
/// row is the label row taken from usage line #4; the remaining rows are
/// measurement rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column codes, in header order
    pub columns: Vec<String>,
    /// Rows, each with exactly `columns.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Number of rows, label row included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Banner information found at the top of a log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogMetadata {
    pub st_version: Option<String>,
    pub rhel_version: Option<String>,
    pub workstation: Option<String>,
    pub timestamp: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// One `TestSessionData.<hw>="..."` hardware identification record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub hw_ids: String,
    pub high_level_serial_number: Option<String>,
    pub vendor: Option<String>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub edc_oracle: Option<String>,
    pub manufacturer_production_date: Option<String>,
    pub fpga_bundle: Option<String>,
    pub fpga_revision: Option<String>,
}

impl SessionEntry {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let field = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        SessionEntry {
            hw_ids: field("hw_ids").unwrap_or_default(),
            high_level_serial_number: field("high_level_serial_number"),
            vendor: field("vendor"),
            part_number: field("part_number"),
            serial_number: field("serial_number"),
            edc_oracle: field("edc_oracle"),
            manufacturer_production_date: field("manufacturer_production_date"),
            fpga_bundle: field("fpga_bundle"),
            fpga_revision: field("fpga_revision"),
        }
    }
}

/// Everything extracted from one well-formed log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedLog {
    pub metadata: LogMetadata,
    pub sessions: Vec<SessionEntry>,
    /// Most recently seen run number
    pub run_number: Option<String>,
    pub table: RawTable,
}

/// Accumulator threaded through the line loop
#[derive(Default)]
struct ParseState {
    usage_lines: usize,
    run_number: Option<String>,
    metadata: LogMetadata,
    sessions: Vec<SessionEntry>,
    rows: Vec<Vec<String>>,
}

impl ParseState {
    fn consume(&mut self, line: &str) {
        let Some((kind, caps)) = classify(line) else {
            return;
        };
        let value = || caps.name("value").map(|m| m.as_str().to_string());

        match kind {
            LineKind::StVersion => self.metadata.st_version = value(),
            LineKind::RhelVersion => self.metadata.rhel_version = value(),
            LineKind::Workstation => self.metadata.workstation = value(),
            LineKind::Timestamp => {
                self.metadata.timestamp = value();
                self.metadata.date = caps.name("date").map(|m| m.as_str().to_string());
                self.metadata.time = caps.name("time").map(|m| m.as_str().to_string());
            }
            LineKind::TestSession => self.sessions.push(SessionEntry::from_captures(&caps)),
            LineKind::RunNumber => self.run_number = value(),
            LineKind::UsageLine => {
                self.usage_lines += 1;
                match self.usage_lines {
                    // Header #1 defines the column codes; underscores are noise.
                    1 => self.rows.push(split_fields(&line.trim().replace('_', ""))),
                    // Header #4 carries the human-readable labels.
                    4 => self.rows.push(split_fields(line.trim())),
                    _ => {}
                }
            }
            LineKind::Data => self.rows.push(split_fields(line.trim())),
        }
    }

    fn finish(self) -> Option<ParsedLog> {
        if self.usage_lines != USAGE_LINE_COUNT {
            debug!(
                usage_lines = self.usage_lines,
                "Rejecting log: expected {} usage lines", USAGE_LINE_COUNT
            );
            return None;
        }

        let table = build_table(self.rows)?;
        Some(ParsedLog {
            metadata: self.metadata,
            sessions: self.sessions,
            run_number: self.run_number,
            table,
        })
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

/// Keep only short-code columns of the header row and project every row onto them.
fn build_table(mut rows: Vec<Vec<String>>) -> Option<RawTable> {
    if rows.is_empty() {
        return None;
    }
    let header = rows.remove(0);

    let mut columns: Vec<String> = Vec::new();
    let mut positions: Vec<usize> = Vec::new();
    for (position, name) in header.iter().enumerate() {
        if COLUMN_CODE.is_match(name) && !columns.contains(name) {
            columns.push(name.clone());
            positions.push(position);
        }
    }

    let mut projected = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() > header.len() {
            debug!(
                fields = row.len(),
                header = header.len(),
                "Rejecting log: row wider than header"
            );
            return None;
        }
        projected.push(
            positions
                .iter()
                .map(|&p| row.get(p).cloned().unwrap_or_default())
                .collect(),
        );
    }

    Some(RawTable {
        columns,
        rows: projected,
    })
}

/// Extract a log from its text.
///
/// Returns `None` when the text does not follow the four-usage-line
/// convention. This is not an error: the log simply contributes nothing.
pub fn extract_str(text: &str) -> Option<ParsedLog> {
    let mut state = ParseState::default();
    for line in text.lines() {
        state.consume(line.trim_end_matches('\r'));
    }
    state.finish()
}

/// Read and extract a log file.
///
/// Invalid UTF-8 is replaced rather than rejected. Only I/O failures are
/// reported as errors.
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Option<ParsedLog>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| CpkError::io(path, e))?;
    let parsed = extract_str(&String::from_utf8_lossy(&bytes));
    if parsed.is_none() {
        debug!(file = %path.display(), "Log does not yield a raw table");
    }
    Ok(parsed)
}
