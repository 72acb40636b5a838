//! Console reporter
//!
//! Prints one block per test with one line per joined series.

use anyhow::Result;
use std::fmt::Write;

use crate::compare::{ComparisonRow, TestTable};
use crate::runner::CpkReport;

/// Console format reporter
pub struct ConsoleReporter;

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

impl ConsoleReporter {
    /// Format a report for console output
    pub fn format(report: &CpkReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                        CPK REPORT                            ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Report:    {}", report.file_name)?;
        writeln!(output, "Started:   {}", report.started_at.to_rfc3339())?;
        writeln!(
            output,
            "Logs:      {} selected, {} rejected",
            report.files_selected, report.files_rejected
        )?;
        writeln!(output, "Tests:     {}", report.tests.len())?;
        writeln!(output)?;

        for table in &report.tests {
            Self::format_test(&mut output, table)?;
        }

        Ok(output)
    }

    fn format_test(output: &mut String, table: &TestTable) -> Result<()> {
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output, "Test: {}", table.test_name)?;
        writeln!(
            output,
            "  Groups: {}   Series: {}",
            table.groups.len(),
            table.rows.len()
        )?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;

        for row in &table.rows {
            Self::format_row(output, row)?;
        }

        writeln!(output)?;
        Ok(())
    }

    fn format_row(output: &mut String, row: &ComparisonRow) -> Result<()> {
        writeln!(
            output,
            "  {} / {} / {}",
            row.identity.hardware_id, row.identity.measurement_point, row.identity.measurement_name
        )?;

        for series in &row.groups {
            let cap = &series.capability;
            writeln!(
                output,
                "    [{}] n={:<5} mean={:<10} sigma={:<10} fails={:<4} cp={:<6.2} cpk={:<6.2} outliers={}",
                series.group,
                series.samples.len(),
                optional(cap.mean),
                optional(cap.std_dev),
                cap.fails,
                cap.cp,
                cap.cpk,
                series.outlier_count,
            )?;
        }

        if let Some(comparison) = &row.comparison {
            writeln!(
                output,
                "    delta mean={} mean%={} sigma%={} cpk={}",
                optional(comparison.mean_abs),
                optional(comparison.mean_rel),
                optional(comparison.stdev_rel),
                optional(comparison.cpk_rel),
            )?;
        }

        Ok(())
    }
}
