//! JSON reporter

use anyhow::Result;

use crate::runner::CpkReport;

/// Writes a [`CpkReport`] as one JSON document: run metadata followed by a
/// table per test name, with per-group capability rows and, for two groups,
/// the comparison columns.
pub struct JsonReporter;

impl JsonReporter {
    /// Serialize the whole report. Series identity is flattened into each
    /// row; NaN-free samples are kept so the numbers can be recomputed.
    pub fn format(report: &CpkReport, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn test_json_format_compact() {
        let output = JsonReporter::format(&sample_report(), false).unwrap();

        // Compact JSON should not have newlines
        assert!(!output.contains('\n'));
        assert!(output.contains("\"file_name\":\"nightly\""));
    }

    #[test]
    fn test_json_format_pretty() {
        let output = JsonReporter::format(&sample_report(), true).unwrap();
        assert!(output.contains('\n'));
        assert!(output.contains("  "));
    }

    #[test]
    fn test_json_structure() {
        let output = JsonReporter::format(&sample_report(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let row = &value["tests"][0]["rows"][0];
        assert_eq!(row["hardware_id"], "HW1");
        assert_eq!(row["measurement_name"], "frequency");
        assert_eq!(row["settings"][0]["name"], "mode");
        assert_eq!(row["groups"].as_array().map(Vec::len), Some(2));
        assert_eq!(row["groups"][1]["group"], 2);
        assert_eq!(row["groups"][0]["histogram"][0]["label"], "B1_1");
        assert_eq!(row["comparison"]["mean_abs"], -1.0);
    }
}
