//! Wide-to-long reshaping of a raw table
//!
//! The raw table has one row per measurement point and one column group per
//! measurement code. Reshaping emits one [`NormalizedRecord`] per
//! (measurement code, data row), in measurement-code-major order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::RawTable;
use crate::schema::{MeasurementGroup, TableSchema};

/// One setting of a record: label from the label row, value from the data row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
}

/// One measurement of one measurement point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub hardware_id: String,
    pub measurement_point: String,
    pub measurement_name: String,
    /// Measured value; NaN for an empty cell
    pub value: f64,
    pub upper_limit: Option<f64>,
    pub lower_limit: Option<f64>,
    pub reference: Option<f64>,
    pub settings: Vec<Setting>,
}

/// Companion values of one measurement group in one row
#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupCell {
    value: f64,
    upper: Option<f64>,
    lower: Option<f64>,
    reference: Option<f64>,
}

impl GroupCell {
    fn collect(group: &MeasurementGroup, row: &[f64]) -> Self {
        let role = |index: Option<usize>| index.map(|i| row[i]).filter(|v| !v.is_nan());
        GroupCell {
            value: row[group.value],
            upper: role(group.upper),
            lower: role(group.lower),
            reference: role(group.reference),
        }
    }
}

/// Parse a numeric cell. Empty cells are NaN; anything else must parse.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}

/// Coerce the numeric columns of every data row.
///
/// Non-numeric columns are left as NaN placeholders so positions line up.
fn coerce_rows(schema: &TableSchema, rows: &[Vec<String>]) -> Option<Vec<Vec<f64>>> {
    let mut coerced = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let mut values = vec![f64::NAN; row.len()];
        for &column in &schema.numeric {
            match parse_numeric(&row[column]) {
                Some(v) => values[column] = v,
                None => {
                    debug!(
                        row = row_index,
                        column,
                        cell = %row[column],
                        "Rejecting table: non-numeric measurement cell"
                    );
                    return None;
                }
            }
        }
        coerced.push(values);
    }
    Some(coerced)
}

fn label_or_code(label: &str, code: &str) -> String {
    if label.trim().is_empty() {
        code.to_string()
    } else {
        label.to_string()
    }
}

/// Reshape a raw table into normalized records.
///
/// Returns `None` if an identity column is missing, if any measurement, limit
/// or reference cell is not numeric (the whole table is dropped), or if no
/// record would be produced.
pub fn reshape(table: &RawTable) -> Option<Vec<NormalizedRecord>> {
    let schema = match TableSchema::discover(&table.columns) {
        Some(schema) => schema,
        None => {
            debug!(columns = ?table.columns, "Rejecting table: identity columns missing");
            return None;
        }
    };

    let (label_row, data_rows) = table.rows.split_first()?;

    let measurement_names: Vec<String> = schema
        .groups
        .iter()
        .map(|g| label_or_code(&label_row[g.value], &g.code))
        .collect();
    let setting_names: Vec<String> = schema
        .settings
        .iter()
        .map(|s| label_or_code(&label_row[s.index], &s.code))
        .collect();

    let numeric = coerce_rows(&schema, data_rows)?;

    // Pass 1: melt into (row, group, cell) triples.
    let melted = schema.groups.iter().enumerate().flat_map(|(g, group)| {
        numeric
            .iter()
            .enumerate()
            .map(move |(r, values)| (r, g, GroupCell::collect(group, values)))
    });

    // Pass 2: expand each cell into named fields.
    let records: Vec<NormalizedRecord> = melted
        .map(|(r, g, cell)| {
            let row = &data_rows[r];
            NormalizedRecord {
                hardware_id: row[schema.hardware_id].clone(),
                measurement_point: row[schema.measurement_point].clone(),
                measurement_name: measurement_names[g].clone(),
                value: cell.value,
                upper_limit: cell.upper,
                lower_limit: cell.lower,
                reference: cell.reference,
                settings: schema
                    .settings
                    .iter()
                    .zip(&setting_names)
                    .map(|(column, name)| Setting {
                        name: name.clone(),
                        value: row[column.index].clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    if records.is_empty() {
        debug!("Rejecting table: no measurement records");
        return None;
    }
    Some(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn sample() -> RawTable {
        table(
            &["s0", "m0", "A1", "U1", "L1", "R1", "A2", "U2", "s1"],
            &[
                &["Hw", "Pt", "frequency", "u", "l", "r", "skew", "u", "setupFrequency"],
                &["HW1", "P1", "10.5", "11", "10", "10.4", "0.1", "0.5", "100MHz"],
                &["HW1", "P2", "12.5", "11", "10", "10.4", "", "0.5", "200MHz"],
            ],
        )
    }

    #[test]
    fn test_reshape_emits_one_record_per_code_and_row() {
        let records = reshape(&sample()).unwrap();
        assert_eq!(records.len(), 4);

        let names: Vec<&str> = records.iter().map(|r| r.measurement_name.as_str()).collect();
        assert_eq!(names, vec!["frequency", "frequency", "skew", "skew"]);

        let points: Vec<&str> = records.iter().map(|r| r.measurement_point.as_str()).collect();
        assert_eq!(points, vec!["P1", "P2", "P1", "P2"]);
    }

    #[test]
    fn test_reshape_expands_limit_roles() {
        let records = reshape(&sample()).unwrap();

        let first = &records[0];
        assert_eq!(first.hardware_id, "HW1");
        assert_eq!(first.value, 10.5);
        assert_eq!(first.upper_limit, Some(11.0));
        assert_eq!(first.lower_limit, Some(10.0));
        assert_eq!(first.reference, Some(10.4));

        // A2 has no lower limit or reference column
        let skew = &records[2];
        assert_eq!(skew.upper_limit, Some(0.5));
        assert_eq!(skew.lower_limit, None);
        assert_eq!(skew.reference, None);

        // Empty value cell is NaN, not a rejection
        assert!(records[3].value.is_nan());
    }

    #[test]
    fn test_nan_limit_cells_become_none() {
        let mut t = sample();
        t.rows[1][3] = "nan".into();
        t.rows[2][5] = "NaN".into();
        let records = reshape(&t).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].upper_limit, None);
        assert_eq!(records[0].lower_limit, Some(10.0));
        assert_eq!(records[0].value, 10.5);
        assert_eq!(records[1].upper_limit, Some(11.0));
        assert_eq!(records[1].reference, None);
    }

    #[test]
    fn test_reshape_carries_settings_snapshot() {
        let records = reshape(&sample()).unwrap();
        assert_eq!(
            records[1].settings,
            vec![Setting {
                name: "setupFrequency".into(),
                value: "200MHz".into()
            }]
        );
    }

    #[test]
    fn test_non_numeric_cell_drops_whole_table() {
        let mut dirty = sample();
        dirty.rows[2][3] = "ok".into();
        assert!(reshape(&dirty).is_none());
    }

    #[test]
    fn test_label_row_only_yields_nothing() {
        let mut labels_only = sample();
        labels_only.rows.truncate(1);
        assert!(reshape(&labels_only).is_none());
    }

    #[test]
    fn test_missing_identity_column() {
        let t = table(&["m0", "A1"], &[&["Pt", "f"], &["P1", "1"]]);
        assert!(reshape(&t).is_none());
    }

    #[test]
    fn test_empty_label_falls_back_to_code() {
        let mut t = sample();
        t.rows[0][2] = String::new();
        let records = reshape(&t).unwrap();
        assert_eq!(records[0].measurement_name, "A1");
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric(" 1.5 "), Some(1.5));
        assert_eq!(parse_numeric("-2e3"), Some(-2000.0));
        assert!(parse_numeric("").unwrap().is_nan());
        assert_eq!(parse_numeric("ok"), None);
    }
}
