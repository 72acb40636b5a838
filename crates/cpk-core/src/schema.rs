//! Column schema discovery
//!
//! Column codes are one category letter and a numeric suffix. Codes sharing a
//! suffix with a measurement code `A<n>` form that measurement's group. The
//! discovery runs once per table; later stages work from positions only.

use crate::patterns::COLUMN_CODE;

/// Hardware identifier column
pub const HARDWARE_ID_CODE: &str = "s0";

/// Measurement point identifier column
pub const MEASUREMENT_POINT_CODE: &str = "m0";

/// Role a column plays, decided by its letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// `A<n>`: measured value
    Value,
    /// `U<n>`: upper limit
    UpperLimit,
    /// `L<n>`: lower limit
    LowerLimit,
    /// `R<n>`: reference value
    Reference,
    /// `s0`
    HardwareId,
    /// `m0`
    MeasurementPoint,
    /// `s<n>`, n != 0
    Setting,
    /// Any other `m<n>` column
    Ignored,
}

impl ColumnRole {
    /// Classify a column code. Returns `None` for names that are not codes.
    pub fn of(code: &str) -> Option<(ColumnRole, &str)> {
        let caps = COLUMN_CODE.captures(code)?;
        let suffix = caps.name("suffix")?.as_str();
        let role = match (&caps["letter"], suffix) {
            ("A", _) => ColumnRole::Value,
            ("U", _) => ColumnRole::UpperLimit,
            ("L", _) => ColumnRole::LowerLimit,
            ("R", _) => ColumnRole::Reference,
            ("s", "0") => ColumnRole::HardwareId,
            ("m", "0") => ColumnRole::MeasurementPoint,
            ("s", _) => ColumnRole::Setting,
            _ => ColumnRole::Ignored,
        };
        Some((role, suffix))
    }

    /// Whether cells of this column must be numeric
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnRole::Value | ColumnRole::UpperLimit | ColumnRole::LowerLimit | ColumnRole::Reference
        )
    }
}

/// Columns belonging to one measurement code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementGroup {
    /// Measurement code, e.g. `A3`
    pub code: String,
    pub value: usize,
    pub upper: Option<usize>,
    pub lower: Option<usize>,
    pub reference: Option<usize>,
}

/// A settings column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingColumn {
    pub code: String,
    pub index: usize,
}

/// Typed view over a raw table's columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub hardware_id: usize,
    pub measurement_point: usize,
    /// Measurement groups in column order of their `A<n>` code
    pub groups: Vec<MeasurementGroup>,
    /// Settings columns in column order
    pub settings: Vec<SettingColumn>,
    /// Every column that must coerce to a number
    pub numeric: Vec<usize>,
}

impl TableSchema {
    /// Discover the schema of a column list.
    ///
    /// Returns `None` when either identity column is absent.
    pub fn discover(columns: &[String]) -> Option<Self> {
        let mut hardware_id = None;
        let mut measurement_point = None;
        let mut groups: Vec<MeasurementGroup> = Vec::new();
        let mut companions: Vec<(ColumnRole, &str, usize)> = Vec::new();
        let mut settings = Vec::new();
        let mut numeric = Vec::new();

        for (index, code) in columns.iter().enumerate() {
            let Some((role, suffix)) = ColumnRole::of(code) else {
                continue;
            };
            if role.is_numeric() {
                numeric.push(index);
            }
            match role {
                ColumnRole::Value => groups.push(MeasurementGroup {
                    code: code.clone(),
                    value: index,
                    upper: None,
                    lower: None,
                    reference: None,
                }),
                ColumnRole::UpperLimit | ColumnRole::LowerLimit | ColumnRole::Reference => {
                    companions.push((role, suffix, index))
                }
                ColumnRole::HardwareId => hardware_id = Some(index),
                ColumnRole::MeasurementPoint => measurement_point = Some(index),
                ColumnRole::Setting => settings.push(SettingColumn {
                    code: code.clone(),
                    index,
                }),
                ColumnRole::Ignored => {}
            }
        }

        for group in &mut groups {
            let suffix = &group.code[1..];
            for &(role, companion_suffix, index) in &companions {
                if companion_suffix != suffix {
                    continue;
                }
                match role {
                    ColumnRole::UpperLimit => group.upper = Some(index),
                    ColumnRole::LowerLimit => group.lower = Some(index),
                    ColumnRole::Reference => group.reference = Some(index),
                    _ => {}
                }
            }
        }

        Some(TableSchema {
            hardware_id: hardware_id?,
            measurement_point: measurement_point?,
            groups,
            settings,
            numeric,
        })
    }
}
