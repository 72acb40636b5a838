//! Cross-file aggregation of normalized records into per-key sample series.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reshape::{NormalizedRecord, Setting};
use crate::stats::LimitPair;

/// Separator between the parts of an identity key
pub const KEY_SEPARATOR: char = '|';

/// Build the identity key `hardware|point|measurement`.
pub fn identity_key(hardware_id: &str, measurement_point: &str, measurement_name: &str) -> String {
    format!("{hardware_id}{KEY_SEPARATOR}{measurement_point}{KEY_SEPARATOR}{measurement_name}")
}

/// Identity attributes of one series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub hardware_id: String,
    pub measurement_point: String,
    pub measurement_name: String,
}

impl Identity {
    pub fn key(&self) -> String {
        identity_key(
            &self.hardware_id,
            &self.measurement_point,
            &self.measurement_name,
        )
    }
}

/// Limits of a series as found in the first record for its key
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitTriple {
    pub reference: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl LimitTriple {
    fn of(record: &NormalizedRecord) -> Self {
        LimitTriple {
            reference: record.reference,
            lower: record.lower_limit,
            upper: record.upper_limit,
        }
    }

    /// The lower/upper pair
    pub fn pair(&self) -> LimitPair {
        LimitPair::new(self.lower, self.upper)
    }
}

/// Everything collected for one identity key within one group
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub key: String,
    pub identity: Identity,
    /// Limits of the first occurrence
    pub limits: LimitTriple,
    /// Settings snapshot of the first occurrence
    pub settings: Vec<Setting>,
    /// Values in file order, then row order. May contain NaN.
    pub samples: Vec<f64>,
    /// Later records whose limits differ from the first occurrence
    pub limit_mismatches: usize,
}

/// The series of one comparison group, in first-occurrence key order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSeries {
    pub group: usize,
    pub entries: Vec<SeriesEntry>,
}

impl GroupSeries {
    /// Aggregate the per-file record tables of one group.
    ///
    /// Keys whose series has no valid (non-NaN) sample are dropped.
    pub fn aggregate<I>(group: usize, files: I) -> Self
    where
        I: IntoIterator<Item = Vec<NormalizedRecord>>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<SeriesEntry> = Vec::new();

        for record in files.into_iter().flatten() {
            let limits = LimitTriple::of(&record);
            let identity = Identity {
                hardware_id: record.hardware_id,
                measurement_point: record.measurement_point,
                measurement_name: record.measurement_name,
            };
            let key = identity.key();
            match index.get(&key) {
                Some(&slot) => {
                    let entry = &mut entries[slot];
                    if limits != entry.limits {
                        entry.limit_mismatches += 1;
                    }
                    entry.samples.push(record.value);
                }
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push(SeriesEntry {
                        key,
                        limits,
                        samples: vec![record.value],
                        limit_mismatches: 0,
                        identity,
                        settings: record.settings,
                    });
                }
            }
        }

        entries.retain(|entry| {
            if entry.limit_mismatches > 0 {
                debug!(
                    group,
                    key = %entry.key,
                    mismatches = entry.limit_mismatches,
                    "Limits differ across files; keeping first occurrence"
                );
            }
            let valid = entry.samples.iter().any(|v| !v.is_nan());
            if !valid {
                debug!(group, key = %entry.key, "Dropping series without valid samples");
            }
            valid
        });

        GroupSeries { group, entries }
    }

    pub fn get(&self, key: &str) -> Option<&SeriesEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
