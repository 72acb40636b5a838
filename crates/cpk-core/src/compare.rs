//! Side-by-side comparison of the groups of one test.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::aggregate::Identity;
use crate::analysis::{GroupAnalysis, SeriesAnalysis};
use crate::reshape::Setting;

/// Differences between the first and second group of a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupComparison {
    /// mean1 - mean2
    pub mean_abs: Option<f64>,
    /// |(mean1 - mean2) / mean1 * 100|
    pub mean_rel: Option<f64>,
    /// |(sigma1 - sigma2) / sigma1 * 100|
    pub stdev_rel: Option<f64>,
    /// |(cpk1 - cpk2) / cpk1|
    pub cpk_rel: Option<f64>,
}

fn relative(first: Option<f64>, second: Option<f64>, scale: f64) -> Option<f64> {
    match (first, second) {
        (Some(a), Some(b)) if a != 0.0 => Some(((a - b) / a * scale).abs()),
        _ => None,
    }
}

impl GroupComparison {
    pub fn between(first: &SeriesAnalysis, second: &SeriesAnalysis) -> Self {
        let (a, b) = (&first.capability, &second.capability);
        GroupComparison {
            mean_abs: a.mean.zip(b.mean).map(|(m1, m2)| m1 - m2),
            mean_rel: relative(a.mean, b.mean, 100.0),
            stdev_rel: relative(a.std_dev, b.std_dev, 100.0),
            cpk_rel: relative(Some(a.cpk), Some(b.cpk), 1.0),
        }
    }
}

/// One identity key present in every group of a test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<GroupComparison>,
    pub groups: Vec<SeriesAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<Setting>>,
}

/// Joined results of one test name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestTable {
    pub test_name: String,
    /// Indices of the non-empty groups that were joined
    pub groups: Vec<usize>,
    pub rows: Vec<ComparisonRow>,
}

impl TestTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Inner-join the analyzed groups of one test on their identity keys.
///
/// Rows follow the key order of the first group. Returns `None` when there is
/// no group to join.
pub fn build_table(
    test_name: &str,
    groups: Vec<GroupAnalysis>,
    keep_settings: bool,
) -> Option<TestTable> {
    let group_indices: Vec<usize> = groups.iter().map(|g| g.group).collect();
    let mut groups = groups.into_iter();
    let first = groups.next()?;
    let mut others: Vec<HashMap<String, SeriesAnalysis>> = groups
        .map(|g| g.series.into_iter().map(|s| (s.key.clone(), s)).collect())
        .collect();

    let first_len = first.series.len();
    let mut rows = Vec::with_capacity(first_len);
    for mut series in first.series {
        if !others.iter().all(|g| g.contains_key(&series.key)) {
            continue;
        }

        let mut joined = Vec::with_capacity(others.len() + 1);
        let settings = std::mem::take(&mut series.settings);
        let identity = series.identity.clone();
        let key = series.key.clone();
        joined.push(series);
        for other in others.iter_mut() {
            if let Some(s) = other.remove(&key) {
                joined.push(s);
            }
        }

        let comparison = match joined.as_slice() {
            [a, b] => Some(GroupComparison::between(a, b)),
            _ => None,
        };

        rows.push(ComparisonRow {
            key,
            identity,
            comparison,
            groups: joined,
            settings: keep_settings.then_some(settings),
        });
    }

    debug!(
        test = test_name,
        joined = rows.len(),
        dropped = first_len - rows.len(),
        "Joined groups"
    );

    Some(TestTable {
        test_name: test_name.to_string(),
        groups: group_indices,
        rows,
    })
}
