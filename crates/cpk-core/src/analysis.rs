//! Per-series statistics of one comparison group.
//!
//! Each aggregated series is NaN-pruned, run through outlier detection, binned
//! and summarized with capability statistics.

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{GroupSeries, Identity};
use crate::reshape::Setting;
use crate::stats::{Capability, CapabilityOptions, Histogram, LimitPair, OutlierResult};

/// Default number of histogram bins
pub const DEFAULT_BINS: usize = 5;

/// Largest accepted number of histogram bins
pub const MAX_BINS: usize = 1000;

/// Default outlier budget, in percent of the series length
pub const DEFAULT_OUTLIERS_PERCENT: u32 = 10;

/// Knobs of the per-series analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    pub bins: usize,
    pub outliers_percent: u32,
    pub keep_histogram: bool,
    pub capability: CapabilityOptions,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            outliers_percent: DEFAULT_OUTLIERS_PERCENT,
            keep_histogram: true,
            capability: CapabilityOptions::default(),
        }
    }
}

/// One labelled histogram bin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub label: String,
    pub count: usize,
}

/// Analysis of one series in one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesAnalysis {
    pub group: usize,
    #[serde(skip)]
    pub key: String,
    #[serde(skip)]
    pub identity: Identity,
    #[serde(skip)]
    pub settings: Vec<Setting>,
    pub reference: Option<f64>,
    pub default_limits: LimitPair,
    pub adjusted_limits: LimitPair,
    pub outlier_count: usize,
    pub limit_mismatches: usize,
    pub capability: Capability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBin>>,
    /// NaN-free samples in aggregation order
    pub samples: Vec<f64>,
}

/// Analysis of every series of one group, in aggregation order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAnalysis {
    pub group: usize,
    pub series: Vec<SeriesAnalysis>,
}

impl GroupAnalysis {
    pub fn analyze(series: GroupSeries, options: &AnalysisOptions) -> Self {
        let group = series.group;
        let analyzed: Vec<SeriesAnalysis> = series
            .entries
            .into_iter()
            .map(|entry| {
                let mut samples = entry.samples;
                let defaults = entry.limits.pair();
                let outliers = OutlierResult::detect(&mut samples, defaults, options.outliers_percent);
                if outliers.has_outliers() {
                    debug!(
                        group,
                        key = %entry.key,
                        count = outliers.outlier_indices.len(),
                        "Outliers detected"
                    );
                }

                let histogram = if options.keep_histogram {
                    Histogram::from_samples(&samples, options.bins).map(|h| {
                        h.labelled(group)
                            .into_iter()
                            .map(|(label, count)| HistogramBin { label, count })
                            .collect()
                    })
                } else {
                    None
                };

                let capability =
                    Capability::compute(&samples, defaults, outliers.limits, options.capability);

                SeriesAnalysis {
                    group,
                    key: entry.key,
                    identity: entry.identity,
                    settings: entry.settings,
                    reference: entry.limits.reference,
                    default_limits: defaults,
                    adjusted_limits: outliers.limits,
                    outlier_count: outliers.outlier_indices.len(),
                    limit_mismatches: entry.limit_mismatches,
                    capability,
                    histogram,
                    samples,
                }
            })
            .collect();

        GroupAnalysis {
            group,
            series: analyzed,
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::NormalizedRecord;
    use pretty_assertions::assert_eq;

    fn records(values: &[f64]) -> Vec<NormalizedRecord> {
        values
            .iter()
            .map(|&value| NormalizedRecord {
                hardware_id: "HW1".into(),
                measurement_point: "P1".into(),
                measurement_name: "freq".into(),
                value,
                upper_limit: Some(100.0),
                lower_limit: Some(0.0),
                reference: Some(10.0),
                settings: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_analyze_group() {
        let series = GroupSeries::aggregate(
            2,
            vec![records(&[10.0, 11.0, f64::NAN]), records(&[9.0, 10.0, 12.0, 50.0])],
        );
        let options = AnalysisOptions {
            outliers_percent: 20,
            ..AnalysisOptions::default()
        };
        let analysis = GroupAnalysis::analyze(series, &options);

        assert_eq!(analysis.len(), 1);
        let result = &analysis.series[0];
        assert_eq!(result.samples, vec![10.0, 11.0, 9.0, 10.0, 12.0, 50.0]);
        assert_eq!(result.default_limits, LimitPair::new(Some(0.0), Some(100.0)));
        assert_eq!(result.adjusted_limits, LimitPair::new(Some(0.0), Some(50.0)));
        assert_eq!(result.outlier_count, 1);
        assert_eq!(result.reference, Some(10.0));

        let histogram = result.histogram.as_ref().unwrap();
        assert_eq!(histogram.len(), DEFAULT_BINS);
        assert_eq!(histogram[0].label, "B1_2");
        assert_eq!(histogram[0].count, 5);
        assert_eq!(histogram[4].count, 1);
    }

    #[test]
    fn test_histogram_can_be_dropped() {
        let series = GroupSeries::aggregate(1, vec![records(&[1.0, 2.0, 3.0])]);
        let options = AnalysisOptions {
            keep_histogram: false,
            ..AnalysisOptions::default()
        };
        let analysis = GroupAnalysis::analyze(series, &options);
        assert!(analysis.series[0].histogram.is_none());
    }
}
