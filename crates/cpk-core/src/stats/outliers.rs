//! Outlier-driven limit adjustment.
//!
//! This module runs the generalized ESD test on one sample series and uses
//! the detected tail outliers to tighten the series' acceptance window.

use serde::{Deserialize, Serialize};

use super::esd::generalized_esd;

/// Significance level of the ESD test
pub const SIGNIFICANCE: f64 = 0.05;

/// Candidate slots handed to the ESD test when the budget rounds down to zero
pub const MIN_OUTLIER_SLOTS: usize = 2;

/// Lower/upper limit pair. A missing limit is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitPair {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl LimitPair {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }
}

/// Outcome of outlier detection on one series
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierResult {
    /// Positions of detected outliers in the NaN-pruned series
    pub outlier_indices: Vec<usize>,
    /// Limits after tightening; never wider than the defaults
    pub limits: LimitPair,
}

impl OutlierResult {
    fn unchanged(defaults: LimitPair) -> Self {
        OutlierResult {
            outlier_indices: Vec::new(),
            limits: defaults,
        }
    }

    /// Detect outliers and derive the adjusted limit pair.
    ///
    /// NaN values are removed from `samples` in place so the caller can reuse
    /// the pruned series. The test only runs when the series has more than
    /// one distinct value and more samples than the outlier budget
    /// `floor(len * outliers_percent / 100)`; a budget below one is raised to
    /// [`MIN_OUTLIER_SLOTS`].
    ///
    /// Only outliers beyond the extremes of the kept values move a limit, and
    /// a limit only ever moves inward.
    ///
    /// # Examples
    ///
    /// ```
    /// use cpk_core::stats::outliers::{LimitPair, OutlierResult};
    ///
    /// let mut samples = vec![10.0, 11.0, 9.0, 10.0, 12.0, 50.0];
    /// let defaults = LimitPair::new(Some(0.0), Some(100.0));
    /// let result = OutlierResult::detect(&mut samples, defaults, 20);
    /// assert_eq!(result.outlier_indices, vec![5]);
    /// assert_eq!(result.limits, LimitPair::new(Some(0.0), Some(50.0)));
    /// ```
    pub fn detect(samples: &mut Vec<f64>, defaults: LimitPair, outliers_percent: u32) -> Self {
        prune_nan(samples);

        let budget = max_outliers(samples.len(), outliers_percent);
        if !has_spread(samples) || samples.len() <= budget {
            return Self::unchanged(defaults);
        }

        let slots = if budget < 1 { MIN_OUTLIER_SLOTS } else { budget };
        let esd = generalized_esd(samples, slots, SIGNIFICANCE);
        if !esd.has_outliers() {
            return Self::unchanged(defaults);
        }

        let (candidates, kept): (Vec<(usize, f64)>, Vec<(usize, f64)>) = samples
            .iter()
            .copied()
            .enumerate()
            .partition(|(i, _)| esd.indices.contains(i));

        let kept_min = kept.iter().map(|&(_, v)| v).fold(f64::INFINITY, f64::min);
        let kept_max = kept.iter().map(|&(_, v)| v).fold(f64::NEG_INFINITY, f64::max);

        // Nearest excursion on each side; candidates inside the kept range are ignored.
        let left = candidates
            .iter()
            .map(|&(_, v)| v)
            .filter(|&v| v < kept_min)
            .reduce(f64::max);
        let right = candidates
            .iter()
            .map(|&(_, v)| v)
            .filter(|&v| v > kept_max)
            .reduce(f64::min);

        let lower = match (defaults.lower, left) {
            (Some(limit), Some(edge)) if edge > limit => Some(edge),
            _ => defaults.lower,
        };
        let upper = match (defaults.upper, right) {
            (Some(limit), Some(edge)) if edge < limit => Some(edge),
            _ => defaults.upper,
        };

        OutlierResult {
            outlier_indices: esd.indices,
            limits: LimitPair { lower, upper },
        }
    }

    /// Check if any outliers were detected.
    pub fn has_outliers(&self) -> bool {
        !self.outlier_indices.is_empty()
    }
}

/// Remove NaN values in place.
pub fn prune_nan(samples: &mut Vec<f64>) {
    samples.retain(|v| !v.is_nan());
}

/// Outlier budget: `floor(len * percent / 100)`.
pub fn max_outliers(len: usize, outliers_percent: u32) -> usize {
    len * outliers_percent as usize / 100
}

fn has_spread(samples: &[f64]) -> bool {
    match samples.split_first() {
        Some((first, rest)) => rest.iter().any(|v| v != first),
        None => false,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the acceptance window only ever shrinks
        #[test]
        fn limits_only_tighten(
            mut samples in prop::collection::vec(-1000.0f64..1000.0, 0..60),
            lower in -2000.0f64..0.0,
            width in 0.0f64..4000.0,
            percent in 0u32..=100,
        ) {
            let defaults = LimitPair::new(Some(lower), Some(lower + width));
            let result = OutlierResult::detect(&mut samples, defaults, percent);

            prop_assert!(result.limits.lower.unwrap() >= lower);
            prop_assert!(result.limits.upper.unwrap() <= lower + width);
        }

        /// Property: a constant series never moves its limits
        #[test]
        fn constant_series_is_stable(
            value in -100.0f64..100.0,
            len in 1usize..40,
            percent in 0u32..=100,
        ) {
            let mut samples = vec![value; len];
            let defaults = LimitPair::new(Some(-500.0), Some(500.0));
            let result = OutlierResult::detect(&mut samples, defaults, percent);
            prop_assert_eq!(result.limits, defaults);
        }
    }
}
