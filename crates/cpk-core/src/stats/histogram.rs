//! Bin-count histograms of a sample series.
//!
//! Bins are closed on both ends, so a value sitting exactly on an internal
//! edge is counted in both neighbouring bins. A series with zero range gets
//! all-zero counts.

use serde::{Deserialize, Serialize};

/// Histogram of one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` edges; the last edge is exactly the series maximum
    pub edges: Vec<f64>,
    /// Frequency per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin a NaN-free series into `bins` bins.
    ///
    /// Returns `None` for an empty series or zero bins.
    ///
    /// # Examples
    ///
    /// ```
    /// use cpk_core::stats::histogram::Histogram;
    ///
    /// let hist = Histogram::from_samples(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 5).unwrap();
    /// assert_eq!(hist.counts, vec![2, 2, 2, 2, 2]);
    /// ```
    pub fn from_samples(samples: &[f64], bins: usize) -> Option<Self> {
        if samples.is_empty() || bins == 0 {
            return None;
        }

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let width = range / bins as f64;

        let mut edges = Vec::with_capacity(bins + 1);
        let mut edge = min;
        edges.push(edge);
        for _ in 0..bins {
            edge += width;
            edges.push(edge);
        }
        edges[bins] = max;

        let counts = if range == 0.0 {
            vec![0; bins]
        } else {
            edges
                .windows(2)
                .map(|w| samples.iter().filter(|&&v| w[0] <= v && v <= w[1]).count())
                .collect()
        };

        Some(Histogram { edges, counts })
    }

    /// Number of bins
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all bin counts, shared-edge double counts included
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(label, count)` pairs, labelled `B<n>_<group>` with 1-based `n`
    pub fn labelled(&self, group: usize) -> Vec<(String, usize)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (format!("B{}_{}", i + 1, group), count))
            .collect()
    }
}
