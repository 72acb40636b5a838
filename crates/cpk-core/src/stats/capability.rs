//! Process capability statistics (Cp/Cpk) of one series.

use serde::{Deserialize, Serialize};

use super::outliers::LimitPair;

/// Which limit pair the capability window is built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitSource {
    /// Limits as found in the logs
    #[default]
    Default,
    /// Limits after outlier tightening
    Adjusted,
}

/// How to derive the capability window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOptions {
    pub source: LimitSource,
    /// Scale factor applied to the chosen limits
    pub factor: f64,
}

impl Default for CapabilityOptions {
    fn default() -> Self {
        Self {
            source: LimitSource::Default,
            factor: 1.0,
        }
    }
}

/// Capability summary of one series against one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub lower: f64,
    pub upper: f64,
    pub range: f64,
    /// Samples strictly outside the window
    pub fails: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std_dev: Option<f64>,
    pub cp: f64,
    pub cpk: f64,
}

/// Scale an upper limit by `factor`; a missing limit counts as zero.
pub fn scaled_upper(limit: Option<f64>, factor: f64) -> f64 {
    if factor <= 0.0 {
        return 0.0;
    }
    let base = limit.unwrap_or(0.0);
    if base > 0.0 {
        base * factor
    } else {
        2.0 * base - base * factor
    }
}

/// Scale a lower limit by `factor`; a missing limit counts as zero.
pub fn scaled_lower(limit: Option<f64>, factor: f64) -> f64 {
    if factor <= 0.0 {
        return 0.0;
    }
    let base = limit.unwrap_or(0.0);
    if base < 0.0 {
        base * factor
    } else {
        2.0 * base - base * factor
    }
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Standard deviation with n - 1 in the denominator
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean_of(values)?;
    let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squared / (values.len() - 1) as f64).sqrt())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Capability {
    /// Compute the capability of `samples` (NaN-free).
    ///
    /// Min, max and mean use the literal window `lower..=upper`, except that
    /// the mean covers every sample when both bounds are zero. The standard
    /// deviation treats a bound of exactly zero as open on that side.
    pub fn compute(
        samples: &[f64],
        defaults: LimitPair,
        adjusted: LimitPair,
        options: CapabilityOptions,
    ) -> Self {
        let chosen = match options.source {
            LimitSource::Default => defaults,
            LimitSource::Adjusted => adjusted,
        };
        let upper = scaled_upper(chosen.upper, options.factor);
        let lower = scaled_lower(chosen.lower, options.factor);

        let fails = samples.iter().filter(|&&v| v > upper || v < lower).count();
        let inside: Vec<f64> = samples
            .iter()
            .copied()
            .filter(|&v| v >= lower && v <= upper)
            .collect();

        let min = inside.iter().copied().reduce(f64::min);
        let max = inside.iter().copied().reduce(f64::max);
        let mean = if lower == 0.0 && upper == 0.0 {
            mean_of(samples)
        } else {
            mean_of(&inside)
        };

        let spread: Vec<f64> = samples
            .iter()
            .copied()
            .filter(|&v| (lower == 0.0 || v >= lower) && (upper == 0.0 || v <= upper))
            .collect();
        let std_dev = sample_std_dev(&spread);

        let range = upper - lower;
        let (cp, cpk) = match (std_dev, mean) {
            (Some(sigma), Some(mean)) if sigma > 0.0 => (
                round2(range / (6.0 * sigma)),
                round2(((upper - mean).abs()).min((mean - lower).abs()) / (3.0 * sigma)),
            ),
            _ => (0.0, 0.0),
        };

        Capability {
            lower,
            upper,
            range,
            fails,
            min,
            max,
            mean,
            std_dev,
            cp,
            cpk,
        }
    }
}
