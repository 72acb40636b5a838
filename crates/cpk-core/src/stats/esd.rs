//! Generalized Extreme Studentized Deviate test
//!
//! Detects up to `max_outliers` outliers in a univariate sample. At step `i`
//! the most extreme remaining point is removed and its test statistic
//! `R_i = max |x - mean| / std` (population std) is compared against the
//! critical value `lambda_i` derived from Student's t distribution. The number
//! of outliers is the largest `i` for which `R_i > lambda_i`.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a generalized ESD run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EsdResult {
    /// Number of detected outliers
    pub outlier_count: usize,
    /// Positions of the detected outliers, most extreme first
    pub indices: Vec<usize>,
    /// Test statistic per step
    pub statistics: Vec<f64>,
    /// Critical value per step
    pub critical_values: Vec<f64>,
}

impl EsdResult {
    pub fn has_outliers(&self) -> bool {
        self.outlier_count > 0
    }
}

/// Critical value `lambda` for step `step` of a sample of size `n`.
///
/// NaN when the t distribution has no positive degrees of freedom; a NaN
/// critical value never flags an outlier.
pub fn critical_value(n: usize, step: usize, alpha: f64) -> f64 {
    let remaining = (n - step) as f64;
    let freedom = remaining - 2.0;
    if freedom <= 0.0 {
        return f64::NAN;
    }
    let p = 1.0 - alpha / (2.0 * remaining);
    let t = match StudentsT::new(0.0, 1.0, freedom) {
        Ok(dist) => dist.inverse_cdf(p),
        Err(_) => return f64::NAN,
    };
    (remaining - 1.0) * t / ((freedom + t * t) * remaining).sqrt()
}

/// Run the generalized ESD test.
///
/// # Arguments
///
/// * `samples` - Sample values, NaN-free
/// * `max_outliers` - Upper bound on the number of outliers
/// * `alpha` - Significance level
pub fn generalized_esd(samples: &[f64], max_outliers: usize, alpha: f64) -> EsdResult {
    let n = samples.len();
    let mut active = vec![true; n];
    let mut indices = Vec::with_capacity(max_outliers);
    let mut statistics = Vec::with_capacity(max_outliers);
    let mut critical_values = Vec::with_capacity(max_outliers);

    for step in 0..max_outliers.min(n) {
        let remaining: Vec<usize> = (0..n).filter(|&i| active[i]).collect();
        let count = remaining.len() as f64;
        let mean = remaining.iter().map(|&i| samples[i]).sum::<f64>() / count;
        let variance = remaining
            .iter()
            .map(|&i| (samples[i] - mean).powi(2))
            .sum::<f64>()
            / count;
        let std_dev = variance.sqrt();

        // First index wins ties; a zero std makes every score NaN and the
        // first remaining point is taken.
        let mut most_extreme = remaining[0];
        let mut statistic = ((samples[most_extreme] - mean) / std_dev).abs();
        for &i in &remaining[1..] {
            let score = ((samples[i] - mean) / std_dev).abs();
            if score > statistic {
                most_extreme = i;
                statistic = score;
            }
        }

        indices.push(most_extreme);
        statistics.push(statistic);
        critical_values.push(critical_value(n, step, alpha));
        active[most_extreme] = false;
    }

    let outlier_count = (0..statistics.len())
        .rev()
        .find(|&i| statistics[i] > critical_values[i])
        .map_or(0, |i| i + 1);
    indices.truncate(outlier_count);

    EsdResult {
        outlier_count,
        indices,
        statistics,
        critical_values,
    }
}
