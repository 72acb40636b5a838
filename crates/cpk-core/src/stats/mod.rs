//! Statistical analysis of sample series
//!
//! This module provides the generalized ESD outlier test, limit tightening
//! driven by its result, bin-count histograms, and capability statistics.
//!
//! # Examples
//!
//! ```
//! use cpk_core::stats::{Capability, CapabilityOptions, Histogram, LimitPair, OutlierResult};
//!
//! let mut samples = vec![10.0, 11.0, f64::NAN, 9.0, 10.0, 12.0, 50.0];
//! let defaults = LimitPair::new(Some(0.0), Some(100.0));
//!
//! // NaNs are pruned in place before the test runs
//! let outliers = OutlierResult::detect(&mut samples, defaults, 20);
//! let histogram = Histogram::from_samples(&samples, 5).unwrap();
//! let capability =
//!     Capability::compute(&samples, defaults, outliers.limits, CapabilityOptions::default());
//!
//! assert_eq!(samples.len(), 6);
//! assert_eq!(histogram.bins(), 5);
//! assert_eq!(capability.fails, 0);
//! ```

pub mod capability;
pub mod esd;
pub mod histogram;
pub mod outliers;

// Re-export main types and functions
pub use capability::{Capability, CapabilityOptions, LimitSource};
pub use esd::{generalized_esd, EsdResult};
pub use histogram::Histogram;
pub use outliers::{max_outliers, prune_nan, LimitPair, OutlierResult};
