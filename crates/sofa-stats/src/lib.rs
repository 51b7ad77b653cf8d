//! Statistical primitives for comparing severity scores.
//!
//! This crate provides the small set of statistical tools the comparison
//! pipeline is built from:
//!
//! - **AUC estimation**: Mann-Whitney area under the ROC curve with exact tie handling
//! - **Percentiles**: Linearly interpolated percentiles and percentile intervals
//! - **Descriptive statistics**: Count, mean, median, variance, standard deviation, etc.
//! - **Correlation**: Pearson and Spearman coefficients of paired values
//!
//! # Modules
//!
//! - [`auc`]: Area under the ROC curve for one score against a binary outcome
//! - [`percentiles`]: Percentile computation, storage and confidence intervals
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`correlation`]: Linear and rank correlation between two paired datasets
//!
//! # Examples
//!
//! ## Computing an AUC
//!
//! ```
//! use sofa_stats::auc::roc_auc;
//!
//! // (score, outcome)
//! let samples = [(1.0, false), (2.0, false), (3.0, true), (4.0, true)];
//! assert_eq!(roc_auc(&samples).unwrap(), 1.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use sofa_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use sofa_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod auc;
pub mod correlation;
pub mod descriptive;
pub mod percentiles;
