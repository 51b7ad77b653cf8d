//! Bootstrap comparison of the discriminative power of two severity scores
//!
//! This crate holds the domain layer of the comparison pipeline: the cohort of
//! scored observations, the bootstrap configuration, the comparator itself and
//! the summaries reported alongside it.
//!
//! # Overview
//!
//! 1. **Build a Cohort** ([`cohort::Cohort`]): one [`cohort::Observation`] per case,
//!    holding the binary outcome and the two scores
//! 2. **Configure** ([`config::BootstrapConfig`]): resample count, confidence level,
//!    seed, worker threads and failure/time budgets
//! 3. **Compare** ([`bootstrap::compare`]): point AUCs, resampled AUC differences,
//!    percentile interval and two-sided p-value in a [`bootstrap::BootstrapResult`]
//! 4. **Summarize** ([`summary::CohortSummary`]): counts, event rate and per-score
//!    distribution for reporting
//!
//! # Examples
//!
//! ```
//! use sofa_analysis::{
//!     bootstrap::{self, Verdict},
//!     cohort::{Cohort, Observation},
//!     config::BootstrapConfig,
//! };
//!
//! // Score a separates the outcome perfectly, score b carries no information
//! let observations = (1..=10)
//!     .map(|i| Observation::new(i > 5, f64::from(i), 0.0))
//!     .collect();
//! let cohort = Cohort::new(observations)?;
//!
//! let config = BootstrapConfig {
//!     resample_count: 1000,
//!     seed: Some(42),
//!     ..BootstrapConfig::default()
//! };
//! let result = bootstrap::compare(&cohort, &config)?;
//!
//! assert_eq!(result.auc_a, 1.0);
//! assert_eq!(result.auc_b, 0.5);
//! assert_eq!(result.observed_difference, -0.5);
//! assert_eq!(result.verdict(0.05), Verdict::ScoreBWorse);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bootstrap;
pub mod cohort;
pub mod config;
pub mod summary;
