//! Bootstrap comparison of the AUCs of two scores.
//!
//! The cohort is resampled with replacement `resample_count` times; each
//! resample yields a pair of AUCs and their difference `auc_b - auc_a`. The
//! distribution of these differences provides a percentile confidence interval
//! and a two-sided p-value for the difference observed on the full cohort.
//!
//! # Reproducibility
//!
//! Every resample slot `i` owns a random number generator seeded from
//! `(seed, i)`. A slot keeps drawing from its own generator until it gets a
//! resample containing both outcome classes, so the sequence of recorded
//! differences depends only on the cohort, the seed and the resample count,
//! never on the number of worker threads.

use std::{
    ops::Range,
    panic, thread,
    time::{Duration, Instant},
};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use sofa_stats::{auc, descriptive::DescriptiveStats, percentiles::percentile_interval};

use crate::{
    cohort::{Cohort, Observation, ScoreColumn},
    config::{BootstrapConfig, ConfigError},
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum CompareError {
    #[display("invalid bootstrap configuration: {_0}")]
    InvalidConfig(ConfigError),
    #[display(
        "cohort needs both outcome classes to compare AUCs ({positives} positive, {negatives} negative)"
    )]
    InsufficientCohort { positives: usize, negatives: usize },
    #[display(
        "resample #{slot} drew {failures} single-class samples in a row; outcome classes are too imbalanced to bootstrap"
    )]
    ExhaustedResampling { slot: usize, failures: usize },
    #[display("resampling did not finish within {limit:?}")]
    DeadlineExceeded { limit: Duration },
}

/// Outcome of a significance check at a given alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Verdict {
    /// Score b discriminates significantly better than score a.
    ScoreBBetter,
    /// Score b discriminates significantly worse than score a.
    ScoreBWorse,
    /// The difference is not significant.
    NotSignificant,
}

/// Result of a bootstrap AUC comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// AUC of score a on the full cohort.
    pub auc_a: f64,
    /// AUC of score b on the full cohort.
    pub auc_b: f64,
    /// `auc_b - auc_a` on the full cohort.
    pub observed_difference: f64,
    /// `auc_b - auc_a` of every valid resample, in slot order.
    pub resample_diffs: Vec<f64>,
    /// AUC of score a of every valid resample, in slot order.
    pub resample_aucs_a: Vec<f64>,
    /// AUC of score b of every valid resample, in slot order.
    pub resample_aucs_b: Vec<f64>,
    pub confidence_level: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    /// Two-sided p-value, `min(1, 2 * one_sided_p)`.
    pub p_value: f64,
    /// Fraction of resample differences on the opposite side of zero from the
    /// observed difference (exact zeros count one-half).
    pub one_sided_p: f64,
    /// The base seed the resamples were drawn with.
    pub seed: u64,
    /// Number of single-class draws that were discarded and redrawn.
    pub degenerate_resamples: usize,
}

impl BootstrapResult {
    /// Number of valid resamples.
    #[must_use]
    pub fn resample_count(&self) -> usize {
        self.resample_diffs.len()
    }

    /// Percentile interval of the resample differences at another confidence level.
    ///
    /// Levels outside `(0, 1)` are clamped to the full range of the differences.
    #[must_use]
    pub fn interval(&self, confidence_level: f64) -> (f64, f64) {
        sorted_interval(&self.resample_diffs, confidence_level)
    }

    /// Percentile interval of one score's resample AUCs.
    #[must_use]
    pub fn auc_interval(&self, column: ScoreColumn, confidence_level: f64) -> (f64, f64) {
        let aucs = match column {
            ScoreColumn::A => &self.resample_aucs_a,
            ScoreColumn::B => &self.resample_aucs_b,
        };
        sorted_interval(aucs, confidence_level)
    }

    /// Point estimate of one score's AUC.
    #[must_use]
    pub fn auc(&self, column: ScoreColumn) -> f64 {
        match column {
            ScoreColumn::A => self.auc_a,
            ScoreColumn::B => self.auc_b,
        }
    }

    /// Mean, spread and range of the resample differences.
    #[must_use]
    pub fn difference_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.resample_diffs.iter().copied())
    }

    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Classifies the comparison at significance level `alpha`.
    #[must_use]
    pub fn verdict(&self, alpha: f64) -> Verdict {
        if !self.is_significant(alpha) {
            Verdict::NotSignificant
        } else if self.observed_difference > 0.0 {
            Verdict::ScoreBBetter
        } else if self.observed_difference < 0.0 {
            Verdict::ScoreBWorse
        } else {
            Verdict::NotSignificant
        }
    }
}

fn sorted_interval(values: &[f64], confidence_level: f64) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_interval(&sorted, confidence_level)
}

/// Compares the AUCs of score b and score a on `cohort` by bootstrap resampling.
///
/// # Errors
///
/// * [`CompareError::InvalidConfig`] if `config` fails validation
/// * [`CompareError::InsufficientCohort`] if the cohort lacks an outcome class
/// * [`CompareError::ExhaustedResampling`] if a resample slot exceeds
///   `max_consecutive_failures` single-class draws in a row
/// * [`CompareError::DeadlineExceeded`] if `time_limit` elapses first
///
/// # Examples
///
/// ```
/// use sofa_analysis::{
///     bootstrap,
///     cohort::{Cohort, Observation},
///     config::BootstrapConfig,
/// };
///
/// let observations = (0..20)
///     .map(|i| Observation::new(i % 2 == 0, f64::from(i % 5), f64::from(i % 3)))
///     .collect();
/// let cohort = Cohort::new(observations).unwrap();
/// let config = BootstrapConfig {
///     resample_count: 200,
///     seed: Some(42),
///     ..BootstrapConfig::default()
/// };
/// let result = bootstrap::compare(&cohort, &config).unwrap();
/// assert_eq!(result.resample_diffs.len(), 200);
/// assert!(result.ci_low <= result.ci_high);
/// ```
pub fn compare(
    cohort: &Cohort,
    config: &BootstrapConfig,
) -> Result<BootstrapResult, CompareError> {
    config.validate().map_err(CompareError::InvalidConfig)?;

    let insufficient = || CompareError::InsufficientCohort {
        positives: cohort.positives(),
        negatives: cohort.negatives(),
    };
    if !cohort.has_both_classes() {
        return Err(insufficient());
    }
    let auc_a = cohort.auc(ScoreColumn::A).map_err(|_| insufficient())?;
    let auc_b = cohort.auc(ScoreColumn::B).map_err(|_| insufficient())?;
    let observed_difference = auc_b - auc_a;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let resample_count = config.resample_count;
    let threads = config.threads.min(resample_count);
    tracing::info!(
        observations = cohort.len(),
        positives = cohort.positives(),
        resample_count,
        seed,
        threads,
        "starting bootstrap comparison"
    );

    let started = Instant::now();
    let deadline = config.time_limit.map(|limit| (started + limit, limit));
    let resampler = Resampler {
        observations: cohort.observations(),
        seed,
        max_consecutive_failures: config.max_consecutive_failures,
        deadline,
    };
    let chunks = run_partitioned(&resampler, resample_count, threads);

    let mut resample_aucs_a = Vec::with_capacity(resample_count);
    let mut resample_aucs_b = Vec::with_capacity(resample_count);
    let mut degenerate_resamples = 0;
    for chunk in chunks {
        let chunk = chunk?;
        degenerate_resamples += chunk.degenerate;
        for (a, b) in chunk.aucs {
            resample_aucs_a.push(a);
            resample_aucs_b.push(b);
        }
    }
    let resample_diffs = resample_aucs_a
        .iter()
        .zip(&resample_aucs_b)
        .map(|(a, b)| b - a)
        .collect::<Vec<_>>();

    let (ci_low, ci_high) = sorted_interval(&resample_diffs, config.confidence_level);
    let one_sided_p = opposite_tail_fraction(observed_difference, &resample_diffs);
    let p_value = (2.0 * one_sided_p).min(1.0);

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis(),
        degenerate_resamples,
        observed_difference,
        p_value,
        "bootstrap comparison finished"
    );

    Ok(BootstrapResult {
        auc_a,
        auc_b,
        observed_difference,
        resample_diffs,
        resample_aucs_a,
        resample_aucs_b,
        confidence_level: config.confidence_level,
        ci_low,
        ci_high,
        p_value,
        one_sided_p,
        seed,
        degenerate_resamples,
    })
}

/// Like [`compare`], taking the three call-time parameters directly and
/// defaulting everything else.
pub fn compare_with(
    cohort: &Cohort,
    resample_count: usize,
    confidence_level: f64,
    seed: Option<u64>,
) -> Result<BootstrapResult, CompareError> {
    let config = BootstrapConfig {
        resample_count,
        confidence_level,
        seed,
        ..BootstrapConfig::default()
    };
    compare(cohort, &config)
}

/// Fraction of `diffs` on the other side of zero from `observed`.
///
/// For a positive `observed` this counts negative differences, for a negative
/// one positive differences. For an `observed` of exactly zero it takes the
/// smaller of the two tails. Differences exactly equal to zero count one-half
/// toward either tail.
#[expect(clippy::cast_precision_loss)]
fn opposite_tail_fraction(observed: f64, diffs: &[f64]) -> f64 {
    if diffs.is_empty() {
        return f64::NAN;
    }
    // doubled counts, so each zero adds one to both tails
    let (mut below, mut above) = (0usize, 0usize);
    for &diff in diffs {
        if diff < 0.0 {
            below += 2;
        } else if diff > 0.0 {
            above += 2;
        } else {
            below += 1;
            above += 1;
        }
    }
    let doubled = if observed > 0.0 {
        below
    } else if observed < 0.0 {
        above
    } else {
        below.min(above)
    };
    doubled as f64 / (2 * diffs.len()) as f64
}

/// Runs `0..resample_count` split into contiguous chunks over `threads`
/// workers and returns the chunk outputs in slot order.
fn run_partitioned(
    resampler: &Resampler<'_>,
    resample_count: usize,
    threads: usize,
) -> Vec<Result<ChunkOutput, CompareError>> {
    if threads <= 1 {
        return vec![resampler.run(0..resample_count)];
    }

    let chunk_len = resample_count.div_ceil(threads);
    thread::scope(|s| {
        let handles = (0..threads)
            .map(|t| {
                let start = (t * chunk_len).min(resample_count);
                let end = ((t + 1) * chunk_len).min(resample_count);
                s.spawn(move || resampler.run(start..end))
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect()
    })
}

#[derive(Debug)]
struct ChunkOutput {
    /// `(auc_a, auc_b)` per slot.
    aucs: Vec<(f64, f64)>,
    degenerate: usize,
}

#[derive(Debug)]
struct Resampler<'a> {
    observations: &'a [Observation],
    seed: u64,
    max_consecutive_failures: usize,
    deadline: Option<(Instant, Duration)>,
}

impl Resampler<'_> {
    fn run(&self, slots: Range<usize>) -> Result<ChunkOutput, CompareError> {
        let n = self.observations.len();
        let mut samples_a = Vec::with_capacity(n);
        let mut samples_b = Vec::with_capacity(n);
        let mut aucs = Vec::with_capacity(slots.len());
        let mut degenerate = 0;

        tracing::debug!(start = slots.start, end = slots.end, "resampling chunk");
        for slot in slots {
            let mut rng = slot_rng(self.seed, slot);
            let mut failures = 0;
            loop {
                self.check_deadline()?;

                samples_a.clear();
                samples_b.clear();
                for _ in 0..n {
                    let obs = self.observations[rng.random_range(0..n)];
                    samples_a.push((obs.score_a, obs.outcome));
                    samples_b.push((obs.score_b, obs.outcome));
                }

                match (
                    auc::roc_auc_in_place(&mut samples_a),
                    auc::roc_auc_in_place(&mut samples_b),
                ) {
                    (Ok(a), Ok(b)) => {
                        aucs.push((a, b));
                        break;
                    }
                    (Err(err), _) | (_, Err(err)) => {
                        tracing::trace!(slot, %err, "discarding single-class resample");
                        degenerate += 1;
                        failures += 1;
                        if failures > self.max_consecutive_failures {
                            return Err(CompareError::ExhaustedResampling { slot, failures });
                        }
                    }
                }
            }
        }

        Ok(ChunkOutput { aucs, degenerate })
    }

    fn check_deadline(&self) -> Result<(), CompareError> {
        match self.deadline {
            Some((deadline, limit)) if Instant::now() >= deadline => {
                Err(CompareError::DeadlineExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

/// Generator owned by resample slot `slot`.
fn slot_rng(seed: u64, slot: usize) -> Pcg64 {
    Pcg64::seed_from_u64(splitmix64(seed ^ splitmix64(slot as u64)))
}

/// SplitMix64 finalizer.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
