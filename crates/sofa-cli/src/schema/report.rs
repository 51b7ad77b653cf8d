use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sofa_analysis::{
    bootstrap::{BootstrapResult, Verdict},
    cohort::ScoreColumn,
    config::BootstrapConfig,
    summary::CohortSummary,
};
use sofa_stats::descriptive::DescriptiveStats;

use crate::data::ScoreLabels;

/// Saved result of a `compare` run
///
/// Holds everything needed to cite the comparison. The per-resample values are
/// written separately with `--resamples-csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareReport {
    /// Timestamp when the report was generated (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// Input table the cohort was loaded from
    pub input: String,
    pub labels: ScoreLabels,
    /// Rows in the input table, including dropped ones
    pub total_rows: usize,
    /// Rows dropped for missing values
    pub dropped_rows: usize,
    /// Configuration as given; the effective seed is in `comparison.seed`
    pub config: BootstrapConfig,
    pub alpha: f64,
    pub cohort: CohortSummary,
    pub comparison: ComparisonReport,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub auc_a: ScoreAuc,
    pub auc_b: ScoreAuc,
    /// `auc_b - auc_a` on the full cohort
    pub observed_difference: f64,
    /// Difference intervals, the configured level first
    pub intervals: Vec<Interval>,
    pub difference_stats: Option<DescriptiveStats>,
    pub p_value: f64,
    pub one_sided_p: f64,
    pub resample_count: usize,
    pub degenerate_resamples: usize,
    pub seed: u64,
}

/// Point AUC of one score with its bootstrap interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAuc {
    pub auc: f64,
    pub interval: Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub confidence_level: f64,
    pub low: f64,
    pub high: f64,
}

impl ComparisonReport {
    pub fn new(result: &BootstrapResult, extra_levels: &[f64]) -> Self {
        let level = result.confidence_level;
        let score_auc = |column| {
            let (low, high) = result.auc_interval(column, level);
            ScoreAuc {
                auc: result.auc(column),
                interval: Interval {
                    confidence_level: level,
                    low,
                    high,
                },
            }
        };
        let intervals = std::iter::once(level)
            .chain(extra_levels.iter().copied())
            .map(|confidence_level| {
                let (low, high) = result.interval(confidence_level);
                Interval {
                    confidence_level,
                    low,
                    high,
                }
            })
            .collect();
        Self {
            auc_a: score_auc(ScoreColumn::A),
            auc_b: score_auc(ScoreColumn::B),
            observed_difference: result.observed_difference,
            intervals,
            difference_stats: result.difference_stats(),
            p_value: result.p_value,
            one_sided_p: result.one_sided_p,
            resample_count: result.resample_count(),
            degenerate_resamples: result.degenerate_resamples,
            seed: result.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use sofa_analysis::{
        bootstrap,
        cohort::{Cohort, Observation},
    };

    use super::*;

    #[test]
    fn test_comparison_report_intervals() {
        let observations = (0..40)
            .map(|i| Observation::new(i % 4 == 0, f64::from(i % 7), f64::from(i % 5)))
            .collect();
        let cohort = Cohort::new(observations).unwrap();
        let result = bootstrap::compare_with(&cohort, 400, 0.95, Some(11)).unwrap();
        let report = ComparisonReport::new(&result, &[0.90, 0.50]);

        let levels = report
            .intervals
            .iter()
            .map(|interval| interval.confidence_level)
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![0.95, 0.90, 0.50]);
        for pair in report.intervals.windows(2) {
            let (wide, narrow) = (pair[0], pair[1]);
            assert!(wide.low <= narrow.low && narrow.high <= wide.high);
            assert!(narrow.low <= narrow.high);
        }
        assert_eq!(
            (report.intervals[0].low, report.intervals[0].high),
            (result.ci_low, result.ci_high)
        );

        assert_eq!(report.auc_a.auc, result.auc_a);
        assert_eq!(report.auc_b.auc, result.auc_b);
        assert!(report.auc_a.interval.low <= report.auc_a.interval.high);
        assert_eq!(report.resample_count, 400);
        assert_eq!(report.seed, 11);
        assert_eq!(report.p_value, result.p_value);
    }
}
