use serde::{Deserialize, Serialize};
use sofa_stats::{correlation, descriptive::DescriptiveStats, percentiles::Percentiles};

use crate::cohort::{Cohort, ScoreColumn};

/// Percentile points reported for each score.
pub const QUARTILE_POINTS: [f64; 3] = [25.0, 50.0, 75.0];

/// Distribution and discrimination of one score over a cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub column: ScoreColumn,
    /// AUC against the outcome, `None` if the cohort lacks an outcome class.
    pub auc: Option<f64>,
    pub stats: DescriptiveStats,
    pub quartiles: Percentiles,
}

/// How the two scores of each observation agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairedSummary {
    /// Pearson correlation of the scores, `None` if either score is constant.
    pub pearson: Option<f64>,
    /// Spearman rank correlation of the scores, `None` if either score is constant.
    pub spearman: Option<f64>,
    /// Fraction of observations where both scores are equal.
    pub exact_agreement: f64,
    /// Mean of `|score_b - score_a|`.
    pub mean_abs_difference: f64,
    /// Distribution of `score_b - score_a`; `max` and `min` are the largest
    /// increase and decrease.
    pub difference: DescriptiveStats,
    pub b_higher: usize,
    pub no_change: usize,
    pub a_higher: usize,
}

/// Overview of a cohort before comparison.
///
/// # Examples
///
/// ```
/// use sofa_analysis::{
///     cohort::{Cohort, Observation},
///     summary::CohortSummary,
/// };
///
/// let cohort = Cohort::new(vec![
///     Observation::new(false, 2.0, 3.0),
///     Observation::new(false, 4.0, 3.0),
///     Observation::new(true, 9.0, 8.0),
///     Observation::new(false, 1.0, 0.0),
/// ])
/// .unwrap();
/// let summary = CohortSummary::new(&cohort).unwrap();
/// assert_eq!(summary.count, 4);
/// assert_eq!(summary.event_rate, 0.25);
/// assert_eq!(summary.score_a.auc, Some(1.0));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSummary {
    pub count: usize,
    pub positives: usize,
    pub negatives: usize,
    /// Fraction of observations with a positive outcome.
    pub event_rate: f64,
    pub score_a: ScoreSummary,
    pub score_b: ScoreSummary,
    pub paired: PairedSummary,
}

impl CohortSummary {
    /// Summarizes `cohort`; returns `None` for an empty cohort.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(cohort: &Cohort) -> Option<Self> {
        if cohort.is_empty() {
            return None;
        }
        let score_a = ScoreSummary::new(cohort, ScoreColumn::A)?;
        let score_b = ScoreSummary::new(cohort, ScoreColumn::B)?;
        let paired = PairedSummary::new(cohort)?;
        Some(Self {
            count: cohort.len(),
            positives: cohort.positives(),
            negatives: cohort.negatives(),
            event_rate: cohort.positives() as f64 / cohort.len() as f64,
            score_a,
            score_b,
            paired,
        })
    }

    #[must_use]
    pub fn score(&self, column: ScoreColumn) -> &ScoreSummary {
        match column {
            ScoreColumn::A => &self.score_a,
            ScoreColumn::B => &self.score_b,
        }
    }
}

impl ScoreSummary {
    fn new(cohort: &Cohort, column: ScoreColumn) -> Option<Self> {
        let mut values = cohort
            .observations()
            .iter()
            .map(|obs| obs.score(column))
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let stats = DescriptiveStats::from_sorted(&values)?;
        let quartiles = Percentiles::from_sorted(&values, &QUARTILE_POINTS);
        Some(Self {
            column,
            auc: cohort.auc(column).ok(),
            stats,
            quartiles,
        })
    }
}

impl PairedSummary {
    #[expect(clippy::cast_precision_loss)]
    fn new(cohort: &Cohort) -> Option<Self> {
        let observations = cohort.observations();
        let scores_a = observations.iter().map(|obs| obs.score_a).collect::<Vec<_>>();
        let scores_b = observations.iter().map(|obs| obs.score_b).collect::<Vec<_>>();
        let differences = observations
            .iter()
            .map(|obs| obs.score_b - obs.score_a)
            .collect::<Vec<_>>();
        let difference = DescriptiveStats::new(differences.iter().copied())?;

        let b_higher = differences.iter().filter(|d| **d > 0.0).count();
        let a_higher = differences.iter().filter(|d| **d < 0.0).count();
        let no_change = differences.len() - b_higher - a_higher;
        let n = differences.len() as f64;
        Some(Self {
            pearson: correlation::pearson(&scores_a, &scores_b),
            spearman: correlation::spearman(&scores_a, &scores_b),
            exact_agreement: no_change as f64 / n,
            mean_abs_difference: differences.iter().map(|d| d.abs()).sum::<f64>() / n,
            difference,
            b_higher,
            no_change,
            a_higher,
        })
    }
}
