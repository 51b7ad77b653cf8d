use std::fmt;

use serde::{Deserialize, Serialize};
use sofa_stats::auc::{self, UndefinedAucError};

/// One of the two score systems being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreColumn {
    /// The reference score (e.g. SOFA-1).
    A,
    /// The candidate score (e.g. SOFA-2).
    B,
}

impl fmt::Display for ScoreColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreColumn::A => f.write_str("score_a"),
            ScoreColumn::B => f.write_str("score_b"),
        }
    }
}

/// One evaluated case: a binary outcome and the two scores computed for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// `true` if the event (e.g. death) occurred.
    pub outcome: bool,
    pub score_a: f64,
    pub score_b: f64,
}

impl Observation {
    #[must_use]
    pub fn new(outcome: bool, score_a: f64, score_b: f64) -> Self {
        Self {
            outcome,
            score_a,
            score_b,
        }
    }

    #[must_use]
    pub fn score(&self, column: ScoreColumn) -> f64 {
        match column {
            ScoreColumn::A => self.score_a,
            ScoreColumn::B => self.score_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum CohortError {
    #[display("observation #{index} has a non-finite {column} ({value})")]
    NonFiniteScore {
        index: usize,
        column: ScoreColumn,
        value: f64,
    },
}

/// An immutable, ordered collection of observations.
///
/// The order carries no meaning beyond making resampling reproducible.
///
/// # Examples
///
/// ```
/// use sofa_analysis::cohort::{Cohort, Observation, ScoreColumn};
///
/// let cohort = Cohort::new(vec![
///     Observation::new(false, 1.0, 0.0),
///     Observation::new(true, 3.0, 0.0),
/// ])
/// .unwrap();
/// assert_eq!(cohort.positives(), 1);
/// assert_eq!(cohort.auc(ScoreColumn::A).unwrap(), 1.0);
/// assert_eq!(cohort.auc(ScoreColumn::B).unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Cohort {
    observations: Vec<Observation>,
    #[serde(skip)]
    positives: usize,
}

impl Cohort {
    /// Builds a cohort, rejecting NaN and infinite scores.
    pub fn new(observations: Vec<Observation>) -> Result<Self, CohortError> {
        for (index, obs) in observations.iter().enumerate() {
            for column in [ScoreColumn::A, ScoreColumn::B] {
                let value = obs.score(column);
                if !value.is_finite() {
                    return Err(CohortError::NonFiniteScore {
                        index,
                        column,
                        value,
                    });
                }
            }
        }
        let positives = observations.iter().filter(|obs| obs.outcome).count();
        Ok(Self {
            observations,
            positives,
        })
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations with a positive outcome.
    #[must_use]
    pub fn positives(&self) -> usize {
        self.positives
    }

    /// Number of observations with a negative outcome.
    #[must_use]
    pub fn negatives(&self) -> usize {
        self.observations.len() - self.positives
    }

    /// Returns `true` if the cohort has at least one case of each outcome,
    /// i.e. the AUC is defined.
    #[must_use]
    pub fn has_both_classes(&self) -> bool {
        self.positives > 0 && self.negatives() > 0
    }

    /// Computes the AUC of one score over the whole cohort.
    pub fn auc(&self, column: ScoreColumn) -> Result<f64, UndefinedAucError> {
        let mut samples = self
            .observations
            .iter()
            .map(|obs| (obs.score(column), obs.outcome))
            .collect::<Vec<_>>();
        auc::roc_auc_in_place(&mut samples)
    }

    /// Returns a copy of the cohort with score a and score b exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        let observations = self
            .observations
            .iter()
            .map(|obs| Observation::new(obs.outcome, obs.score_b, obs.score_a))
            .collect();
        Self {
            observations,
            positives: self.positives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_finite_scores() {
        let err = Cohort::new(vec![
            Observation::new(true, 1.0, 2.0),
            Observation::new(false, 1.0, f64::NAN),
        ])
        .unwrap_err();
        let CohortError::NonFiniteScore { index, column, .. } = err;
        assert_eq!(index, 1);
        assert_eq!(column, ScoreColumn::B);

        assert!(Cohort::new(vec![Observation::new(true, f64::INFINITY, 0.0)]).is_err());
    }

    #[test]
    fn test_class_counts() {
        let cohort = Cohort::new(vec![
            Observation::new(true, 1.0, 1.0),
            Observation::new(true, 2.0, 1.0),
            Observation::new(false, 3.0, 1.0),
        ])
        .unwrap();
        assert_eq!(cohort.len(), 3);
        assert_eq!(cohort.positives(), 2);
        assert_eq!(cohort.negatives(), 1);
        assert!(cohort.has_both_classes());
    }

    #[test]
    fn test_single_class_auc_is_undefined() {
        let cohort = Cohort::new(vec![
            Observation::new(false, 1.0, 1.0),
            Observation::new(false, 2.0, 1.0),
        ])
        .unwrap();
        assert!(!cohort.has_both_classes());
        assert!(cohort.auc(ScoreColumn::A).is_err());
    }

    #[test]
    fn test_swapped_exchanges_aucs() {
        let cohort = Cohort::new(vec![
            Observation::new(false, 1.0, 4.0),
            Observation::new(false, 2.0, 1.0),
            Observation::new(true, 3.0, 2.0),
        ])
        .unwrap();
        let swapped = cohort.swapped();
        assert_eq!(
            cohort.auc(ScoreColumn::A).unwrap(),
            swapped.auc(ScoreColumn::B).unwrap()
        );
        assert_eq!(
            cohort.auc(ScoreColumn::B).unwrap(),
            swapped.auc(ScoreColumn::A).unwrap()
        );
    }
}
