//! Area under the ROC curve.
//!
//! The AUC of a score against a binary outcome is the probability that a
//! randomly chosen positive observation has a strictly higher score than a
//! randomly chosen negative one, with tied pairs counting one-half. This is the
//! Mann-Whitney U statistic normalized by `n_positive * n_negative`.
//!
//! The implementation sorts the samples once and sweeps groups of tied scores,
//! accumulating a doubled U statistic in integer arithmetic. Every tied pair
//! contributes exactly one unit of the doubled statistic (one-half of a pair),
//! so the result is numerically identical to the pairwise definition.

/// Error returned when the AUC is undefined because one outcome class is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("AUC is undefined: {positives} positive and {negatives} negative observations")]
pub struct UndefinedAucError {
    /// Number of observations with a positive outcome.
    pub positives: usize,
    /// Number of observations with a negative outcome.
    pub negatives: usize,
}

/// Computes the AUC of `(score, outcome)` samples.
///
/// The samples are copied and sorted internally. Use [`roc_auc_in_place`] to
/// reuse a buffer across many calls.
///
/// # Errors
///
/// Returns [`UndefinedAucError`] if the samples do not contain at least one
/// positive and one negative outcome.
///
/// # Examples
///
/// ```
/// use sofa_stats::auc::roc_auc;
///
/// // Perfect separation
/// let separated = [(1.0, false), (2.0, false), (3.0, true)];
/// assert_eq!(roc_auc(&separated).unwrap(), 1.0);
///
/// // All scores tied
/// let tied = [(5.0, false), (5.0, true), (5.0, true)];
/// assert_eq!(roc_auc(&tied).unwrap(), 0.5);
///
/// // Only one class
/// assert!(roc_auc(&[(1.0, true), (2.0, true)]).is_err());
/// ```
pub fn roc_auc(samples: &[(f64, bool)]) -> Result<f64, UndefinedAucError> {
    let mut buffer = samples.to_vec();
    roc_auc_in_place(&mut buffer)
}

/// Like [`roc_auc`], but sorts the given buffer in place instead of copying it.
///
/// After the call the buffer is sorted by score in ascending order.
///
/// Scores are ordered by [`f64::total_cmp`]; NaN scores rank above every
/// finite score and never tie with each other.
///
/// # Errors
///
/// Returns [`UndefinedAucError`] if the samples do not contain at least one
/// positive and one negative outcome.
#[expect(clippy::cast_precision_loss)]
pub fn roc_auc_in_place(samples: &mut [(f64, bool)]) -> Result<f64, UndefinedAucError> {
    let positives = samples.iter().filter(|(_, outcome)| *outcome).count();
    let negatives = samples.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(UndefinedAucError {
            positives,
            negatives,
        });
    }

    samples.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    // Doubled U statistic: 2 per (positive > negative) pair, 1 per tied pair.
    let mut doubled_u: u64 = 0;
    let mut negatives_below: u64 = 0;
    let mut i = 0;
    while i < samples.len() {
        let score = samples[i].0;
        let mut group_positives: u64 = 0;
        let mut group_negatives: u64 = 0;
        let mut j = i;
        while j < samples.len() && samples[j].0 == score {
            if samples[j].1 {
                group_positives += 1;
            } else {
                group_negatives += 1;
            }
            j += 1;
        }
        // NaN != NaN, so a NaN forms a group of its own
        if j == i {
            if samples[i].1 {
                group_positives = 1;
            } else {
                group_negatives = 1;
            }
            j = i + 1;
        }

        doubled_u += 2 * group_positives * negatives_below + group_positives * group_negatives;
        negatives_below += group_negatives;
        i = j;
    }

    let pairs = positives as u64 * negatives as u64;
    Ok(doubled_u as f64 / (2 * pairs) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference O(N^2) definition.
    #[expect(clippy::cast_precision_loss)]
    fn pairwise_auc(samples: &[(f64, bool)]) -> f64 {
        let mut doubled = 0u64;
        let mut pairs = 0u64;
        for &(pos_score, _) in samples.iter().filter(|(_, o)| *o) {
            for &(neg_score, _) in samples.iter().filter(|(_, o)| !*o) {
                pairs += 1;
                if pos_score > neg_score {
                    doubled += 2;
                } else if pos_score == neg_score {
                    doubled += 1;
                }
            }
        }
        doubled as f64 / (2 * pairs) as f64
    }

    fn samples(scores: &[f64], outcomes: &[u8]) -> Vec<(f64, bool)> {
        scores
            .iter()
            .zip(outcomes)
            .map(|(&s, &o)| (s, o == 1))
            .collect()
    }

    #[test]
    fn test_perfect_separation() {
        let s = samples(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            &[0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
        );
        assert_eq!(roc_auc(&s).unwrap(), 1.0);
    }

    #[test]
    fn test_reversed_separation() {
        let s = samples(&[10.0, 9.0, 8.0, 1.0, 2.0], &[0, 0, 0, 1, 1]);
        assert_eq!(roc_auc(&s).unwrap(), 0.0);
    }

    #[test]
    fn test_all_tied() {
        let s = samples(&[0.0; 10], &[0, 1, 0, 1, 1, 0, 0, 0, 1, 1]);
        assert_eq!(roc_auc(&s).unwrap(), 0.5);
    }

    #[test]
    fn test_single_class_is_undefined() {
        let s = samples(&[1.0, 2.0, 3.0], &[1, 1, 1]);
        assert_eq!(
            roc_auc(&s),
            Err(UndefinedAucError {
                positives: 3,
                negatives: 0
            })
        );
        assert_eq!(
            roc_auc(&[]),
            Err(UndefinedAucError {
                positives: 0,
                negatives: 0
            })
        );
    }

    #[test]
    fn test_partial_ties() {
        // pos: 2, 3, 3 / neg: 1, 3
        // pairs: (2>1) (2<3) (3>1) (3=3) (3>1) (3=3) => 3 + 2*0.5 = 4 of 6
        let s = samples(&[2.0, 3.0, 3.0, 1.0, 3.0], &[1, 1, 1, 0, 0]);
        let auc = roc_auc(&s).unwrap();
        assert!((auc - 4.0 / 6.0).abs() < 1e-15);
        assert_eq!(auc, pairwise_auc(&s));
    }

    #[test]
    fn test_matches_pairwise_on_integer_scores() {
        // Integer-valued scores (like SOFA totals) produce many ties
        let scores = [
            0.0, 3.0, 5.0, 2.0, 2.0, 11.0, 7.0, 4.0, 4.0, 0.0, 9.0, 6.0, 3.0, 3.0, 8.0, 1.0, 12.0,
            5.0, 2.0, 7.0,
        ];
        let outcomes = [0, 0, 1, 0, 1, 1, 0, 0, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1];
        let s = samples(&scores, &outcomes);
        assert_eq!(roc_auc(&s).unwrap(), pairwise_auc(&s));
    }

    #[test]
    fn test_bounds() {
        let scores = [0.3, -1.5, 2.25, 0.3, 7.0, -0.0, 0.0, 1.0];
        let outcomes = [1, 0, 0, 1, 0, 1, 0, 1];
        let s = samples(&scores, &outcomes);
        let auc = roc_auc(&s).unwrap();
        assert!((0.0..=1.0).contains(&auc));
        assert_eq!(auc, pairwise_auc(&s));
    }

    #[test]
    fn test_in_place_sorts_buffer() {
        let mut s = samples(&[3.0, 1.0, 2.0], &[1, 0, 1]);
        roc_auc_in_place(&mut s).unwrap();
        assert!(s.is_sorted_by(|a, b| a.0 <= b.0));
    }
}
