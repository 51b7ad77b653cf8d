//! Correlation between paired values.
//!
//! [`spearman`] ranks ties by the mean of the positions they occupy, so it
//! matches the usual tie-corrected Spearman coefficient.

/// Pearson product-moment correlation of paired values.
///
/// Returns `None` if the slices differ in length, hold fewer than two pairs,
/// or either side has zero variance.
///
/// # Examples
///
/// ```
/// use sofa_stats::correlation::pearson;
///
/// let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
/// assert!((r - 1.0).abs() < 1e-12);
/// assert_eq!(pearson(&[1.0, 2.0], &[3.0, 3.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Spearman rank correlation: the Pearson correlation of [`average_ranks`].
///
/// Returns `None` under the same conditions as [`pearson`].
#[must_use]
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    pearson(&average_ranks(xs), &average_ranks(ys))
}

/// 1-based ranks of `values`; tied values share the mean of their positions.
///
/// # Examples
///
/// ```
/// use sofa_stats::correlation::average_ranks;
///
/// assert_eq!(average_ranks(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let value = values[order[i]];
        let mut j = i + 1;
        while j < order.len() && values[order[j]].total_cmp(&value).is_eq() {
            j += 1;
        }
        // positions i+1 ..= j
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        i = j;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_sign() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = pearson(&xs, &[1.5, 2.5, 3.5, 4.5]).unwrap();
        let down = pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap();
        assert!((up - 1.0).abs() < 1e-12);
        assert!((down + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[], &[]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(pearson(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_spearman_is_rank_based() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let cubes = xs.map(|x: f64| x.powi(3));
        assert!(pearson(&xs, &cubes).unwrap() < 1.0 - 1e-6);
        assert!((spearman(&xs, &cubes).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_with_ties() {
        // ranks of ys: [1, 2, 3.5, 5, 3.5]; r = 8 / sqrt(10 * 9.5)
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [5.0, 6.0, 7.0, 8.0, 7.0];
        let expected = 8.0 / (10.0_f64 * 9.5).sqrt();
        assert!((spearman(&xs, &ys).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_average_ranks_all_tied() {
        assert_eq!(average_ranks(&[3.0, 3.0, 3.0]), vec![2.0, 2.0, 2.0]);
        assert!(average_ranks(&[]).is_empty());
    }
}
