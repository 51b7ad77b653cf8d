use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use sofa_analysis::{
    bootstrap::{self, BootstrapResult},
    cohort::{Cohort, Observation},
    config::BootstrapConfig,
};

/// Integer-valued scores loosely tied to the outcome, like SOFA totals.
fn synthetic_cohort(n: usize, seed: u64) -> Cohort {
    let mut rng = Pcg64::seed_from_u64(seed);
    let observations = (0..n)
        .map(|_| {
            let outcome = rng.random_bool(0.2);
            let base = if outcome { 7.0 } else { 4.0 };
            let score_a = (base + f64::from(rng.random_range(-4..=4))).max(0.0);
            let score_b = (base + f64::from(rng.random_range(-5..=5))).max(0.0);
            Observation::new(outcome, score_a, score_b)
        })
        .collect();
    Cohort::new(observations).unwrap()
}

fn config(resample_count: usize, seed: u64) -> BootstrapConfig {
    BootstrapConfig {
        resample_count,
        seed: Some(seed),
        ..BootstrapConfig::default()
    }
}

fn assert_same_run(a: &BootstrapResult, b: &BootstrapResult) {
    assert_eq!(a.resample_diffs, b.resample_diffs);
    assert_eq!(a.ci_low, b.ci_low);
    assert_eq!(a.ci_high, b.ci_high);
    assert_eq!(a.p_value, b.p_value);
    assert_eq!(a.degenerate_resamples, b.degenerate_resamples);
}

#[test]
fn same_seed_reproduces_the_run() {
    let cohort = synthetic_cohort(150, 7);
    let first = bootstrap::compare(&cohort, &config(1000, 42)).unwrap();
    let second = bootstrap::compare(&cohort, &config(1000, 42)).unwrap();
    assert_same_run(&first, &second);

    let other = bootstrap::compare(&cohort, &config(1000, 43)).unwrap();
    assert_ne!(first.resample_diffs, other.resample_diffs);
    assert_eq!(first.auc_a, other.auc_a);
    assert_eq!(first.observed_difference, other.observed_difference);
}

#[test]
fn thread_count_does_not_change_the_run() {
    let cohort = synthetic_cohort(80, 11);
    let serial = bootstrap::compare(&cohort, &config(301, 5)).unwrap();
    for threads in [2, 3, 8, 500] {
        let parallel = bootstrap::compare(
            &cohort,
            &BootstrapConfig {
                threads,
                ..config(301, 5)
            },
        )
        .unwrap();
        assert_same_run(&serial, &parallel);
    }
}

#[test]
fn compare_with_matches_config_form() {
    let cohort = synthetic_cohort(60, 3);
    let direct = bootstrap::compare_with(&cohort, 200, 0.9, Some(9)).unwrap();
    let configured = bootstrap::compare(
        &cohort,
        &BootstrapConfig {
            confidence_level: 0.9,
            ..config(200, 9)
        },
    )
    .unwrap();
    assert_same_run(&direct, &configured);
    assert_eq!(direct.confidence_level, 0.9);
}

#[test]
fn result_invariants_hold() {
    let cohort = synthetic_cohort(120, 21);
    let result = bootstrap::compare(&cohort, &config(500, 1)).unwrap();

    assert_eq!(result.resample_count(), 500);
    assert_eq!(result.resample_aucs_a.len(), 500);
    assert_eq!(result.resample_aucs_b.len(), 500);
    assert!(result.ci_low <= result.ci_high);
    assert!((0.0..=1.0).contains(&result.p_value));
    assert!((0.0..=1.0).contains(&result.auc_a));
    assert!((0.0..=1.0).contains(&result.auc_b));
    for ((a, b), diff) in result
        .resample_aucs_a
        .iter()
        .zip(&result.resample_aucs_b)
        .zip(&result.resample_diffs)
    {
        assert!((0.0..=1.0).contains(a));
        assert!((0.0..=1.0).contains(b));
        assert_eq!(*diff, b - a);
    }

    let (low_90, high_90) = result.interval(0.90);
    assert!(result.ci_low <= low_90 && high_90 <= result.ci_high);
    let stats = result.difference_stats().unwrap();
    assert!(stats.min <= stats.mean && stats.mean <= stats.max);
}

#[test]
fn swapping_scores_mirrors_the_result() {
    let cohort = synthetic_cohort(100, 99);
    let forward = bootstrap::compare(&cohort, &config(1000, 42)).unwrap();
    let backward = bootstrap::compare(&cohort.swapped(), &config(1000, 42)).unwrap();

    assert_ne!(forward.observed_difference, 0.0);
    assert_eq!(forward.auc_a, backward.auc_b);
    assert_eq!(forward.auc_b, backward.auc_a);
    assert_eq!(forward.observed_difference, -backward.observed_difference);
    assert!((forward.p_value - backward.p_value).abs() < 1e-12);
    assert!((forward.ci_low + backward.ci_high).abs() < 1e-12);
    assert!((forward.ci_high + backward.ci_low).abs() < 1e-12);
}

#[test]
fn swapping_scores_with_equal_aucs_keeps_the_p_value() {
    // Both scores rank positives {2, 4, 6, 8} against negatives {1, 3, 5, 7},
    // but assign the values to different rows.
    let rows = [
        (false, 1.0, 3.0),
        (false, 3.0, 1.0),
        (true, 2.0, 4.0),
        (true, 4.0, 2.0),
        (false, 5.0, 7.0),
        (false, 7.0, 5.0),
        (true, 6.0, 8.0),
        (true, 8.0, 6.0),
    ];
    let observations = rows
        .iter()
        .map(|&(outcome, a, b)| Observation::new(outcome, a, b))
        .collect();
    let cohort = Cohort::new(observations).unwrap();

    for seed in [42, 7, 1234] {
        let forward = bootstrap::compare(&cohort, &config(500, seed)).unwrap();
        let backward = bootstrap::compare(&cohort.swapped(), &config(500, seed)).unwrap();

        assert_eq!(forward.observed_difference, 0.0);
        assert_eq!(backward.observed_difference, 0.0);
        assert!(forward.resample_diffs.iter().any(|d| *d != 0.0));
        assert_eq!(forward.p_value, backward.p_value);
        assert_eq!(forward.one_sided_p, backward.one_sided_p);
        assert!(forward.one_sided_p <= 0.5);
    }
}

#[test]
fn perfect_score_against_uninformative_score() {
    let observations = (1..=10)
        .map(|i| Observation::new(i > 5, f64::from(i), 0.0))
        .collect();
    let cohort = Cohort::new(observations).unwrap();
    let result = bootstrap::compare(&cohort, &config(1000, 42)).unwrap();

    assert_eq!(result.auc_a, 1.0);
    assert_eq!(result.auc_b, 0.5);
    assert_eq!(result.observed_difference, -0.5);
    assert!(result.p_value < 0.05);
    assert_eq!((result.ci_low, result.ci_high), (-0.5, -0.5));
}

#[test]
fn identical_scores_show_no_difference() {
    let cohort = synthetic_cohort(60, 5);
    let observations = cohort
        .observations()
        .iter()
        .map(|obs| Observation::new(obs.outcome, obs.score_a, obs.score_a))
        .collect();
    let cohort = Cohort::new(observations).unwrap();

    for seed in 0..5 {
        let result = bootstrap::compare(&cohort, &config(500, seed)).unwrap();
        assert_eq!(result.observed_difference, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.is_significant(0.05));
    }
}

#[test]
fn imbalanced_small_cohort_redraws_degenerate_resamples() {
    let cohort = Cohort::new(vec![
        Observation::new(true, 3.0, 1.0),
        Observation::new(true, 2.0, 2.0),
        Observation::new(true, 4.0, 0.0),
        Observation::new(false, 1.0, 3.0),
    ])
    .unwrap();
    let result = bootstrap::compare(&cohort, &config(1000, 42)).unwrap();

    assert_eq!(result.resample_diffs.len(), 1000);
    assert!(result.degenerate_resamples > 0);
    assert!(result.ci_low <= result.ci_high);
}

#[test]
fn result_survives_json_round_trip() {
    let cohort = synthetic_cohort(40, 8);
    let result = bootstrap::compare(&cohort, &config(50, 8)).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let restored: BootstrapResult = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.seed, 8);
    assert_eq!(restored.resample_diffs, result.resample_diffs);
}
