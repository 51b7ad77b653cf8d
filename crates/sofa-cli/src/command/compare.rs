//! Bootstrap AUC comparison command
//!
//! Loads a cohort, resamples it to estimate the distribution of the AUC
//! difference between the two scores, and reports the percentile interval,
//! p-value and verdict.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::Args;
use serde::{Deserialize, Serialize};
use sofa_analysis::{
    bootstrap::{self, BootstrapResult, Verdict},
    config::BootstrapConfig,
    summary::CohortSummary,
};

use crate::{
    command::summary,
    data::{InputArg, ScoreLabels},
    schema::report::{CompareReport, ComparisonReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Bootstrap configuration JSON file; the flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of valid bootstrap resamples [default: 2000]
    #[arg(long)]
    pub resamples: Option<usize>,

    /// Confidence level of the reported interval [default: 0.95]
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Additional confidence levels to report (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = [0.90])]
    pub extra_levels: Vec<f64>,

    /// Random seed (drawn at random and reported if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Significance level of the verdict
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Number of worker threads [default: 1]
    #[arg(long)]
    pub threads: Option<usize>,

    /// Consecutive single-class draws tolerated per resample [default: 100]
    #[arg(long)]
    pub max_consecutive_failures: Option<usize>,

    /// Abort resampling after this many seconds
    #[arg(long)]
    pub time_limit_secs: Option<f64>,

    /// Save the full report as JSON to this path (`-` prints it instead of the text report)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Save the per-resample AUCs and differences as CSV to this path
    #[arg(long)]
    pub resamples_csv: Option<PathBuf>,
}

impl CompareArg {
    fn bootstrap_config(&self) -> anyhow::Result<BootstrapConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => BootstrapConfig::default(),
        };
        if let Some(resamples) = self.resamples {
            config.resample_count = resamples;
        }
        if let Some(confidence) = self.confidence {
            config.confidence_level = confidence;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(failures) = self.max_consecutive_failures {
            config.max_consecutive_failures = failures;
        }
        if let Some(secs) = self.time_limit_secs {
            config.time_limit = Some(
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("Invalid time limit: {secs} seconds"))?,
            );
        }
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            bail!("alpha must lie strictly between 0 and 1 (got {})", self.alpha);
        }
        if let Some(level) = self
            .extra_levels
            .iter()
            .find(|level| !(**level > 0.0 && **level < 1.0))
        {
            bail!("confidence levels must lie strictly between 0 and 1 (got {level})");
        }
        Ok(())
    }
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    arg.validate()?;
    let config = arg.bootstrap_config()?;
    let labels = arg.input.labels();
    let loaded = arg.input.load()?;
    let cohort_summary = CohortSummary::new(&loaded.cohort)
        .with_context(|| format!("No complete rows in {}", arg.input.input.display()))?;

    let result = bootstrap::compare(&loaded.cohort, &config)
        .with_context(|| format!("Failed to compare {} with {}", labels.b, labels.a))?;

    let comparison = ComparisonReport::new(&result, &arg.extra_levels);
    let json_to_stdout = arg.output.as_deref().is_some_and(util::is_stdout_path);
    if !json_to_stdout {
        println!(
            "{} vs {} AUC Comparison (bootstrap, {} resamples, seed={})",
            labels.a,
            labels.b,
            result.resample_count(),
            result.seed
        );
        println!("==========================================\n");
        summary::print_cohort_summary(&loaded, &cohort_summary, &labels);
        println!();
        print_comparison(&labels, &comparison);
        println!();
        print_conclusion(&labels, &result, arg.alpha);
    }

    if let Some(path) = &arg.resamples_csv {
        save_resamples_csv(path, &result)?;
        tracing::info!(path = %path.display(), "resamples saved");
    }

    if let Some(path) = &arg.output {
        let report = CompareReport {
            generated_at: Utc::now(),
            input: arg.input.input.display().to_string(),
            labels,
            total_rows: loaded.total_rows,
            dropped_rows: loaded.dropped_rows,
            config,
            alpha: arg.alpha,
            cohort: cohort_summary,
            verdict: result.verdict(arg.alpha),
            comparison,
        };
        Output::save_json(&report, util::output_path(path))?;
        if !json_to_stdout {
            tracing::info!(path = %path.display(), "report saved");
        }
    }

    Ok(())
}

fn print_comparison(labels: &ScoreLabels, comparison: &ComparisonReport) {
    println!("Bootstrap Results");
    println!("-----------------");
    println!(
        "Valid resamples: {} ({} single-class draws redrawn)",
        comparison.resample_count, comparison.degenerate_resamples
    );
    for (label, score) in [(&labels.a, &comparison.auc_a), (&labels.b, &comparison.auc_b)] {
        println!(
            "AUC {label}: {:.4} ({:.0}% CI {:.4} to {:.4})",
            score.auc,
            score.interval.confidence_level * 100.0,
            score.interval.low,
            score.interval.high
        );
    }
    println!();

    println!(
        "Difference ({} - {}): {:+.4}",
        labels.b, labels.a, comparison.observed_difference
    );
    if let Some(stats) = &comparison.difference_stats {
        println!(
            "  Resampled: mean {:+.4}, SD {:.4}, range {:+.4} to {:+.4}",
            stats.mean, stats.sample_std_dev, stats.min, stats.max
        );
    }
    for interval in &comparison.intervals {
        println!(
            "  {:.0}% CI: [{:+.4}, {:+.4}]",
            interval.confidence_level * 100.0,
            interval.low,
            interval.high
        );
    }
    println!("  One-sided p: {:.4}", comparison.one_sided_p);
    println!("  Two-sided p: {:.4}", comparison.p_value);
}

fn print_conclusion(labels: &ScoreLabels, result: &BootstrapResult, alpha: f64) {
    let verdict = match result.verdict(alpha) {
        Verdict::ScoreBBetter => format!(
            "{} discriminates significantly better than {}",
            labels.b, labels.a
        ),
        Verdict::ScoreBWorse => format!(
            "{} discriminates significantly worse than {}",
            labels.b, labels.a
        ),
        Verdict::NotSignificant => format!(
            "no significant difference between {} and {}",
            labels.a, labels.b
        ),
    };
    println!(
        "Conclusion (alpha = {alpha}): {verdict} (p = {:.4})",
        result.p_value
    );
}

/// One line of the resamples CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ResampleRow {
    resample: usize,
    auc_a: f64,
    auc_b: f64,
    difference: f64,
}

fn save_resamples_csv(path: &Path, result: &BootstrapResult) -> anyhow::Result<()> {
    let output = Output::open(path.to_path_buf())?;
    let display_path = output.display_path();
    write_resamples_csv(output, result)
        .with_context(|| format!("Failed to write resamples to {display_path}"))
}

fn write_resamples_csv<W>(writer: W, result: &BootstrapResult) -> anyhow::Result<()>
where
    W: io::Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    for (resample, ((&auc_a, &auc_b), &difference)) in result
        .resample_aucs_a
        .iter()
        .zip(&result.resample_aucs_b)
        .zip(&result.resample_diffs)
        .enumerate()
    {
        writer.serialize(ResampleRow {
            resample,
            auc_a,
            auc_b,
            difference,
        })?;
    }
    writer.flush()?;
    Ok(())
}
