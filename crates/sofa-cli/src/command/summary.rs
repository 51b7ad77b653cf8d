use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use sofa_analysis::{
    cohort::ScoreColumn,
    summary::{CohortSummary, PairedSummary, ScoreSummary},
};

use crate::{
    data::{InputArg, LoadedCohort, ScoreLabels},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Also save the summary as JSON to this path (`-` prints it instead of the table)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let loaded = arg.input.load()?;
    let summary = CohortSummary::new(&loaded.cohort)
        .with_context(|| format!("No complete rows in {}", arg.input.input.display()))?;
    let labels = arg.input.labels();

    let json_to_stdout = arg.output.as_deref().is_some_and(util::is_stdout_path);
    if !json_to_stdout {
        println!("Cohort Summary ({})", arg.input.input.display());
        println!("==========================================\n");
        print_cohort_summary(&loaded, &summary, &labels);
    }

    if let Some(path) = &arg.output {
        Output::save_json(&summary, util::output_path(path))?;
        if !json_to_stdout {
            tracing::info!(path = %path.display(), "summary saved");
        }
    }
    Ok(())
}

pub(super) fn print_cohort_summary(
    loaded: &LoadedCohort,
    summary: &CohortSummary,
    labels: &ScoreLabels,
) {
    println!(
        "Observations: {} of {} rows ({} dropped for missing values)",
        summary.count, loaded.total_rows, loaded.dropped_rows
    );
    println!(
        "Events:       {} ({:.2}%), non-events: {}",
        summary.positives,
        summary.event_rate * 100.0,
        summary.negatives
    );
    println!();

    let label_width = labels.a.len().max(labels.b.len()).max("Score".len());
    println!(
        "{:<label_width$}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}",
        "Score", "AUC", "Mean", "SD", "Min", "Q1", "Median", "Q3", "Max"
    );
    println!("{}", "-".repeat(label_width + 9 * 8));
    for column in [ScoreColumn::A, ScoreColumn::B] {
        print_score_row(labels.get(column), label_width, summary.score(column));
    }
    println!();
    print_paired_summary(&summary.paired, labels);
}

fn print_paired_summary(paired: &PairedSummary, labels: &ScoreLabels) {
    let coefficient = |r: Option<f64>| r.map_or_else(|| "-".to_owned(), |r| format!("{r:.4}"));
    let diff = &paired.difference;
    println!("Paired Scores ({} - {})", labels.b, labels.a);
    println!(
        "  Pearson r: {}, Spearman rho: {}",
        coefficient(paired.pearson),
        coefficient(paired.spearman)
    );
    println!(
        "  Exact agreement: {:.2}%, mean |difference|: {:.2}",
        paired.exact_agreement * 100.0,
        paired.mean_abs_difference
    );
    println!(
        "  Difference: mean {:+.2}, median {:+.2}, SD {:.2}, max increase {:+.2}, max decrease {:+.2}",
        diff.mean, diff.median, diff.sample_std_dev, diff.max, diff.min
    );
    println!(
        "  {} higher: {}, no change: {}, {} higher: {}",
        labels.b, paired.b_higher, paired.no_change, labels.a, paired.a_higher
    );
}

fn print_score_row(label: &str, label_width: usize, summary: &ScoreSummary) {
    let auc = summary
        .auc
        .map_or_else(|| "-".to_owned(), |auc| format!("{auc:.4}"));
    let quartile = |p| {
        summary
            .quartiles
            .get(p)
            .map_or_else(|| "-".to_owned(), |v| format!("{v:.2}"))
    };
    let stats = &summary.stats;
    println!(
        "{label:<label_width$}  {auc:>7}  {:>7.2}  {:>7.2}  {:>7.2}  {:>7}  {:>7}  {:>7}  {:>7.2}",
        stats.mean,
        stats.sample_std_dev,
        stats.min,
        quartile(25.0),
        quartile(50.0),
        quartile(75.0),
        stats.max,
    );
}
