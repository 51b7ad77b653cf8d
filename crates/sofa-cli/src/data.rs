//! Loading cohorts from tabular files
//!
//! The comparison input is a flat table with one row per case: a binary
//! outcome column and two numeric score columns. Tables can be JSON (an array
//! of row objects) or CSV (a header row followed by comma-separated values).
//! Rows with a missing value in any of the three columns are dropped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use serde_json::Value;
use sofa_analysis::cohort::{Cohort, Observation, ScoreColumn};

/// File format of an input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, derive_more::Display)]
pub enum TableFormat {
    #[display("JSON")]
    Json,
    #[display("CSV")]
    Csv,
}

impl TableFormat {
    /// Guesses the format from the file extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(TableFormat::Json),
            Some("csv") => Ok(TableFormat::Csv),
            _ => bail!(
                "cannot infer table format of {}; pass --format",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InputArg {
    /// Path to the input table (JSON array of rows or CSV with a header row)
    pub input: PathBuf,

    /// Input format (inferred from the file extension by default)
    #[arg(long, value_enum)]
    pub format: Option<TableFormat>,

    /// Column holding the binary outcome (0/1 or true/false)
    #[arg(long, default_value = "icu_mortality")]
    pub outcome_column: String,

    /// Column holding score a (the reference score)
    #[arg(long, default_value = "sofa_score")]
    pub score_a_column: String,

    /// Column holding score b (the candidate score)
    #[arg(long, default_value = "sofa2_score")]
    pub score_b_column: String,

    /// Display name of score a
    #[arg(long, default_value = "SOFA-1")]
    pub label_a: String,

    /// Display name of score b
    #[arg(long, default_value = "SOFA-2")]
    pub label_b: String,
}

impl InputArg {
    pub fn columns(&self) -> ColumnMapping {
        ColumnMapping {
            outcome: self.outcome_column.clone(),
            score_a: self.score_a_column.clone(),
            score_b: self.score_b_column.clone(),
        }
    }

    pub fn labels(&self) -> ScoreLabels {
        ScoreLabels {
            a: self.label_a.clone(),
            b: self.label_b.clone(),
        }
    }

    pub fn format(&self) -> anyhow::Result<TableFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => TableFormat::from_path(&self.input),
        }
    }

    pub fn load(&self) -> anyhow::Result<LoadedCohort> {
        load_cohort(&self.input, self.format()?, &self.columns())
    }
}

/// Names of the columns a cohort is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub outcome: String,
    pub score_a: String,
    pub score_b: String,
}

/// Display names of the two scores.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreLabels {
    pub a: String,
    pub b: String,
}

impl ScoreLabels {
    pub fn get(&self, column: ScoreColumn) -> &str {
        match column {
            ScoreColumn::A => &self.a,
            ScoreColumn::B => &self.b,
        }
    }
}

#[derive(Debug)]
pub struct LoadedCohort {
    pub cohort: Cohort,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

/// A single table cell as read from the input.
#[derive(Debug, Clone, Copy)]
enum Cell<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    Bool(bool),
}

impl<'a> Cell<'a> {
    fn from_text(text: &'a str) -> Self {
        let text = text.trim();
        if is_missing_marker(text) {
            Cell::Missing
        } else {
            Cell::Text(text)
        }
    }

    fn from_json(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Missing,
            Some(Value::Bool(b)) => Cell::Bool(*b),
            Some(Value::Number(n)) => n.as_f64().map_or(Cell::Missing, Cell::Number),
            Some(Value::String(s)) => Cell::from_text(s),
            Some(Value::Array(_) | Value::Object(_)) => Cell::Text("<nested value>"),
        }
    }
}

fn is_missing_marker(text: &str) -> bool {
    text.is_empty()
        || ["na", "nan", "null", "none"]
            .iter()
            .any(|marker| text.eq_ignore_ascii_case(marker))
}

/// Parses an outcome cell; `Ok(None)` means the value is missing.
fn parse_outcome(cell: Cell<'_>) -> Result<Option<bool>, String> {
    match cell {
        Cell::Missing => Ok(None),
        Cell::Bool(b) => Ok(Some(b)),
        Cell::Number(n) if n == 0.0 => Ok(Some(false)),
        Cell::Number(n) if n == 1.0 => Ok(Some(true)),
        Cell::Number(n) if n.is_nan() => Ok(None),
        Cell::Number(n) => Err(format!("outcome must be 0 or 1, got {n}")),
        Cell::Text(text) => {
            if text.eq_ignore_ascii_case("true") {
                return Ok(Some(true));
            }
            if text.eq_ignore_ascii_case("false") {
                return Ok(Some(false));
            }
            match text.parse::<f64>() {
                Ok(n) => parse_outcome(Cell::Number(n)),
                Err(_) => Err(format!("outcome must be 0/1 or true/false, got {text:?}")),
            }
        }
    }
}

/// Parses a score cell; `Ok(None)` means the value is missing.
fn parse_score(cell: Cell<'_>) -> Result<Option<f64>, String> {
    match cell {
        Cell::Missing => Ok(None),
        Cell::Number(n) if n.is_nan() => Ok(None),
        Cell::Number(n) => Ok(Some(n)),
        Cell::Bool(b) => Err(format!("score must be numeric, got {b}")),
        Cell::Text(text) => match text.parse::<f64>() {
            Ok(n) if n.is_nan() => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(format!("score must be numeric, got {text:?}")),
        },
    }
}

/// Builds an observation from the three cells of a row.
///
/// Returns `Ok(None)` if any of the cells is missing.
fn parse_row(
    outcome: Cell<'_>,
    score_a: Cell<'_>,
    score_b: Cell<'_>,
    columns: &ColumnMapping,
) -> Result<Option<Observation>, String> {
    let outcome = parse_outcome(outcome).map_err(|e| format!("{}: {e}", columns.outcome))?;
    let score_a = parse_score(score_a).map_err(|e| format!("{}: {e}", columns.score_a))?;
    let score_b = parse_score(score_b).map_err(|e| format!("{}: {e}", columns.score_b))?;
    Ok(match (outcome, score_a, score_b) {
        (Some(outcome), Some(score_a), Some(score_b)) => {
            Some(Observation::new(outcome, score_a, score_b))
        }
        _ => None,
    })
}

/// Reads a cohort table from `path`.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, a required column is
/// absent, a value cannot be interpreted, or a score is infinite.
pub fn load_cohort(
    path: &Path,
    format: TableFormat,
    columns: &ColumnMapping,
) -> anyhow::Result<LoadedCohort> {
    tracing::info!(path = %path.display(), %format, "loading cohort");
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let (observations, total_rows) = match format {
        TableFormat::Json => parse_json_table(&content, columns),
        TableFormat::Csv => parse_csv_table(&content, columns),
    }
    .with_context(|| format!("Failed to parse {format} table: {}", path.display()))?;

    let dropped_rows = total_rows - observations.len();
    if dropped_rows > 0 {
        tracing::warn!(
            dropped_rows,
            total_rows,
            "dropped rows with missing outcome or score values"
        );
    }
    let cohort = Cohort::new(observations)
        .with_context(|| format!("Invalid cohort in {}", path.display()))?;
    tracing::info!(
        observations = cohort.len(),
        positives = cohort.positives(),
        "cohort loaded"
    );

    Ok(LoadedCohort {
        cohort,
        total_rows,
        dropped_rows,
    })
}

fn parse_json_table(
    content: &str,
    columns: &ColumnMapping,
) -> anyhow::Result<(Vec<Observation>, usize)> {
    let rows: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(content).context("expected a JSON array of row objects")?;

    if let Some(first) = rows.first() {
        for name in [&columns.outcome, &columns.score_a, &columns.score_b] {
            if !first.contains_key(name) {
                bail!("column {name:?} not found in the first row");
            }
        }
    }

    let mut observations = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obs = parse_row(
            Cell::from_json(row.get(&columns.outcome)),
            Cell::from_json(row.get(&columns.score_a)),
            Cell::from_json(row.get(&columns.score_b)),
            columns,
        )
        .map_err(|e| anyhow::anyhow!("row {}: {e}", i + 1))?;
        observations.extend(obs);
    }
    Ok((observations, rows.len()))
}

fn parse_csv_table(
    content: &str,
    columns: &ColumnMapping,
) -> anyhow::Result<(Vec<Observation>, usize)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader.headers().context("failed to read CSV header")?.clone();
    let position = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("column {name:?} not found in header"))
    };
    let outcome_idx = position(&columns.outcome)?;
    let score_a_idx = position(&columns.score_a)?;
    let score_b_idx = position(&columns.score_b)?;

    let mut observations = vec![];
    let mut total_rows = 0;
    for record in reader.records() {
        let record = record.context("malformed CSV record")?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        total_rows += 1;
        let line = record.position().map_or(0, csv::Position::line);
        let cell = |idx: usize| record.get(idx).map_or(Cell::Missing, Cell::from_text);
        let obs = parse_row(cell(outcome_idx), cell(score_a_idx), cell(score_b_idx), columns)
            .map_err(|e| anyhow::anyhow!("line {line}: {e}"))?;
        observations.extend(obs);
    }
    Ok((observations, total_rows))
}
