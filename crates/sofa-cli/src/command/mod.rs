use clap::{Parser, Subcommand};

use self::{compare::CompareArg, summary::SummaryArg};

mod compare;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare the AUCs of two scores with a bootstrap test
    Compare(#[clap(flatten)] CompareArg),
    /// Summarize the cohort and both scores without resampling
    Summary(#[clap(flatten)] SummaryArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::Summary(arg) => summary::run(&arg)?,
    }
    Ok(())
}
