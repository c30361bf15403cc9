use clap::{Parser, Subcommand};

use self::{generate::GenerateArg, score::ScoreArg};

mod generate;
mod score;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score predicted survival curves with the log-loss (optionally ERV)
    Score(#[clap(flatten)] ScoreArg),
    /// Generate a synthetic dataset of predictions and observed outcomes
    Generate(#[clap(flatten)] GenerateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Score(arg) => score::run(&arg)?,
        Mode::Generate(arg) => generate::run(&arg)?,
    }
    Ok(())
}
