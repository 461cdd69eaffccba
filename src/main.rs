//! Surveillance overview table main executable

pub mod common;
pub mod err;
pub mod report;
pub mod variants;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Genomic surveillance overview tables",
    long_about = "This tool summarizes per-sample pipeline outputs and protein alterations"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Variant-related commands.
    Variants(Variants),
    /// Report-related commands.
    Report(Report),
}

/// Parsing of "variants *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Variants {
    /// The sub command to run
    #[command(subcommand)]
    command: VariantsCommands,
}

/// Enum supporting the parsing of "variants *" sub commands.
#[derive(Debug, Subcommand)]
enum VariantsCommands {
    Summarize(variants::Args),
}

/// Parsing of "report *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Report {
    /// The sub command to run
    #[command(subcommand)]
    command: ReportCommands,
}

/// Enum supporting the parsing of "report *" sub commands.
#[derive(Debug, Subcommand)]
enum ReportCommands {
    Overview(report::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Variants(variants) => match &variants.command {
                VariantsCommands::Summarize(args) => {
                    variants::run(&cli.common, args)?;
                }
            },
            Commands::Report(report) => match &report.command {
                ReportCommands::Overview(args) => {
                    report::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        super::Cli::command().debug_assert();
    }
}
