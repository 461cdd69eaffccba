//! Summarization of protein alterations from annotated variant calls.
//!
//! The HGVS.p annotations of one sample are classified into FLiRT, mutations of
//! interest and other alterations, deduplicated by label, and rendered into one
//! string per tier.

pub mod ann;
pub mod hgvsp;
pub mod reader;
pub mod tiers;

use std::io::Write;

use crate::common::open_write_maybe_gz;

/// Command line arguments for `variants summarize` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Summarize protein alterations of one sample", long_about = None)]
pub struct Args {
    /// Path to the annotated VCF or BCF file.
    #[arg(long)]
    pub path_input: String,
    /// Path to the TOML file with FLiRT and mutations of interest.
    #[arg(long)]
    pub path_reference_sets: String,
    /// Path to the output JSON file, `.gz` for compressed output.
    #[arg(long)]
    pub path_output: String,
}

/// Main entry point for `variants summarize` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let reference_sets = tiers::ReferenceSets::load(&args.path_reference_sets)?;
    let summary = reader::summarize_path(&args.path_input, &reference_sets)
        .map_err(|e| anyhow::anyhow!("summarizing {} failed: {}", &args.path_input, e))?;

    let mut writer = open_write_maybe_gz(&args.path_output)?;
    serde_json::to_writer_pretty(&mut writer, &summary)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "All of `variants summarize` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
