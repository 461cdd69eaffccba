//! Implementation of the `report overview` subcommand.
//!
//! Joins the per-sample outputs of the pipeline (classification, read counts,
//! assemblies, lineages, and variant calls) into one CSV table.

pub mod assembly;
pub mod contigs;
pub mod kraken;
pub mod pangolin;
pub mod reads;
pub mod table;

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    common::{self, open_write_maybe_gz},
    err::ArgError,
    variants::{reader::summarize_path, tiers::ReferenceSets},
};

/// The kind of report to generate.
#[derive(
    clap::ValueEnum, Clone, Copy, Debug, Default, strum::Display, PartialEq, Eq, Hash,
)]
pub enum Mode {
    /// Patient samples, with assembly and lineage columns.
    #[default]
    #[strum(serialize = "patient")]
    Patient,
    /// Environmental samples, e.g., wastewater.
    #[strum(serialize = "environment")]
    Environment,
}

/// Command line arguments for `report overview` subcommand.
///
/// All per-sample lists are given in the order of `--samples`.  Each list entry
/// may be given as `@path` to read entries from the file at `path`.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Build per-sample overview table", long_about = None)]
pub struct Args {
    /// Report mode.
    #[arg(long, value_enum, default_value_t = Mode::Patient)]
    pub mode: Mode,
    /// Sample names.
    #[arg(long, required = true, num_args = 1..)]
    pub samples: Vec<String>,
    /// Kraken reports.
    #[arg(long, required = true, num_args = 1..)]
    pub path_kraken: Vec<String>,
    /// Raw read counts, fastp JSON or `fastq-read-counts` text files.
    #[arg(long, required = true, num_args = 1..)]
    pub path_reads_raw: Vec<String>,
    /// Trimmed read counts, fastp JSON or `fastq-read-counts` text files.
    #[arg(long, required = true, num_args = 1..)]
    pub path_reads_trimmed: Vec<String>,
    /// Text files with the number of reads used for assembly.
    #[arg(long, required = true, num_args = 1..)]
    pub path_reads_used_for_assembly: Vec<String>,
    /// Annotated variant calls (VCF or BCF).
    #[arg(long, required = true, num_args = 1..)]
    pub path_variants: Vec<String>,
    /// TOML file with FLiRT and mutations of interest.
    #[arg(long)]
    pub path_reference_sets: String,

    /// Initial contigs (patient mode).
    #[arg(long, num_args = 1..)]
    pub path_initial_contigs: Vec<String>,
    /// Polished de novo contigs (patient mode).
    #[arg(long, num_args = 1..)]
    pub path_polished_contigs: Vec<String>,
    /// Pseudo assemblies (patient mode).
    #[arg(long, num_args = 1..)]
    pub path_pseudo_contigs: Vec<String>,
    /// Consensus sequences (patient mode).
    #[arg(long, num_args = 1..)]
    pub path_consensus_contigs: Vec<String>,
    /// Pangolin lineage reports (patient mode).
    #[arg(long, num_args = 1..)]
    pub path_pangolin: Vec<String>,
    /// Assembly choices as `<sample>,<pseudo|normal|consensus|not-accepted>` (patient mode).
    #[arg(long, num_args = 1..)]
    pub assembly_used: Vec<String>,
    /// Path standing in for assemblies that could not be built.
    #[arg(long, default_value = contigs::DEFAULT_PLACEHOLDER)]
    pub placeholder_assembly: String,

    /// Set the number of threads to use, defaults to number of cores.
    #[arg(long)]
    pub num_threads: Option<usize>,
    /// Path to the output CSV file, `.gz` for compressed output.
    #[arg(long)]
    pub path_output: String,
}

/// Paths to the inputs of one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SampleInputs {
    sample: String,
    kraken: String,
    reads_raw: String,
    reads_trimmed: String,
    reads_used_for_assembly: String,
    variants: String,
    patient: Option<PatientInputs>,
}

/// Paths to the patient-only inputs of one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PatientInputs {
    initial_contigs: String,
    polished_contigs: String,
    pseudo_contigs: String,
    consensus_contigs: String,
    pangolin: String,
    assembly_used: Option<assembly::AssemblyChoice>,
}

/// Expand `@path` entries and check that there is one entry per sample.
fn per_sample(
    name: &'static str,
    paths: &[String],
    num_samples: usize,
) -> Result<Vec<String>, anyhow::Error> {
    let paths = common::expand_path_args(paths)?;
    if paths.len() != num_samples {
        return Err(ArgError::SampleCountMismatch {
            name,
            expected: num_samples,
            found: paths.len(),
        }
        .into());
    }
    Ok(paths)
}

/// Like `per_sample` but for inputs that are only required in patient mode.
fn per_patient_sample(
    name: &'static str,
    paths: &[String],
    num_samples: usize,
) -> Result<Vec<String>, anyhow::Error> {
    if paths.is_empty() {
        return Err(ArgError::MissingPatientInput(name).into());
    }
    per_sample(name, paths, num_samples)
}

/// Collect the inputs of each sample from `args`.
fn collect_inputs(args: &Args) -> Result<Vec<SampleInputs>, anyhow::Error> {
    let samples = common::expand_path_args(&args.samples)?;
    let n = samples.len();

    let kraken = per_sample("--path-kraken", &args.path_kraken, n)?;
    let reads_raw = per_sample("--path-reads-raw", &args.path_reads_raw, n)?;
    let reads_trimmed = per_sample("--path-reads-trimmed", &args.path_reads_trimmed, n)?;
    let reads_used_for_assembly = per_sample(
        "--path-reads-used-for-assembly",
        &args.path_reads_used_for_assembly,
        n,
    )?;
    let variants = per_sample("--path-variants", &args.path_variants, n)?;

    let patient = if args.mode == Mode::Patient {
        let initial = per_patient_sample("--path-initial-contigs", &args.path_initial_contigs, n)?;
        let polished =
            per_patient_sample("--path-polished-contigs", &args.path_polished_contigs, n)?;
        let pseudo = per_patient_sample("--path-pseudo-contigs", &args.path_pseudo_contigs, n)?;
        let consensus =
            per_patient_sample("--path-consensus-contigs", &args.path_consensus_contigs, n)?;
        let pangolin = per_patient_sample("--path-pangolin", &args.path_pangolin, n)?;

        let mut assembly_used = HashMap::new();
        for entry in common::expand_path_args(&args.assembly_used)? {
            let (sample, choice) = assembly::parse_entry(&entry)?;
            if !samples.contains(&sample) {
                tracing::warn!("ignoring assembly choice for unknown sample {:?}", &sample);
            }
            assembly_used.insert(sample, choice);
        }

        itertools::izip!(
            initial.into_iter(),
            polished.into_iter(),
            pseudo.into_iter(),
            consensus.into_iter(),
            pangolin.into_iter(),
            samples.iter()
        )
        .map(
            |(initial_contigs, polished_contigs, pseudo_contigs, consensus_contigs, pangolin, sample)| {
                Some(PatientInputs {
                    initial_contigs,
                    polished_contigs,
                    pseudo_contigs,
                    consensus_contigs,
                    pangolin,
                    assembly_used: assembly_used.get(sample).copied(),
                })
            },
        )
        .collect::<Vec<_>>()
    } else {
        vec![None; n]
    };

    Ok(itertools::izip!(
        samples.into_iter(),
        kraken.into_iter(),
        reads_raw.into_iter(),
        reads_trimmed.into_iter(),
        reads_used_for_assembly.into_iter(),
        variants.into_iter(),
        patient.into_iter()
    )
    .map(
        |(sample, kraken, reads_raw, reads_trimmed, reads_used_for_assembly, variants, patient)| {
            SampleInputs {
                sample,
                kraken,
                reads_raw,
                reads_trimmed,
                reads_used_for_assembly,
                variants,
                patient,
            }
        },
    )
    .collect())
}

/// Build the table row for one sample.
fn build_row(
    inputs: &SampleInputs,
    reference_sets: &ReferenceSets,
    placeholder_assembly: &str,
) -> Result<table::Row, anyhow::Error> {
    tracing::debug!("building row for sample {}", &inputs.sample);

    let patient = match &inputs.patient {
        Some(patient) => Some(table::PatientColumns {
            largest_contig: contigs::largest_contig(
                &patient.initial_contigs,
                placeholder_assembly,
            )?,
            de_novo: contigs::largest_contig(&patient.polished_contigs, placeholder_assembly)?,
            pseudo: contigs::largest_contig(&patient.pseudo_contigs, placeholder_assembly)?,
            consensus: contigs::largest_contig(&patient.consensus_contigs, placeholder_assembly)?,
            best_quality: patient.assembly_used,
            lineage: pangolin::load(&patient.pangolin)?,
        }),
        None => None,
    };

    Ok(table::Row {
        sample: inputs.sample.clone(),
        species: kraken::load(&inputs.kraken)?,
        reads_raw: reads::load(&inputs.reads_raw, reads::Stage::Raw)?,
        reads_trimmed: reads::load(&inputs.reads_trimmed, reads::Stage::Trimmed)?,
        reads_filtered: reads::load_plain(&inputs.reads_used_for_assembly)?,
        patient,
        variants: summarize_path(&inputs.variants, reference_sets)?,
    })
}

/// Main entry point for `report overview` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("surveillance-overview {}", common::VERSION);
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("building global Rayon thread pool failed: {}", e))?;
    }

    let reference_sets = ReferenceSets::load(&args.path_reference_sets)?;
    let inputs = collect_inputs(args)?;

    tracing::info!("Processing {} samples ...", inputs.len());
    let before_rows = std::time::Instant::now();
    let rows = inputs
        .par_iter()
        .map(|inputs| {
            build_row(inputs, &reference_sets, &args.placeholder_assembly).map_err(|e| {
                anyhow::anyhow!("processing sample {} failed: {}", &inputs.sample, e)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!("... done processing samples in {:?}", before_rows.elapsed());

    let writer = open_write_maybe_gz(&args.path_output)
        .map_err(|e| anyhow::anyhow!("Cannot open {:?} for writing: {:?}", &args.path_output, e))?;
    table::write_csv(rows, args.mode, writer)?;

    tracing::info!(
        "All of `report overview` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Args, Mode};

    fn args(mode: Mode, path_output: &str) -> Args {
        let s = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        Args {
            mode,
            samples: s(&["sample-b", "sample-a"]),
            path_kraken: s(&[
                "tests/report/sample-b.kraken2.report.tsv",
                "tests/report/sample-a.kraken2.report.tsv",
            ]),
            path_reads_raw: s(&[
                "tests/report/sample-b.fastq-read-counts.txt",
                "tests/report/sample-a.fastp.json",
            ]),
            path_reads_trimmed: s(&[
                "tests/report/sample-b.trimmed.fastq-read-counts.txt",
                "tests/report/sample-a.fastp.json",
            ]),
            path_reads_used_for_assembly: s(&[
                "tests/report/sample-b.filtered-reads.txt",
                "tests/report/sample-a.filtered-reads.txt",
            ]),
            path_variants: s(&["tests/variants/sample-b.vcf", "tests/variants/sample-a.vcf"]),
            path_reference_sets: "tests/variants/reference-sets.toml".into(),
            path_initial_contigs: s(&[
                "resources/genomes/main.fasta",
                "tests/report/sample-a.contigs.fasta",
            ]),
            path_polished_contigs: s(&[
                "resources/genomes/main.fasta",
                "tests/report/sample-a.contigs.fasta",
            ]),
            path_pseudo_contigs: s(&[
                "resources/genomes/main.fasta",
                "resources/genomes/main.fasta",
            ]),
            path_consensus_contigs: s(&[
                "resources/genomes/main.fasta",
                "tests/report/sample-a.consensus.fasta",
            ]),
            path_pangolin: s(&["tests/report/pangolin-none.csv", "tests/report/pangolin-a.csv"]),
            assembly_used: s(&["sample-a,normal", "sample-b,not-accepted"]),
            placeholder_assembly: "resources/genomes/main.fasta".into(),
            num_threads: None,
            path_output: path_output.into(),
        }
    }

    #[test]
    fn run_patient() -> Result<(), anyhow::Error> {
        let tmpdir = temp_testdir::TempDir::default();
        let path_output = tmpdir.join("overview.csv");
        let args = args(Mode::Patient, path_output.to_str().expect("invalid path"));

        super::run(&crate::common::Args::default(), &args)?;

        insta::assert_snapshot!(std::fs::read_to_string(&path_output)?, @r###"
        Sample,Eukaryota (%),Bacteria (%),Viruses (%),thereof SARS (%),Unclassified (%),Raw Reads (#),Trimmed Reads (#),Filtered Reads (#),Largest Contig (bp),De Novo Sequence (bp),Consensus Sequence (bp),Best Quality,Pango Lineage,WHO Label,FLiRT Mutations,VOC Mutations,Other Mutations
        sample-a,0.5,2.3,95.1,94.9,1.9,"2,000,000","1,874,310","1,800,000",30,30,40,De Novo,XBB.1.5,Omicron (XBB.1.5-like),S:F456L:0.875,S:D614G:1.000,ORF1ab:P314L:0.600 ORF1ab:T265I:0.250
        sample-b,0.0,0.0,100.0,100.0,0.0,"1,234","1,100",980,0,0,0,not accepted by QA,no strain called,-,S:R346T:0.333,,
        "###);

        Ok(())
    }

    #[test]
    fn run_environment() -> Result<(), anyhow::Error> {
        let tmpdir = temp_testdir::TempDir::default();
        let path_output = tmpdir.join("overview.csv");
        let mut args = args(Mode::Environment, path_output.to_str().expect("invalid path"));
        // patient-only inputs are not needed
        args.path_pangolin.clear();
        args.assembly_used.clear();

        super::run(&crate::common::Args::default(), &args)?;

        let contents = std::fs::read_to_string(&path_output)?;
        assert!(!contents.contains("Pango Lineage"));
        assert_eq!(contents.lines().count(), 3);

        Ok(())
    }

    #[test]
    fn collect_inputs_count_mismatch() {
        let mut args = args(Mode::Environment, "unused.csv");
        args.path_kraken.pop();

        let err = super::collect_inputs(&args).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Expected 2 entries for --path-kraken (one per sample) but got 1"
        );
    }

    #[test]
    fn collect_inputs_missing_patient_input() {
        let mut args = args(Mode::Patient, "unused.csv");
        args.path_pangolin.clear();

        let err = super::collect_inputs(&args).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing --path-pangolin, required for patient reports"
        );
    }

    #[test]
    fn collect_inputs_assembly_choices() -> Result<(), anyhow::Error> {
        let inputs = super::collect_inputs(&args(Mode::Patient, "unused.csv"))?;

        assert_eq!(
            inputs
                .iter()
                .map(|inputs| inputs
                    .patient
                    .as_ref()
                    .and_then(|patient| patient.assembly_used))
                .collect::<Vec<_>>(),
            vec![
                Some(super::assembly::AssemblyChoice::NotAccepted),
                Some(super::assembly::AssemblyChoice::DeNovo),
            ]
        );

        Ok(())
    }

    #[tracing_test::traced_test]
    #[test]
    fn collect_inputs_unknown_assembly_sample() -> Result<(), anyhow::Error> {
        let mut args = args(Mode::Patient, "unused.csv");
        args.assembly_used.push("sample-z,pseudo".into());

        super::collect_inputs(&args)?;

        assert!(logs_contain("ignoring assembly choice for unknown sample"));

        Ok(())
    }

    #[test]
    fn run_fails_on_malformed_variants() {
        let tmpdir = temp_testdir::TempDir::default();
        let path_output = tmpdir.join("overview.csv");
        let mut args = args(Mode::Environment, path_output.to_str().expect("invalid path"));
        args.path_variants[0] = "tests/variants/malformed.vcf".into();

        let err = super::run(&crate::common::Args::default(), &args).unwrap_err();

        assert!(err.to_string().contains("processing sample sample-b failed"));
    }
}
