//! Contig lengths of assemblies.

use std::path::Path;

use bio::io::fasta;

use crate::common::open_read_maybe_gz;

/// Path that the pipeline uses in place of assemblies that could not be built.
pub const DEFAULT_PLACEHOLDER: &str = "resources/genomes/main.fasta";

/// Length of the largest contig in the FASTA file at `path`.
///
/// Returns 0 if `path` equals `placeholder`, the reference genome used as stand-in.
pub fn largest_contig<P: AsRef<Path>>(path: P, placeholder: &str) -> Result<usize, anyhow::Error> {
    let path = path.as_ref();
    if path == Path::new(placeholder) {
        tracing::debug!("{} is the placeholder assembly", path.display());
        return Ok(0);
    }

    let reader = fasta::Reader::new(open_read_maybe_gz(path)?);
    let mut result: Option<usize> = None;
    for record in reader.records() {
        let record = record.map_err(|e| {
            anyhow::anyhow!("problem reading FASTA file {}: {}", path.display(), e)
        })?;
        result = Some(result.unwrap_or(0).max(record.seq().len()));
    }

    result.ok_or_else(|| anyhow::anyhow!("no contigs in FASTA file {}", path.display()))
}
