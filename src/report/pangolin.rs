//! Reading of Pangolin lineage assignments.

use std::path::Path;

use crate::common::open_read_maybe_gz;

/// Lineage text for samples without lineage assignment.
pub const NO_STRAIN_CALLED: &str = "no strain called";
/// WHO label text for samples without Scorpio call.
pub const NO_WHO_LABEL: &str = "-";

/// The used columns of a Pangolin lineage report.
#[derive(Debug, Clone, serde::Deserialize)]
struct Record {
    lineage: Option<String>,
    scorpio_call: Option<String>,
}

/// Lineage call of one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageCall {
    /// Pango lineage, or `NO_STRAIN_CALLED`.
    pub lineage: String,
    /// WHO label from the Scorpio call, or `NO_WHO_LABEL`.
    pub who_label: String,
}

impl Default for LineageCall {
    fn default() -> Self {
        Self {
            lineage: NO_STRAIN_CALLED.to_string(),
            who_label: NO_WHO_LABEL.to_string(),
        }
    }
}

/// Whether Pangolin wrote a missing value.
fn is_missing(value: &Option<String>) -> bool {
    matches!(value.as_deref(), None | Some("") | Some("None") | Some("nan"))
}

impl From<Record> for LineageCall {
    fn from(record: Record) -> Self {
        Self {
            lineage: if is_missing(&record.lineage) {
                NO_STRAIN_CALLED.to_string()
            } else {
                record.lineage.unwrap_or_default()
            },
            who_label: if is_missing(&record.scorpio_call) {
                NO_WHO_LABEL.to_string()
            } else {
                record.scorpio_call.unwrap_or_default()
            },
        }
    }
}

/// Load the lineage call from the Pangolin CSV file at `path`.
///
/// # Errors
///
/// Returns an error if the file does not contain exactly one record.
pub fn load<P: AsRef<Path>>(path: P) -> Result<LineageCall, anyhow::Error> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(open_read_maybe_gz(path)?);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<Record>, _>>()
        .map_err(|e| anyhow::anyhow!("problem parsing Pangolin file {}: {}", path.display(), e))?;

    match <[Record; 1]>::try_from(records) {
        Ok([record]) => Ok(record.into()),
        Err(records) => anyhow::bail!(
            "unexpected number of rows ({}) in Pangolin file {}",
            records.len(),
            path.display()
        ),
    }
}
