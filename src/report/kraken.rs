//! Reading of Kraken classification reports.

use std::path::Path;

use crate::common::open_read_maybe_gz;

/// Rank code of domain rows.
const RANK_DOMAIN: &str = "D";
/// Name of the SARS-CoV-2 species row.
const NAME_SARS: &str = "Severe acute respiratory syndrome-related coronavirus";
/// Name of the unclassified reads row.
const NAME_UNCLASSIFIED: &str = "unclassified";

/// Column headers, in output order.
pub const HEADERS: [&str; 5] = [
    "Eukaryota (%)",
    "Bacteria (%)",
    "Viruses (%)",
    "thereof SARS (%)",
    "Unclassified (%)",
];

/// One row of a Kraken report.
#[derive(Debug, Clone, serde::Deserialize)]
struct Row {
    /// Percentage of reads in the clade.
    percent: f64,
    /// Reads in the clade.
    _covered: u64,
    /// Reads assigned directly.
    _assigned: u64,
    /// Rank code, e.g., `D` for domain.
    code: String,
    /// NCBI taxonomy ID.
    _tax_id: u64,
    /// Indented scientific name.
    name: String,
}

/// Read shares of the reported taxa, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeciesShares {
    pub eukaryota: f64,
    pub bacteria: f64,
    pub viruses: f64,
    /// Share of SARS-CoV-2, part of `viruses`.
    pub sars: f64,
    pub unclassified: f64,
}

impl SpeciesShares {
    /// Values in the order of `HEADERS`.
    pub fn values(&self) -> [f64; 5] {
        [
            self.eukaryota,
            self.bacteria,
            self.viruses,
            self.sars,
            self.unclassified,
        ]
    }

    /// Register the percentage of the row, ignoring rows not reported.
    fn register(&mut self, row: &Row) {
        let slot = match (row.code.as_str(), row.name.as_str()) {
            (_, NAME_SARS) => &mut self.sars,
            (_, NAME_UNCLASSIFIED) => &mut self.unclassified,
            (RANK_DOMAIN, "Eukaryota") => &mut self.eukaryota,
            (RANK_DOMAIN, "Bacteria") => &mut self.bacteria,
            (RANK_DOMAIN, "Viruses") => &mut self.viruses,
            _ => return,
        };
        *slot = row.percent;
    }
}

/// Load the species shares from the Kraken report at `path`.
///
/// Taxa missing from the report are reported with a share of zero.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SpeciesShares, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(open_read_maybe_gz(path.as_ref())?);

    let mut result = SpeciesShares::default();
    for row in reader.deserialize() {
        let row: Row = row.map_err(|e| {
            anyhow::anyhow!(
                "problem parsing Kraken report {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        result.register(&row);
    }

    Ok(result)
}
