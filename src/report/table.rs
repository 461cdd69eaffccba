//! Assembly and rendering of the overview table.

use std::io::Write;

use strum::IntoEnumIterator;
use thousands::Separable;

use super::{assembly::AssemblyChoice, kraken, pangolin::LineageCall, Mode};
use crate::variants::tiers::{SampleSummary, Tier};

/// Header of the index column.
pub const INDEX_HEADER: &str = "Sample";

/// Assembly and lineage information, only reported for patient samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientColumns {
    /// Largest contig of the initial assembly.
    pub largest_contig: usize,
    /// Largest contig of the polished de novo assembly.
    pub de_novo: usize,
    /// Largest contig of the pseudo assembly.
    pub pseudo: usize,
    /// Largest contig of the consensus sequence.
    pub consensus: usize,
    /// The assembly that passed quality assessment, if known.
    pub best_quality: Option<AssemblyChoice>,
    /// Pangolin lineage call.
    pub lineage: LineageCall,
}

/// One row of the overview table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub sample: String,
    pub species: kraken::SpeciesShares,
    pub reads_raw: u64,
    pub reads_trimmed: u64,
    pub reads_filtered: u64,
    pub patient: Option<PatientColumns>,
    pub variants: SampleSummary,
}

/// How the values of a column are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Percentages, one decimal place.
    Percent,
    /// Counts and lengths, thousands separated, dropped if all zero.
    Count,
    Text,
}

#[derive(Debug, Clone)]
struct Column {
    header: String,
    kind: Kind,
    values: Vec<String>,
}

impl Column {
    fn new<F>(header: &str, kind: Kind, rows: &[Row], func: F) -> Self
    where
        F: Fn(&Row) -> String,
    {
        Self {
            header: header.to_string(),
            kind,
            values: rows.iter().map(func).collect(),
        }
    }

    fn count<F>(header: &str, rows: &[Row], func: F) -> Self
    where
        F: Fn(&Row) -> u64,
    {
        Self::new(header, Kind::Count, rows, |row| {
            func(row).separate_with_commas()
        })
    }

    fn is_all_zero_count(&self) -> bool {
        self.kind == Kind::Count && self.values.iter().all(|value| value == "0")
    }
}

/// Build the columns for `rows` in output order.
fn build_columns(rows: &[Row], mode: Mode) -> Vec<Column> {
    let mut columns = Vec::new();

    for (i, header) in kraken::HEADERS.iter().enumerate() {
        columns.push(Column::new(header, Kind::Percent, rows, |row| {
            format!("{:.1}", row.species.values()[i])
        }));
    }

    columns.push(Column::count("Raw Reads (#)", rows, |row| row.reads_raw));
    columns.push(Column::count("Trimmed Reads (#)", rows, |row| {
        row.reads_trimmed
    }));
    columns.push(Column::count("Filtered Reads (#)", rows, |row| {
        row.reads_filtered
    }));

    if mode == Mode::Patient {
        let patient = |row: &Row| row.patient.clone().unwrap_or_default();
        columns.push(Column::count("Largest Contig (bp)", rows, |row| {
            patient(row).largest_contig as u64
        }));
        columns.push(Column::count("De Novo Sequence (bp)", rows, |row| {
            patient(row).de_novo as u64
        }));
        columns.push(Column::count("Pseudo Sequence (bp)", rows, |row| {
            patient(row).pseudo as u64
        }));
        columns.push(Column::count("Consensus Sequence (bp)", rows, |row| {
            patient(row).consensus as u64
        }));
        columns.push(Column::new("Best Quality", Kind::Text, rows, |row| {
            patient(row)
                .best_quality
                .map(|choice| choice.to_string())
                .unwrap_or_default()
        }));
        columns.push(Column::new("Pango Lineage", Kind::Text, rows, |row| {
            patient(row).lineage.lineage
        }));
        columns.push(Column::new("WHO Label", Kind::Text, rows, |row| {
            patient(row).lineage.who_label
        }));
    }

    for tier in Tier::iter() {
        columns.push(Column::new(&tier.to_string(), Kind::Text, rows, |row| {
            row.variants.get(tier).to_string()
        }));
    }

    columns
}

/// Write `rows` as CSV to `writer`, sorted by sample name.
///
/// Count columns that are zero for all samples are left out.
pub fn write_csv<W: Write>(mut rows: Vec<Row>, mode: Mode, writer: W) -> Result<(), anyhow::Error> {
    rows.sort_by(|a, b| a.sample.cmp(&b.sample));

    let columns = build_columns(&rows, mode)
        .into_iter()
        .filter(|column| {
            let drop = column.is_all_zero_count();
            if drop {
                tracing::debug!("dropping all-zero column {:?}", &column.header);
            }
            !drop
        })
        .collect::<Vec<_>>();

    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(
        std::iter::once(INDEX_HEADER).chain(columns.iter().map(|column| column.header.as_str())),
    )?;
    for (i, row) in rows.iter().enumerate() {
        writer.write_record(
            std::iter::once(row.sample.as_str())
                .chain(columns.iter().map(|column| column.values[i].as_str())),
        )?;
    }
    writer.flush()?;

    Ok(())
}
