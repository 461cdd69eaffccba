//! Code for representing annotated variant calls of one sample.

use noodles::vcf;

use super::hgvsp::MalformedAnnotationError;

/// Index of the feature/gene name in an `INFO/ANN` entry.
pub const ANN_IDX_FEATURE: usize = 3;
/// Index of the transcript identifier in an `INFO/ANN` entry.
pub const ANN_IDX_TRANSCRIPT_ID: usize = 6;
/// Index of the HGVS protein notation in an `INFO/ANN` entry.
pub const ANN_IDX_HGVSP: usize = 11;

/// Error type for parsing annotations and variant records.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    MalformedAnnotation(#[from] MalformedAnnotationError),
    #[error("INFO/ANN entry has {found} fields but at least {expected} are required: {entry:?}")]
    TooFewAnnFields {
        entry: String,
        found: usize,
        expected: usize,
    },
    #[error("Invalid type of INFO/ANN")]
    InvalidTypeInfoAnn,
    #[error("Record has no samples")]
    NoSamples,
    #[error("Missing FORMAT/AF in first sample")]
    MissingAlleleFrequency,
    #[error("Invalid type of FORMAT/AF")]
    InvalidTypeFormatAf,
}

/// Trait for attempting conversion from VCF record.
pub trait TryFromVcf: Sized {
    /// Error type to use.
    type Error;

    /// Convert from VCF record.
    ///
    /// # Arguments
    ///
    /// * `record` - VCF record.
    /// * `header` - VCF header.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be converted.
    fn try_from_vcf(
        record: &vcf::variant::RecordBuf,
        header: &vcf::Header,
    ) -> Result<Self, Self::Error>;
}

/// One transcript/feature-level effect annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Feature (gene) name the alteration is reported against.
    pub feature: String,
    /// Transcript identifier.
    pub transcript_id: String,
    /// HGVS protein notation, empty if there is no protein-level effect.
    pub hgvsp_raw: String,
}

impl std::str::FromStr for Annotation {
    type Err = Error;

    /// Parse one pipe-delimited `INFO/ANN` entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split('|').collect::<Vec<_>>();
        if fields.len() <= ANN_IDX_HGVSP {
            return Err(Error::TooFewAnnFields {
                entry: s.to_string(),
                found: fields.len(),
                expected: ANN_IDX_HGVSP + 1,
            });
        }

        Ok(Self {
            feature: fields[ANN_IDX_FEATURE].to_string(),
            transcript_id: fields[ANN_IDX_TRANSCRIPT_ID].to_string(),
            hgvsp_raw: fields[ANN_IDX_HGVSP].to_string(),
        })
    }
}

/// A variant call of one sample with its annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantRecord {
    /// Allele frequency of the first alternate allele in the first sample.
    pub allele_frequency: f32,
    /// Annotations in the order of `INFO/ANN`.
    pub annotations: Vec<Annotation>,
}

/// Extract `FORMAT/AF` of the first alternate allele in the first sample.
fn first_sample_allele_frequency(record: &vcf::variant::RecordBuf) -> Result<f32, Error> {
    use vcf::variant::record_buf::samples::sample::value::{Array, Value};

    let sample = record.samples().values().next().ok_or(Error::NoSamples)?;
    match sample.get("AF") {
        Some(Some(Value::Float(af))) => Ok(*af),
        Some(Some(Value::Array(Array::Float(afs)))) => afs
            .first()
            .copied()
            .flatten()
            .ok_or(Error::MissingAlleleFrequency),
        Some(Some(_)) => Err(Error::InvalidTypeFormatAf),
        Some(None) | None => Err(Error::MissingAlleleFrequency),
    }
}

/// Extract and parse the `INFO/ANN` entries; a missing field yields no annotations.
fn annotations(record: &vcf::variant::RecordBuf) -> Result<Vec<Annotation>, Error> {
    use vcf::variant::record_buf::info::field::{value::Array, Value};

    match record.info().get("ANN") {
        Some(Some(Value::Array(Array::String(entries)))) => entries
            .iter()
            .flatten()
            .map(|entry| entry.parse::<Annotation>())
            .collect(),
        Some(Some(Value::String(entry))) => Ok(vec![entry.parse::<Annotation>()?]),
        Some(Some(_)) => Err(Error::InvalidTypeInfoAnn),
        Some(None) | None => Ok(Vec::new()),
    }
}

impl TryFromVcf for VariantRecord {
    type Error = Error;

    fn try_from_vcf(
        record: &vcf::variant::RecordBuf,
        _header: &vcf::Header,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            allele_frequency: first_sample_allele_frequency(record)?,
            annotations: annotations(record)?,
        })
    }
}
