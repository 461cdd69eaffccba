//! Reading of variant call files (VCF or BCF) into `VariantRecord`s.

use std::path::Path;

use noodles::{bcf, vcf};

use super::{
    ann::{TryFromVcf, VariantRecord},
    tiers::{Aggregator, ReferenceSets, SampleSummary},
};

/// Whether the file at `path` is to be read as BCF.
fn is_bcf(path: &Path) -> bool {
    path.extension().map(|s| s.to_str()) == Some(Some("bcf"))
}

/// Call `func` for each record of the VCF/BCF file at `path`, in file order.
///
/// BCF is detected from the `.bcf` extension, VCF files may be bgzip-compressed.
pub fn for_each_record<P, F>(path: P, mut func: F) -> Result<usize, anyhow::Error>
where
    P: AsRef<Path>,
    F: FnMut(VariantRecord) -> Result<(), anyhow::Error>,
{
    let path = path.as_ref();
    let mut count = 0;
    if is_bcf(path) {
        tracing::trace!("Opening {:?} as BCF", path);
        let mut reader = std::fs::File::open(path)
            .map(bcf::io::Reader::new)
            .map_err(|e| anyhow::anyhow!("could not open {} for reading: {}", path.display(), e))?;
        let header = reader.read_header()?;
        for result in reader.records() {
            let record = vcf::variant::RecordBuf::try_from_variant_record(&header, &result?)?;
            func(VariantRecord::try_from_vcf(&record, &header)?)?;
            count += 1;
        }
    } else {
        tracing::trace!("Opening {:?} as VCF", path);
        let mut reader = vcf::io::reader::Builder::default()
            .build_from_path(path)
            .map_err(|e| anyhow::anyhow!("could not open {} for reading: {}", path.display(), e))?;
        let header = reader.read_header()?;
        for result in reader.record_bufs(&header) {
            func(VariantRecord::try_from_vcf(&result?, &header)?)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Summarize the variant call file of one sample.
pub fn summarize_path<P: AsRef<Path>>(
    path: P,
    reference_sets: &ReferenceSets,
) -> Result<SampleSummary, anyhow::Error> {
    let path = path.as_ref();
    let before = std::time::Instant::now();
    let mut aggregator = Aggregator::new(reference_sets);
    let count = for_each_record(path, |record| {
        aggregator.add_record(&record).map_err(|e| {
            anyhow::anyhow!("problem with variant record in {}: {}", path.display(), e)
        })
    })?;
    tracing::debug!(
        "summarized {} records from {} in {:?}",
        count,
        path.display(),
        before.elapsed()
    );
    Ok(aggregator.finish())
}

#[cfg(test)]
mod test {
    use noodles::{bcf, vcf};
    use pretty_assertions::assert_eq;

    use crate::variants::{
        ann::VariantRecord,
        tiers::{ReferenceSets, SampleSummary},
    };

    fn read_records(path: &str) -> Result<Vec<VariantRecord>, anyhow::Error> {
        let mut result = Vec::new();
        super::for_each_record(path, |record| {
            result.push(record);
            Ok(())
        })?;
        Ok(result)
    }

    /// Convert the VCF file at `path_vcf` to BCF at `path_bcf`.
    fn write_bcf(path_vcf: &str, path_bcf: &std::path::Path) -> Result<(), anyhow::Error> {
        use vcf::variant::io::Write as _;

        let mut reader = vcf::io::reader::Builder::default().build_from_path(path_vcf)?;
        let header = reader.read_header()?;
        let mut writer = bcf::io::Writer::new(std::fs::File::create(path_bcf)?);
        writer.write_header(&header)?;
        for result in reader.record_bufs(&header) {
            writer.write_variant_record(&header, &result?)?;
        }
        drop(writer);

        Ok(())
    }

    fn expected_sample_a() -> SampleSummary {
        SampleSummary {
            flirt: "S:F456L:0.875".to_string(),
            of_interest: "S:D614G:1.000".to_string(),
            other: "ORF1ab:P314L:0.600 ORF1ab:T265I:0.250".to_string(),
        }
    }

    #[test]
    fn read_records_vcf() -> Result<(), anyhow::Error> {
        let records = read_records("tests/variants/sample-a.vcf")?;

        assert_eq!(records.len(), 6);
        assert_eq!(
            records
                .iter()
                .map(|record| record.annotations.len())
                .collect::<Vec<_>>(),
            vec![1, 2, 1, 1, 1, 0]
        );

        Ok(())
    }

    #[test]
    fn summarize_path_vcf() -> Result<(), anyhow::Error> {
        let reference_sets = ReferenceSets::load("tests/variants/reference-sets.toml")?;
        let summary = super::summarize_path("tests/variants/sample-a.vcf", &reference_sets)?;

        assert_eq!(summary, expected_sample_a());

        Ok(())
    }

    #[test]
    fn summarize_path_bcf() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_bcf = tmp_dir.join("sample-a.bcf");
        write_bcf("tests/variants/sample-a.vcf", &path_bcf)?;

        let reference_sets = ReferenceSets::load("tests/variants/reference-sets.toml")?;
        let summary = super::summarize_path(&path_bcf, &reference_sets)?;

        assert_eq!(summary, expected_sample_a());
        assert_eq!(read_records(path_bcf.to_str().expect("invalid path"))?.len(), 6);

        Ok(())
    }

    #[test]
    fn summarize_path_synonymous_is_percent_decoded() -> Result<(), anyhow::Error> {
        let reference_sets = ReferenceSets::load("tests/variants/reference-sets.toml")?;
        let summary = super::summarize_path("tests/variants/synonymous.vcf", &reference_sets)?;

        assert_eq!(
            summary,
            SampleSummary {
                flirt: String::new(),
                of_interest: String::new(),
                other: "S:L5=:0.500".to_string(),
            }
        );

        Ok(())
    }

    #[test]
    fn summarize_path_malformed() -> Result<(), anyhow::Error> {
        let reference_sets = ReferenceSets::default();
        let err = super::summarize_path("tests/variants/malformed.vcf", &reference_sets)
            .unwrap_err();

        assert!(err.to_string().contains("malformed HGVS.p annotation"));
        assert!(err.to_string().contains("tests/variants/malformed.vcf"));

        Ok(())
    }

    #[test]
    fn summarize_path_missing_file() {
        let reference_sets = ReferenceSets::default();

        assert!(super::summarize_path("tests/variants/does-not-exist.bcf", &reference_sets).is_err());
        assert!(super::summarize_path("tests/variants/does-not-exist.vcf", &reference_sets).is_err());
    }
}
