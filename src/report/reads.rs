//! Reading of read counts from plain-text counters and fastp reports.

use std::{io::Read, path::Path};

use crate::common::open_read_maybe_gz;

/// Marker in paths of plain-text read count files.
const PLAIN_COUNT_MARKER: &str = "fastq-read-counts";

/// Stage of read processing to take counts for from fastp reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Stage {
    /// Reads before trimming.
    #[strum(serialize = "before_filtering")]
    Raw,
    /// Reads after trimming.
    #[strum(serialize = "after_filtering")]
    Trimmed,
}

/// Read statistics of one stage in a fastp report.
#[derive(Debug, Clone, serde::Deserialize)]
struct FastpStats {
    total_reads: u64,
}

/// Summary section of a fastp report.
#[derive(Debug, Clone, serde::Deserialize)]
struct FastpSummary {
    before_filtering: FastpStats,
    after_filtering: FastpStats,
}

/// The parts of a fastp JSON report that we use.
#[derive(Debug, Clone, serde::Deserialize)]
struct FastpReport {
    summary: FastpSummary,
}

fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, anyhow::Error> {
    let mut buf = String::new();
    open_read_maybe_gz(path.as_ref())
        .map_err(|e| anyhow::anyhow!("could not open {}: {}", path.as_ref().display(), e))?
        .read_to_string(&mut buf)?;
    Ok(buf)
}

/// Load a read count from a file containing a single integer.
pub fn load_plain<P: AsRef<Path>>(path: P) -> Result<u64, anyhow::Error> {
    let contents = read_to_string(path.as_ref())?;
    contents.trim().parse::<u64>().map_err(|e| {
        anyhow::anyhow!(
            "invalid read count {:?} in {}: {}",
            contents.trim(),
            path.as_ref().display(),
            e
        )
    })
}

/// Load the total read count of `stage` from a fastp JSON report.
pub fn load_fastp<P: AsRef<Path>>(path: P, stage: Stage) -> Result<u64, anyhow::Error> {
    let report: FastpReport = serde_json::from_str(&read_to_string(path.as_ref())?)
        .map_err(|e| {
            anyhow::anyhow!(
                "problem parsing fastp report {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
    Ok(match stage {
        Stage::Raw => report.summary.before_filtering.total_reads,
        Stage::Trimmed => report.summary.after_filtering.total_reads,
    })
}

/// Load the read count of `stage`; plain-text counters are detected from the path.
pub fn load(path: &str, stage: Stage) -> Result<u64, anyhow::Error> {
    if path.contains(PLAIN_COUNT_MARKER) {
        load_plain(path)
    } else {
        tracing::trace!("taking {} reads from fastp report {}", stage, path);
        load_fastp(path, stage)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Stage;

    #[rstest::rstest]
    #[case("tests/report/sample-a.fastp.json", Stage::Raw, 2_000_000)]
    #[case("tests/report/sample-a.fastp.json", Stage::Trimmed, 1_874_310)]
    #[case("tests/report/sample-b.fastq-read-counts.txt", Stage::Raw, 1234)]
    #[case("tests/report/sample-b.fastq-read-counts.txt", Stage::Trimmed, 1234)]
    fn load(
        #[case] path: &str,
        #[case] stage: Stage,
        #[case] expected: u64,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(super::load(path, stage)?, expected);

        Ok(())
    }

    #[test]
    fn load_plain_with_whitespace() -> Result<(), anyhow::Error> {
        assert_eq!(super::load_plain("tests/report/sample-a.filtered-reads.txt")?, 1_800_000);

        Ok(())
    }

    #[test]
    fn load_plain_invalid() {
        let err = super::load_plain("tests/report/sample-a.fastp.json").unwrap_err();

        assert!(err.to_string().contains("invalid read count"));
    }

    #[test]
    fn load_fastp_invalid() {
        assert!(super::load_fastp("tests/report/sample-b.fastq-read-counts.txt", Stage::Raw).is_err());
    }
}
