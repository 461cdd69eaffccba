//! Handling of HGVS protein notation as found in `INFO/ANN`.

/// Mapping from three-letter to one-letter amino acid codes.
pub const AA_THREE_TO_ONE: &[(&str, &str); 20] = &[
    ("Gly", "G"),
    ("Ala", "A"),
    ("Leu", "L"),
    ("Met", "M"),
    ("Phe", "F"),
    ("Trp", "W"),
    ("Lys", "K"),
    ("Gln", "Q"),
    ("Glu", "E"),
    ("Ser", "S"),
    ("Pro", "P"),
    ("Val", "V"),
    ("Ile", "I"),
    ("Cys", "C"),
    ("Tyr", "Y"),
    ("His", "H"),
    ("Arg", "R"),
    ("Asn", "N"),
    ("Asp", "D"),
    ("Thr", "T"),
];

/// Raised for HGVS.p strings that are not of the shape `<id>:<prefix>.<alteration>`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed HGVS.p annotation: {raw:?}")]
pub struct MalformedAnnotationError {
    /// The offending raw string.
    pub raw: String,
}

/// A protein alteration split off an HGVS.p string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinAlteration {
    /// Identifier before the first `:`, e.g., `ENSSASP00005000003.1`.
    pub transcript_id: String,
    /// Alteration in three-letter form, e.g., `Asp614Gly`.
    pub alteration: String,
}

impl ProteinAlteration {
    /// Parse an HGVS.p string.
    ///
    /// Returns `Ok(None)` for the empty string, which denotes annotations without
    /// protein-level effect.  The part between `:` and the first `.` (usually `p`) is
    /// not checked.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` contains no `:` or no `.` after the first `:`.
    pub fn parse(raw: &str) -> Result<Option<Self>, MalformedAnnotationError> {
        if raw.is_empty() {
            return Ok(None);
        }

        let malformed = || MalformedAnnotationError {
            raw: raw.to_string(),
        };
        let (transcript_id, rest) = raw.split_once(':').ok_or_else(malformed)?;
        let (_prefix, alteration) = rest.split_once('.').ok_or_else(malformed)?;

        Ok(Some(Self {
            transcript_id: transcript_id.to_string(),
            alteration: alteration.to_string(),
        }))
    }

    /// The alteration with one-letter amino acid codes.
    pub fn one_letter(&self) -> String {
        three_to_one_letter(&self.alteration)
    }
}

/// Replace all canonical three-letter amino acid codes in `alteration`.
///
/// Codes are replaced as plain substrings, one code after the other.  Anything
/// that is not one of the 20 canonical codes (e.g., `Ter`, `Sec`, lowercase codes)
/// is kept as is.
pub fn three_to_one_letter(alteration: &str) -> String {
    AA_THREE_TO_ONE
        .iter()
        .fold(alteration.to_string(), |acc, (three, one)| {
            acc.replace(three, one)
        })
}
