#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("Invalid format of assembly choice {0:?}, expected <sample>,<choice>")]
    AssemblyChoiceInvalidFormat(String),
    #[error("Unknown assembly choice {0:?}")]
    AssemblyChoiceUnknown(String),
    #[error("Expected {expected} entries for {name} (one per sample) but got {found}")]
    SampleCountMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Missing {0}, required for patient reports")]
    MissingPatientInput(&'static str),
}
