//! Choice of assembly per sample.

use crate::err::ArgError;

/// The assembly that passed quality assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AssemblyChoice {
    #[strum(serialize = "Pseudo")]
    Pseudo,
    #[strum(serialize = "De Novo")]
    DeNovo,
    #[strum(serialize = "Consensus")]
    Consensus,
    #[strum(serialize = "not accepted by QA")]
    NotAccepted,
}

impl std::str::FromStr for AssemblyChoice {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pseudo" => AssemblyChoice::Pseudo,
            "normal" => AssemblyChoice::DeNovo,
            "consensus" => AssemblyChoice::Consensus,
            "not-accepted" => AssemblyChoice::NotAccepted,
            _ => return Err(ArgError::AssemblyChoiceUnknown(s.to_string())),
        })
    }
}

/// Parse an entry of the form `<sample>,<choice>`.
pub fn parse_entry(entry: &str) -> Result<(String, AssemblyChoice), ArgError> {
    let (sample, choice) = entry
        .split_once(',')
        .ok_or_else(|| ArgError::AssemblyChoiceInvalidFormat(entry.to_string()))?;
    Ok((sample.trim().to_string(), choice.trim().parse()?))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::AssemblyChoice;
    use crate::err::ArgError;

    #[rstest::rstest]
    #[case("sample-a,pseudo", AssemblyChoice::Pseudo, "Pseudo")]
    #[case("sample-a,normal", AssemblyChoice::DeNovo, "De Novo")]
    #[case("sample-a,consensus", AssemblyChoice::Consensus, "Consensus")]
    #[case("sample-a,not-accepted", AssemblyChoice::NotAccepted, "not accepted by QA")]
    fn parse_entry(
        #[case] entry: &str,
        #[case] choice: AssemblyChoice,
        #[case] display: &str,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(super::parse_entry(entry)?, ("sample-a".to_string(), choice));
        assert_eq!(choice.to_string(), display);

        Ok(())
    }

    #[test]
    fn parse_entry_invalid() {
        assert_eq!(
            super::parse_entry("sample-a"),
            Err(ArgError::AssemblyChoiceInvalidFormat("sample-a".to_string()))
        );
        assert_eq!(
            super::parse_entry("sample-a,best"),
            Err(ArgError::AssemblyChoiceUnknown("best".to_string()))
        );
    }
}
