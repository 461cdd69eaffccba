//! Classification of protein alterations into priority tiers and their rendering.

use std::collections::{btree_map, BTreeMap, HashMap, HashSet};
use std::path::Path;

use itertools::Itertools;

use super::{
    ann::{Error, VariantRecord},
    hgvsp::ProteinAlteration,
};

/// Maximal length of a rendered tier summary, cell limit of spreadsheet programs.
pub const MAX_SUMMARY_LEN: usize = 32_767;

/// Replacement for the "other" summary if it exceeds `MAX_SUMMARY_LEN`.
pub const TOO_MANY_VARIANTS: &str = "Too many variants to display";

/// The priority tier of an alteration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumIter,
)]
pub enum Tier {
    /// Alteration from the FLiRT set.
    #[strum(serialize = "FLiRT Mutations")]
    Flirt,
    /// Alteration from the variants/mutations of interest set.
    #[strum(serialize = "VOC Mutations")]
    OfInterest,
    /// Any other alteration.
    #[strum(serialize = "Other Mutations")]
    Other,
}

/// Curated alterations, by feature, in three-letter form.
pub type AlterationsByFeature = HashMap<String, HashSet<String>>;

/// The two curated reference sets used for classification.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReferenceSets {
    /// Tier-1 alterations.
    #[serde(default)]
    pub flirt: AlterationsByFeature,
    /// Tier-2 alterations.
    #[serde(default)]
    pub mutations_of_interest: AlterationsByFeature,
}

impl ReferenceSets {
    /// Load reference sets from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let toml_str = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!(
                "could not read reference sets from {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        let result: Self = toml::from_str(&toml_str).map_err(|e| {
            anyhow::anyhow!(
                "could not parse reference sets from {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        tracing::debug!(
            "loaded {} FLiRT and {} mutations of interest",
            result.flirt.values().map(HashSet::len).sum::<usize>(),
            result.mutations_of_interest.values().map(HashSet::len).sum::<usize>()
        );
        Ok(result)
    }

    /// Classify the three-letter `alteration` on `feature`.
    ///
    /// FLiRT membership is checked first, unknown features count as empty sets.
    pub fn classify(&self, feature: &str, alteration: &str) -> Tier {
        let contains = |sets: &AlterationsByFeature| {
            sets.get(feature)
                .map(|alterations| alterations.contains(alteration))
                .unwrap_or(false)
        };
        if contains(&self.flirt) {
            Tier::Flirt
        } else if contains(&self.mutations_of_interest) {
            Tier::OfInterest
        } else {
            Tier::Other
        }
    }
}

/// Alterations of one tier with their allele frequency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierAccumulator {
    /// Mapping from label to VAF, sorted by label.
    entries: BTreeMap<String, f32>,
}

impl TierAccumulator {
    /// Insert `label` with `vaf`, keeping the maximal VAF seen for each label.
    ///
    /// Different genomic variants can lead to the same protein alteration; only
    /// the call with the highest VAF is reported.
    pub fn insert(&mut self, label: String, vaf: f32) {
        match self.entries.entry(label) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(vaf);
            }
            btree_map::Entry::Occupied(mut entry) => {
                if *entry.get() < vaf {
                    entry.insert(vaf);
                }
            }
        }
    }

    /// Retained VAF for `label`, if any.
    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries.get(label).copied()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no alteration has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate labels in lexicographic order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Render as space-separated `<label>:<vaf>` with three decimals, sorted by label.
    pub fn format(&self) -> String {
        self.entries
            .iter()
            .map(|(label, vaf)| format!("{}:{:.3}", label, vaf))
            .join(" ")
    }
}

/// Replace `summary` by `TOO_MANY_VARIANTS` if it is longer than `MAX_SUMMARY_LEN`.
pub fn guard_overflow(summary: String) -> String {
    if summary.chars().count() > MAX_SUMMARY_LEN {
        TOO_MANY_VARIANTS.to_string()
    } else {
        summary
    }
}

/// Rendered tier summaries of one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SampleSummary {
    /// FLiRT alterations.
    pub flirt: String,
    /// Variant/mutations of interest alterations.
    pub of_interest: String,
    /// All other alterations, subject to the overflow guard.
    pub other: String,
}

impl SampleSummary {
    /// The summary for the given tier.
    pub fn get(&self, tier: Tier) -> &str {
        match tier {
            Tier::Flirt => &self.flirt,
            Tier::OfInterest => &self.of_interest,
            Tier::Other => &self.other,
        }
    }
}

/// Classifies and deduplicates the alterations of one sample.
#[derive(Debug, Clone)]
pub struct Aggregator<'a> {
    /// Reference sets used for classification.
    reference_sets: &'a ReferenceSets,
    /// FLiRT alterations.
    pub flirt: TierAccumulator,
    /// Variant/mutations of interest alterations.
    pub of_interest: TierAccumulator,
    /// All other alterations.
    pub other: TierAccumulator,
}

impl<'a> Aggregator<'a> {
    pub fn new(reference_sets: &'a ReferenceSets) -> Self {
        Self {
            reference_sets,
            flirt: Default::default(),
            of_interest: Default::default(),
            other: Default::default(),
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut TierAccumulator {
        match tier {
            Tier::Flirt => &mut self.flirt,
            Tier::OfInterest => &mut self.of_interest,
            Tier::Other => &mut self.other,
        }
    }

    /// Register all annotations of `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if an annotation has a malformed HGVS.p string.
    pub fn add_record(&mut self, record: &VariantRecord) -> Result<(), Error> {
        for annotation in &record.annotations {
            let alteration = match ProteinAlteration::parse(&annotation.hgvsp_raw)? {
                Some(alteration) => alteration,
                None => continue,
            };
            let tier = self
                .reference_sets
                .classify(&annotation.feature, &alteration.alteration);
            let label = format!("{}:{}", annotation.feature, alteration.one_letter());
            tracing::trace!(
                "{} on {} -> {} ({})",
                &alteration.alteration,
                &alteration.transcript_id,
                &label,
                tier
            );
            self.tier_mut(tier).insert(label, record.allele_frequency);
        }

        Ok(())
    }

    /// Render the three tiers, guarding the "other" tier against overflow.
    pub fn finish(self) -> SampleSummary {
        SampleSummary {
            flirt: self.flirt.format(),
            of_interest: self.of_interest.format(),
            other: guard_overflow(self.other.format()),
        }
    }
}

/// Summarize the variant records of one sample.
pub fn summarize<I>(records: I, reference_sets: &ReferenceSets) -> Result<SampleSummary, Error>
where
    I: IntoIterator<Item = VariantRecord>,
{
    let mut aggregator = Aggregator::new(reference_sets);
    for record in records {
        aggregator.add_record(&record)?;
    }
    Ok(aggregator.finish())
}
