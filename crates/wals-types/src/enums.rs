//! Enumeration types for the WALS web application.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// The kind of database entity a lookup targets.
///
/// Context resolution dispatches on this value: some models get their
/// base query refined with eager loads, some may redirect, the rest pass
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// A language (lect), addressed by its WALS code.
    Language,
    /// A language family.
    Family,
    /// A country.
    Country,
    /// A feature (typological parameter).
    Parameter,
    /// An observed feature value for one language.
    ValueSet,
    /// A chapter.
    Contribution,
    /// A bibliographic source.
    Source,
    /// A chapter author.
    Contributor,
    /// An example sentence.
    Sentence,
}

impl Model {
    /// The lowercase name used in log fields and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Family => "family",
            Self::Country => "country",
            Self::Parameter => "parameter",
            Self::ValueSet => "valueset",
            Self::Contribution => "contribution",
            Self::Source => "source",
            Self::Contributor => "contributor",
            Self::Sentence => "sentence",
        }
    }
}

impl core::fmt::Display for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// One of the two curated language samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleSize {
    /// The 100-language sample.
    Hundred,
    /// The 200-language sample.
    TwoHundred,
}

impl SampleSize {
    /// Parse the `count` token of a sample URL.
    ///
    /// Only `"100"` and `"200"` are recognised.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "100" => Some(Self::Hundred),
            "200" => Some(Self::TwoHundred),
            _ => None,
        }
    }

    /// The number of languages the sample is named after.
    pub const fn count(self) -> u16 {
        match self {
            Self::Hundred => 100,
            Self::TwoHundred => 200,
        }
    }

    /// The membership flag column on the `language` table.
    pub const fn flag_column(self) -> &'static str {
        match self {
            Self::Hundred => "samples_100",
            Self::TwoHundred => "samples_200",
        }
    }

    /// Display name, e.g. `100-language sample`.
    pub fn name(self) -> String {
        format!("{}-language sample", self.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tokens() {
        assert_eq!(SampleSize::from_token("100"), Some(SampleSize::Hundred));
        assert_eq!(SampleSize::from_token("200"), Some(SampleSize::TwoHundred));
        assert_eq!(SampleSize::from_token("300"), None);
        assert_eq!(SampleSize::from_token(""), None);
        assert_eq!(SampleSize::from_token(" 100"), None);
    }

    #[test]
    fn sample_name() {
        assert_eq!(SampleSize::Hundred.name(), "100-language sample");
        assert_eq!(SampleSize::TwoHundred.name(), "200-language sample");
    }

    #[test]
    fn model_display() {
        assert_eq!(Model::ValueSet.to_string(), "valueset");
        assert_eq!(Model::Contribution.as_str(), "contribution");
    }
}
