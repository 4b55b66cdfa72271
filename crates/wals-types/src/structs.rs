//! Entity structs for the WALS database.
//!
//! Identifiers are the public WALS identifiers (`eng`, `1A`, `1A-eng`,
//! `81`), not surrogate keys, because they appear verbatim in URLs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Genealogy
// ---------------------------------------------------------------------------

/// A language family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    /// Family identifier (e.g. `indoeuropean`).
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A genus: the genealogical grouping directly above the language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genus {
    /// Genus identifier (e.g. `germanic`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// The family this genus belongs to.
    pub family_id: String,
    /// Map icon identifier (e.g. `cff6600`).
    #[serde(default)]
    pub icon: Option<String>,
}

/// A language (lect) as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    /// WALS code (e.g. `eng`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// The genus this language belongs to.
    pub genus_id: String,
    /// ISO 639-3 codes.
    #[serde(default)]
    pub iso_codes: Vec<String>,
    /// Countries the language is spoken in (ISO alpha-2).
    #[serde(default)]
    pub country_ids: Vec<String>,
    /// Member of the 100-language sample.
    #[serde(default)]
    pub samples_100: bool,
    /// Member of the 200-language sample.
    #[serde(default)]
    pub samples_200: bool,
}

/// A language with its genus and family loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageWithGenus {
    /// The language row.
    #[serde(flatten)]
    pub language: Language,
    /// The language's genus.
    pub genus: Genus,
    /// The genus's family.
    pub family: Family,
}

/// A country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code.
    pub id: String,
    /// Display name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Features and values
// ---------------------------------------------------------------------------

/// One possible value of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainElement {
    /// Identifier (e.g. `1A-1`).
    pub id: String,
    /// The feature this value belongs to.
    pub parameter_id: String,
    /// Display name (e.g. `Small`).
    pub name: String,
    /// Position within the feature's domain.
    pub number: i32,
    /// Map icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
}

/// A feature: a typological variable compared across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Identifier: chapter number plus uppercase letter (e.g. `1A`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// The chapter describing this feature.
    pub chapter_id: String,
    /// Possible values, ordered by number.
    #[serde(default)]
    pub domain: Vec<DomainElement>,
}

/// An observed value. The domain element is always loaded with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// Identifier.
    pub id: String,
    /// The value from the feature's domain.
    pub domain_element: DomainElement,
}

/// The values of one feature for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    /// Identifier: `{feature}-{language}` (e.g. `1A-eng`).
    pub id: String,
    /// The feature.
    pub parameter_id: String,
    /// The language.
    pub language_id: String,
    /// Observed values (one for almost all WALS datapoints).
    #[serde(default)]
    pub values: Vec<Value>,
    /// Last modification time.
    pub updated: DateTime<Utc>,
}

/// A value set together with its language, as shown on feature maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    /// The language, with genus and family.
    pub language: LanguageWithGenus,
    /// The value set.
    pub valueset: ValueSet,
}

// ---------------------------------------------------------------------------
// Chapters and bibliography
// ---------------------------------------------------------------------------

/// A bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Identifier.
    pub id: String,
    /// Short citation (e.g. `Dryer 1992`).
    pub name: String,
    /// Title.
    #[serde(default)]
    pub description: String,
    /// Author string.
    #[serde(default)]
    pub author: String,
    /// Publication year.
    #[serde(default)]
    pub year: Option<String>,
}

/// A chapter author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Homepage.
    #[serde(default)]
    pub url: Option<String>,
}

/// A source cited by a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionReference {
    /// The cited source.
    pub source: Source,
    /// Page numbers or other citation detail.
    #[serde(default)]
    pub description: String,
}

/// A chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Chapter number.
    pub id: String,
    /// Title.
    pub name: String,
    /// Authors, in citation order.
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    /// Cited sources. `None` unless the lookup asked for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ContributionReference>>,
}

/// An example sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Identifier.
    pub id: String,
    /// The language the example is in.
    pub language_id: String,
    /// The example text.
    pub name: String,
    /// Morpheme-segmented text.
    #[serde(default)]
    pub analyzed: String,
    /// Interlinear gloss.
    #[serde(default)]
    pub gloss: String,
    /// Free translation.
    #[serde(default)]
    pub translation: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn language_with_genus_flattens_language_fields() {
        let lang = LanguageWithGenus {
            language: Language {
                id: String::from("eng"),
                name: String::from("English"),
                latitude: 52.0,
                longitude: 0.0,
                genus_id: String::from("germanic"),
                iso_codes: vec![String::from("eng")],
                country_ids: vec![String::from("GB")],
                samples_100: true,
                samples_200: true,
            },
            genus: Genus {
                id: String::from("germanic"),
                name: String::from("Germanic"),
                family_id: String::from("indoeuropean"),
                icon: Some(String::from("cff6600")),
            },
            family: Family {
                id: String::from("indoeuropean"),
                name: String::from("Indo-European"),
            },
        };

        let json = serde_json::to_value(&lang).unwrap();
        assert_eq!(json["id"], "eng");
        assert_eq!(json["genus"]["icon"], "cff6600");
        assert_eq!(json["family"]["name"], "Indo-European");
    }

    #[test]
    fn unloaded_references_are_omitted() {
        let chapter = Contribution {
            id: String::from("1"),
            name: String::from("Consonant Inventories"),
            contributors: Vec::new(),
            references: None,
        };
        let json = serde_json::to_value(&chapter).unwrap();
        assert!(json.get("references").is_none());
    }

    #[test]
    fn missing_icon_deserializes_as_none() {
        let de: DomainElement = serde_json::from_str(
            r#"{"id":"1A-1","parameter_id":"1A","name":"Small","number":1}"#,
        )
        .unwrap();
        assert_eq!(de.id, "1A-1");
        assert_eq!(de.icon, None);
    }
}
