//! In-memory catalog backed by a JSON data dump.
//!
//! The dump mirrors the database tables with foreign keys as plain ids;
//! [`MemoryCatalog`] resolves the joins at query time. It is used by the
//! HTTP tests and for serving small snapshots without `PostgreSQL`.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wals_types::{
    Contribution, ContributionReference, Contributor, Country, Datapoint, DomainElement, Family,
    Genus, Language, LanguageWithGenus, Parameter, SampleSize, Sentence, Source, Value, ValueSet,
};

use crate::catalog::{Catalog, CatalogResult, chapter_order};
use crate::error::DbError;
use crate::query::{Eager, LookupQuery};

/// A value row: the domain element it selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// Value identifier.
    pub id: String,
    /// The selected domain element.
    pub domainelement_id: String,
}

/// A value set row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetRecord {
    /// Identifier (`{feature}-{language}`).
    pub id: String,
    /// The feature.
    pub parameter_id: String,
    /// The language.
    pub language_id: String,
    /// The values.
    #[serde(default)]
    pub values: Vec<ValueRecord>,
    /// Last modification time.
    pub updated: DateTime<Utc>,
}

/// A chapter reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// The cited source.
    pub source_id: String,
    /// Page numbers or other detail.
    #[serde(default)]
    pub description: String,
}

/// A chapter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Chapter number.
    pub id: String,
    /// Title.
    pub name: String,
    /// Authors in citation order.
    #[serde(default)]
    pub contributor_ids: Vec<String>,
    /// Cited sources.
    #[serde(default)]
    pub references: Vec<ReferenceRecord>,
}

/// The full contents of a WALS database as plain rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDump {
    /// Families.
    pub families: Vec<Family>,
    /// Genera.
    pub genera: Vec<Genus>,
    /// Languages.
    pub languages: Vec<Language>,
    /// Countries.
    pub countries: Vec<Country>,
    /// Features with their domains.
    pub parameters: Vec<Parameter>,
    /// Value sets.
    pub valuesets: Vec<ValueSetRecord>,
    /// Chapters.
    pub contributions: Vec<ContributionRecord>,
    /// Authors.
    pub contributors: Vec<Contributor>,
    /// Bibliography.
    pub sources: Vec<Source>,
    /// Example sentences.
    pub sentences: Vec<Sentence>,
}

/// A [`Catalog`] answering from an in-memory [`DataDump`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    dump: DataDump,
    genera: BTreeMap<String, Genus>,
    families: BTreeMap<String, Family>,
    domain: BTreeMap<String, DomainElement>,
}

impl MemoryCatalog {
    /// Build a catalog from a dump.
    pub fn new(dump: DataDump) -> Self {
        let genera = dump
            .genera
            .iter()
            .map(|g| (g.id.clone(), g.clone()))
            .collect();
        let families = dump
            .families
            .iter()
            .map(|f| (f.id.clone(), f.clone()))
            .collect();
        let domain = dump
            .parameters
            .iter()
            .flat_map(|p| p.domain.iter())
            .map(|de| (de.id.clone(), de.clone()))
            .collect();

        Self {
            dump,
            genera,
            families,
            domain,
        }
    }

    /// Load a catalog from a JSON dump on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file cannot be read, or
    /// [`DbError::Serialization`] if it is not a valid dump.
    pub fn from_json_file(path: &Path) -> Result<Self, DbError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DbError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dump: DataDump = serde_json::from_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            languages = dump.languages.len(),
            parameters = dump.parameters.len(),
            valuesets = dump.valuesets.len(),
            "Loaded data dump"
        );
        Ok(Self::new(dump))
    }

    /// The underlying dump.
    pub const fn dump(&self) -> &DataDump {
        &self.dump
    }

    fn classify(&self, language: &Language) -> Option<LanguageWithGenus> {
        let genus = self.genera.get(&language.genus_id)?;
        let family = self.families.get(&genus.family_id)?;
        Some(LanguageWithGenus {
            language: language.clone(),
            genus: genus.clone(),
            family: family.clone(),
        })
    }

    fn classified_where(&self, keep: impl Fn(&Language) -> bool) -> Vec<LanguageWithGenus> {
        let mut languages: Vec<_> = self
            .dump
            .languages
            .iter()
            .filter(|&l| keep(l))
            .filter_map(|l| {
                let classified = self.classify(l);
                if classified.is_none() {
                    tracing::warn!(language = %l.id, genus = %l.genus_id, "Language without genus");
                }
                classified
            })
            .collect();
        languages.sort_by(|a, b| a.language.name.cmp(&b.language.name));
        languages
    }

    fn resolve_valueset(&self, record: &ValueSetRecord) -> ValueSet {
        let values = record
            .values
            .iter()
            .filter_map(|v| {
                self.domain.get(&v.domainelement_id).map(|de| Value {
                    id: v.id.clone(),
                    domain_element: de.clone(),
                })
            })
            .collect();
        ValueSet {
            id: record.id.clone(),
            parameter_id: record.parameter_id.clone(),
            language_id: record.language_id.clone(),
            values,
            updated: record.updated,
        }
    }

    fn contributors_of(&self, record: &ContributionRecord) -> Vec<Contributor> {
        record
            .contributor_ids
            .iter()
            .filter_map(|id| self.dump.contributors.iter().find(|c| &c.id == id).cloned())
            .collect()
    }

    fn references_of(&self, record: &ContributionRecord) -> Vec<ContributionReference> {
        let mut refs: Vec<_> = record
            .references
            .iter()
            .filter_map(|r| {
                self.dump
                    .sources
                    .iter()
                    .find(|s| s.id == r.source_id)
                    .map(|s| ContributionReference {
                        source: s.clone(),
                        description: r.description.clone(),
                    })
            })
            .collect();
        refs.sort_by(|a, b| a.source.name.cmp(&b.source.name));
        refs
    }
}

fn sorted_by_name<T: Clone>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort_by(|a, b| name(a).cmp(name(b)));
    items
}

impl Catalog for MemoryCatalog {
    async fn languages(&self) -> CatalogResult<Vec<LanguageWithGenus>> {
        Ok(self.classified_where(|_| true))
    }

    async fn language(&self, query: &LookupQuery) -> CatalogResult<Option<LanguageWithGenus>> {
        Ok(self
            .dump
            .languages
            .iter()
            .find(|l| l.id == query.id)
            .and_then(|l| self.classify(l)))
    }

    async fn sample_languages(&self, sample: SampleSize) -> CatalogResult<Vec<LanguageWithGenus>> {
        Ok(self.classified_where(|l| match sample {
            SampleSize::Hundred => l.samples_100,
            SampleSize::TwoHundred => l.samples_200,
        }))
    }

    async fn families(&self) -> CatalogResult<Vec<Family>> {
        Ok(sorted_by_name(&self.dump.families, |f| f.name.as_str()))
    }

    async fn genera(&self) -> CatalogResult<Vec<Genus>> {
        Ok(sorted_by_name(&self.dump.genera, |g| g.name.as_str()))
    }

    async fn family(&self, query: &LookupQuery) -> CatalogResult<Option<Family>> {
        Ok(self.families.get(&query.id).cloned())
    }

    async fn family_languages(&self, family_id: &str) -> CatalogResult<Vec<LanguageWithGenus>> {
        Ok(self.classified_where(|l| {
            self.genera
                .get(&l.genus_id)
                .is_some_and(|g| g.family_id == family_id)
        }))
    }

    async fn countries(&self) -> CatalogResult<Vec<Country>> {
        Ok(sorted_by_name(&self.dump.countries, |c| c.name.as_str()))
    }

    async fn country(&self, query: &LookupQuery) -> CatalogResult<Option<Country>> {
        Ok(self
            .dump
            .countries
            .iter()
            .find(|c| c.id == query.id)
            .cloned())
    }

    async fn country_languages(&self, country_id: &str) -> CatalogResult<Vec<LanguageWithGenus>> {
        Ok(self.classified_where(|l| l.country_ids.iter().any(|c| c == country_id)))
    }

    async fn parameters(&self) -> CatalogResult<Vec<Parameter>> {
        let mut parameters = self.dump.parameters.clone();
        parameters.sort_by(|a, b| chapter_order(&a.id).cmp(&chapter_order(&b.id)));
        Ok(parameters)
    }

    async fn parameter(&self, query: &LookupQuery) -> CatalogResult<Option<Parameter>> {
        Ok(self
            .dump
            .parameters
            .iter()
            .find(|p| p.id == query.id)
            .cloned())
    }

    async fn datapoints(&self, parameter_id: Option<&str>) -> CatalogResult<Vec<Datapoint>> {
        let mut datapoints: Vec<_> = self
            .dump
            .valuesets
            .iter()
            .filter(|vs| parameter_id.is_none_or(|p| vs.parameter_id == p))
            .filter_map(|vs| {
                let language = self.dump.languages.iter().find(|l| l.id == vs.language_id)?;
                Some(Datapoint {
                    language: self.classify(language)?,
                    valueset: self.resolve_valueset(vs),
                })
            })
            .collect();
        datapoints.sort_by(|a, b| {
            chapter_order(&a.valueset.parameter_id)
                .cmp(&chapter_order(&b.valueset.parameter_id))
                .then_with(|| a.language.language.name.cmp(&b.language.language.name))
        });
        Ok(datapoints)
    }

    async fn valueset(&self, query: &LookupQuery) -> CatalogResult<Option<ValueSet>> {
        Ok(self
            .dump
            .valuesets
            .iter()
            .find(|vs| vs.id == query.id)
            .map(|vs| self.resolve_valueset(vs)))
    }

    async fn recent_valuesets(&self, limit: u32) -> CatalogResult<Vec<ValueSet>> {
        let mut records: Vec<_> = self.dump.valuesets.iter().collect();
        records.sort_by(|a, b| b.updated.cmp(&a.updated).then_with(|| a.id.cmp(&b.id)));
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(records
            .into_iter()
            .take(limit)
            .map(|vs| self.resolve_valueset(vs))
            .collect())
    }

    async fn contributions(&self) -> CatalogResult<Vec<Contribution>> {
        let mut chapters: Vec<_> = self
            .dump
            .contributions
            .iter()
            .map(|c| Contribution {
                id: c.id.clone(),
                name: c.name.clone(),
                contributors: self.contributors_of(c),
                references: None,
            })
            .collect();
        chapters.sort_by(|a, b| chapter_order(&a.id).cmp(&chapter_order(&b.id)));
        Ok(chapters)
    }

    async fn contribution(&self, query: &LookupQuery) -> CatalogResult<Option<Contribution>> {
        Ok(self
            .dump
            .contributions
            .iter()
            .find(|c| c.id == query.id)
            .map(|c| Contribution {
                id: c.id.clone(),
                name: c.name.clone(),
                contributors: self.contributors_of(c),
                references: query
                    .loads(Eager::ReferencesWithSources)
                    .then(|| self.references_of(c)),
            }))
    }

    async fn sources(&self) -> CatalogResult<Vec<Source>> {
        Ok(sorted_by_name(&self.dump.sources, |s| s.name.as_str()))
    }

    async fn source(&self, query: &LookupQuery) -> CatalogResult<Option<Source>> {
        Ok(self.dump.sources.iter().find(|s| s.id == query.id).cloned())
    }

    async fn contributors(&self) -> CatalogResult<Vec<Contributor>> {
        Ok(sorted_by_name(&self.dump.contributors, |c| c.name.as_str()))
    }

    async fn contributor(&self, query: &LookupQuery) -> CatalogResult<Option<Contributor>> {
        Ok(self
            .dump
            .contributors
            .iter()
            .find(|c| c.id == query.id)
            .cloned())
    }

    async fn sentences(&self) -> CatalogResult<Vec<Sentence>> {
        let mut sentences = self.dump.sentences.clone();
        sentences.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sentences)
    }

    async fn sentence(&self, query: &LookupQuery) -> CatalogResult<Option<Sentence>> {
        Ok(self
            .dump
            .sentences
            .iter()
            .find(|s| s.id == query.id)
            .cloned())
    }
}
