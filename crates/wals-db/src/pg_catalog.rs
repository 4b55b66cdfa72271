//! [`Catalog`] implementation over `PostgreSQL`.
//!
//! Related rows are fetched with joins or `= ANY($1)` batch queries so a
//! listing never issues one query per row. Chapter references are only
//! joined in when the lookup carries [`Eager::ReferencesWithSources`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use wals_types::{
    Contribution, ContributionReference, Contributor, Country, Datapoint, DomainElement, Family,
    Genus, Language, LanguageWithGenus, Parameter, SampleSize, Sentence, Source, Value, ValueSet,
};

use crate::catalog::{Catalog, CatalogResult, chapter_order};
use crate::postgres::PostgresPool;
use crate::query::{Eager, LookupQuery};

/// Languages joined with genus and family.
const LANGUAGE_SELECT: &str = r"SELECT l.id, l.name, l.latitude, l.longitude, l.iso_codes,
       ARRAY(SELECT lc.country_id FROM language_country lc
             WHERE lc.language_id = l.id ORDER BY lc.country_id) AS country_ids,
       l.samples_100, l.samples_200,
       g.id AS genus_id, g.name AS genus_name, g.icon AS genus_icon,
       f.id AS family_id, f.name AS family_name
  FROM language l
  JOIN genus g ON g.id = l.genus_id
  JOIN family f ON f.id = g.family_id";

/// Numeric chapter ordering for ids like `1A`, `10A`, `144Y`.
const CHAPTER_ORDER: &str = r"(substring(id from '^[0-9]+'))::int, id";

/// A [`Catalog`] backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a catalog over an open pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    async fn languages_where(
        &self,
        filter: &str,
        bind: Option<&str>,
    ) -> CatalogResult<Vec<LanguageWithGenus>> {
        let sql = format!("{LANGUAGE_SELECT} {filter} ORDER BY l.name, l.id");
        let mut query = sqlx::query_as::<_, LanguageRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(LanguageWithGenus::from).collect())
    }

    async fn domains(&self, parameter_ids: &[String]) -> CatalogResult<Vec<DomainElement>> {
        let rows = sqlx::query_as::<_, DomainElementRow>(
            r"SELECT id, parameter_id, name, number, icon
              FROM domainelement
              WHERE parameter_id = ANY($1)
              ORDER BY parameter_id, number",
        )
        .bind(parameter_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DomainElement::from).collect())
    }

    async fn with_domains(&self, rows: Vec<ParameterRow>) -> CatalogResult<Vec<Parameter>> {
        let ids: Vec<String> = rows.iter().map(|p| p.id.clone()).collect();
        let mut by_parameter: HashMap<String, Vec<DomainElement>> = HashMap::new();
        for de in self.domains(&ids).await? {
            by_parameter
                .entry(de.parameter_id.clone())
                .or_default()
                .push(de);
        }
        Ok(rows
            .into_iter()
            .map(|p| Parameter {
                domain: by_parameter.remove(&p.id).unwrap_or_default(),
                id: p.id,
                name: p.name,
                chapter_id: p.chapter_id,
            })
            .collect())
    }

    async fn with_values(&self, rows: Vec<ValueSetRow>) -> CatalogResult<Vec<ValueSet>> {
        let ids: Vec<String> = rows.iter().map(|vs| vs.id.clone()).collect();
        let value_rows = sqlx::query_as::<_, ValueRow>(
            r"SELECT v.id, v.valueset_id,
                     de.id AS de_id, de.parameter_id AS de_parameter_id, de.name AS de_name,
                     de.number AS de_number, de.icon AS de_icon
              FROM value v
              JOIN domainelement de ON de.id = v.domainelement_id
              WHERE v.valueset_id = ANY($1)
              ORDER BY v.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_valueset: HashMap<String, Vec<Value>> = HashMap::new();
        for row in value_rows {
            let (valueset_id, value) = row.into_value();
            by_valueset.entry(valueset_id).or_default().push(value);
        }

        Ok(rows
            .into_iter()
            .map(|vs| ValueSet {
                values: by_valueset.remove(&vs.id).unwrap_or_default(),
                id: vs.id,
                parameter_id: vs.parameter_id,
                language_id: vs.language_id,
                updated: vs.updated,
            })
            .collect())
    }

    async fn contributors_by_chapter(
        &self,
        contribution_id: Option<&str>,
    ) -> CatalogResult<HashMap<String, Vec<Contributor>>> {
        let rows = sqlx::query_as::<_, ChapterAuthorRow>(
            r"SELECT cc.contribution_id, c.id, c.name, c.url
              FROM contribution_contributor cc
              JOIN contributor c ON c.id = cc.contributor_id
              WHERE ($1::text IS NULL OR cc.contribution_id = $1)
              ORDER BY cc.contribution_id, cc.ord",
        )
        .bind(contribution_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_chapter: HashMap<String, Vec<Contributor>> = HashMap::new();
        for row in rows {
            by_chapter
                .entry(row.contribution_id)
                .or_default()
                .push(Contributor {
                    id: row.id,
                    name: row.name,
                    url: row.url,
                });
        }
        Ok(by_chapter)
    }

    async fn references(&self, contribution_id: &str) -> CatalogResult<Vec<ContributionReference>> {
        let rows = sqlx::query_as::<_, ReferenceRow>(
            r"SELECT cr.description AS reference_description,
                     s.id, s.name, s.description, s.author, s.year
              FROM contribution_reference cr
              JOIN source s ON s.id = cr.source_id
              WHERE cr.contribution_id = $1
              ORDER BY s.name",
        )
        .bind(contribution_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ContributionReference::from).collect())
    }
}

impl Catalog for PgCatalog {
    async fn languages(&self) -> CatalogResult<Vec<LanguageWithGenus>> {
        self.languages_where("", None).await
    }

    async fn language(&self, query: &LookupQuery) -> CatalogResult<Option<LanguageWithGenus>> {
        let mut rows = self
            .languages_where("WHERE l.id = $1", Some(&query.id))
            .await?;
        Ok(rows.pop())
    }

    async fn sample_languages(&self, sample: SampleSize) -> CatalogResult<Vec<LanguageWithGenus>> {
        let filter = format!("WHERE l.{}", sample.flag_column());
        self.languages_where(&filter, None).await
    }

    async fn families(&self) -> CatalogResult<Vec<Family>> {
        let rows = sqlx::query_as::<_, FamilyRow>("SELECT id, name FROM family ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Family::from).collect())
    }

    async fn genera(&self) -> CatalogResult<Vec<Genus>> {
        let rows = sqlx::query_as::<_, GenusRow>(
            "SELECT id, name, family_id, icon FROM genus ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Genus::from).collect())
    }

    async fn family(&self, query: &LookupQuery) -> CatalogResult<Option<Family>> {
        let row = sqlx::query_as::<_, FamilyRow>("SELECT id, name FROM family WHERE id = $1")
            .bind(&query.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Family::from))
    }

    async fn family_languages(&self, family_id: &str) -> CatalogResult<Vec<LanguageWithGenus>> {
        self.languages_where("WHERE f.id = $1", Some(family_id))
            .await
    }

    async fn countries(&self) -> CatalogResult<Vec<Country>> {
        let rows = sqlx::query_as::<_, CountryRow>("SELECT id, name FROM country ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn country(&self, query: &LookupQuery) -> CatalogResult<Option<Country>> {
        let row = sqlx::query_as::<_, CountryRow>("SELECT id, name FROM country WHERE id = $1")
            .bind(&query.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Country::from))
    }

    async fn country_languages(&self, country_id: &str) -> CatalogResult<Vec<LanguageWithGenus>> {
        self.languages_where(
            r"WHERE EXISTS (SELECT 1 FROM language_country lc
                            WHERE lc.language_id = l.id AND lc.country_id = $1)",
            Some(country_id),
        )
        .await
    }

    async fn parameters(&self) -> CatalogResult<Vec<Parameter>> {
        let sql = format!("SELECT id, name, chapter_id FROM parameter ORDER BY {CHAPTER_ORDER}");
        let rows = sqlx::query_as::<_, ParameterRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        self.with_domains(rows).await
    }

    async fn parameter(&self, query: &LookupQuery) -> CatalogResult<Option<Parameter>> {
        let row = sqlx::query_as::<_, ParameterRow>(
            "SELECT id, name, chapter_id FROM parameter WHERE id = $1",
        )
        .bind(&query.id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.with_domains(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn datapoints(&self, parameter_id: Option<&str>) -> CatalogResult<Vec<Datapoint>> {
        let rows = sqlx::query_as::<_, ValueSetRow>(
            r"SELECT id, parameter_id, language_id, updated
              FROM valueset
              WHERE ($1::text IS NULL OR parameter_id = $1)",
        )
        .bind(parameter_id)
        .fetch_all(&self.pool)
        .await?;
        let valuesets = self.with_values(rows).await?;

        let language_ids: Vec<String> = valuesets.iter().map(|vs| vs.language_id.clone()).collect();
        let languages: HashMap<String, LanguageWithGenus> = sqlx::query_as::<_, LanguageRow>(
            &format!("{LANGUAGE_SELECT} WHERE l.id = ANY($1)"),
        )
        .bind(&language_ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| (row.id.clone(), LanguageWithGenus::from(row)))
        .collect();

        let mut datapoints: Vec<Datapoint> = valuesets
            .into_iter()
            .filter_map(|valueset| {
                let language = languages.get(&valueset.language_id)?.clone();
                Some(Datapoint { language, valueset })
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
        let row = sqlx::query_as::<_, ValueSetRow>(
            "SELECT id, parameter_id, language_id, updated FROM valueset WHERE id = $1",
        )
        .bind(&query.id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.with_values(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn recent_valuesets(&self, limit: u32) -> CatalogResult<Vec<ValueSet>> {
        let rows = sqlx::query_as::<_, ValueSetRow>(
            r"SELECT id, parameter_id, language_id, updated
              FROM valueset
              ORDER BY updated DESC, id
              LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        self.with_values(rows).await
    }

    async fn contributions(&self) -> CatalogResult<Vec<Contribution>> {
        let sql = format!("SELECT id, name FROM contribution ORDER BY {CHAPTER_ORDER}");
        let rows = sqlx::query_as::<_, ContributionRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        let mut authors = self.contributors_by_chapter(None).await?;
        Ok(rows
            .into_iter()
            .map(|row| Contribution {
                contributors: authors.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                references: None,
            })
            .collect())
    }

    async fn contribution(&self, query: &LookupQuery) -> CatalogResult<Option<Contribution>> {
        let Some(row) =
            sqlx::query_as::<_, ContributionRow>("SELECT id, name FROM contribution WHERE id = $1")
                .bind(&query.id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let mut authors = self.contributors_by_chapter(Some(&row.id)).await?;
        let references = if query.loads(Eager::ReferencesWithSources) {
            Some(self.references(&row.id).await?)
        } else {
            None
        };

        Ok(Some(Contribution {
            contributors: authors.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            references,
        }))
    }

    async fn sources(&self) -> CatalogResult<Vec<Source>> {
        let rows = sqlx::query_as::<_, SourceRow>(
            "SELECT id, name, description, author, year FROM source ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Source::from).collect())
    }

    async fn source(&self, query: &LookupQuery) -> CatalogResult<Option<Source>> {
        let row = sqlx::query_as::<_, SourceRow>(
            "SELECT id, name, description, author, year FROM source WHERE id = $1",
        )
        .bind(&query.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Source::from))
    }

    async fn contributors(&self) -> CatalogResult<Vec<Contributor>> {
        let rows = sqlx::query_as::<_, ContributorRow>(
            "SELECT id, name, url FROM contributor ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Contributor::from).collect())
    }

    async fn contributor(&self, query: &LookupQuery) -> CatalogResult<Option<Contributor>> {
        let row = sqlx::query_as::<_, ContributorRow>(
            "SELECT id, name, url FROM contributor WHERE id = $1",
        )
        .bind(&query.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Contributor::from))
    }

    async fn sentences(&self) -> CatalogResult<Vec<Sentence>> {
        let rows = sqlx::query_as::<_, SentenceRow>(
            r"SELECT id, language_id, name, analyzed, gloss, translation
              FROM sentence ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Sentence::from).collect())
    }

    async fn sentence(&self, query: &LookupQuery) -> CatalogResult<Option<Sentence>> {
        let row = sqlx::query_as::<_, SentenceRow>(
            r"SELECT id, language_id, name, analyzed, gloss, translation
              FROM sentence WHERE id = $1",
        )
        .bind(&query.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Sentence::from))
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
struct LanguageRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    iso_codes: Vec<String>,
    country_ids: Vec<String>,
    samples_100: bool,
    samples_200: bool,
    genus_id: String,
    genus_name: String,
    genus_icon: Option<String>,
    family_id: String,
    family_name: String,
}

impl From<LanguageRow> for LanguageWithGenus {
    fn from(row: LanguageRow) -> Self {
        Self {
            language: Language {
                id: row.id,
                name: row.name,
                latitude: row.latitude,
                longitude: row.longitude,
                genus_id: row.genus_id.clone(),
                iso_codes: row.iso_codes,
                country_ids: row.country_ids,
                samples_100: row.samples_100,
                samples_200: row.samples_200,
            },
            genus: Genus {
                id: row.genus_id,
                name: row.genus_name,
                family_id: row.family_id.clone(),
                icon: row.genus_icon,
            },
            family: Family {
                id: row.family_id,
                name: row.family_name,
            },
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FamilyRow {
    id: String,
    name: String,
}

impl From<FamilyRow> for Family {
    fn from(row: FamilyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct GenusRow {
    id: String,
    name: String,
    family_id: String,
    icon: Option<String>,
}

impl From<GenusRow> for Genus {
    fn from(row: GenusRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            family_id: row.family_id,
            icon: row.icon,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CountryRow {
    id: String,
    name: String,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ParameterRow {
    id: String,
    name: String,
    chapter_id: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct DomainElementRow {
    id: String,
    parameter_id: String,
    name: String,
    number: i32,
    icon: Option<String>,
}

impl From<DomainElementRow> for DomainElement {
    fn from(row: DomainElementRow) -> Self {
        Self {
            id: row.id,
            parameter_id: row.parameter_id,
            name: row.name,
            number: row.number,
            icon: row.icon,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ValueSetRow {
    id: String,
    parameter_id: String,
    language_id: String,
    updated: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ValueRow {
    id: String,
    valueset_id: String,
    de_id: String,
    de_parameter_id: String,
    de_name: String,
    de_number: i32,
    de_icon: Option<String>,
}

impl ValueRow {
    fn into_value(self) -> (String, Value) {
        (
            self.valueset_id,
            Value {
                id: self.id,
                domain_element: DomainElement {
                    id: self.de_id,
                    parameter_id: self.de_parameter_id,
                    name: self.de_name,
                    number: self.de_number,
                    icon: self.de_icon,
                },
            },
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ContributionRow {
    id: String,
    name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ChapterAuthorRow {
    contribution_id: String,
    id: String,
    name: String,
    url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ContributorRow {
    id: String,
    name: String,
    url: Option<String>,
}

impl From<ContributorRow> for Contributor {
    fn from(row: ContributorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            url: row.url,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SourceRow {
    id: String,
    name: String,
    description: String,
    author: String,
    year: Option<String>,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            author: row.author,
            year: row.year,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ReferenceRow {
    reference_description: String,
    id: String,
    name: String,
    description: String,
    author: String,
    year: Option<String>,
}

impl From<ReferenceRow> for ContributionReference {
    fn from(row: ReferenceRow) -> Self {
        Self {
            description: row.reference_description,
            source: Source {
                id: row.id,
                name: row.name,
                description: row.description,
                author: row.author,
                year: row.year,
            },
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SentenceRow {
    id: String,
    language_id: String,
    name: String,
    analyzed: String,
    gloss: String,
    translation: String,
}

impl From<SentenceRow> for Sentence {
    fn from(row: SentenceRow) -> Self {
        Self {
            id: row.id,
            language_id: row.language_id,
            name: row.name,
            analyzed: row.analyzed,
            gloss: row.gloss,
            translation: row.translation,
        }
    }
}
