//! The read-only catalog interface.
//!
//! [`Catalog`] abstracts the lookups the web layer needs. Two
//! implementations exist: [`PgCatalog`](crate::PgCatalog) for the
//! production database and [`MemoryCatalog`](crate::MemoryCatalog) for
//! tests and small deployments served from a JSON dump.
//!
//! Listings are returned in display order. Single-resource lookups take a
//! [`LookupQuery`] and return `Ok(None)` when nothing matches; turning that
//! into a not-found response is the caller's job.

use std::future::Future;

use wals_types::{
    Contribution, Contributor, Country, Datapoint, Family, Genus, LanguageWithGenus, Parameter,
    SampleSize, Sentence, Source, ValueSet,
};

use crate::error::DbError;
use crate::query::LookupQuery;

/// Result alias for catalog futures.
pub type CatalogResult<T> = Result<T, DbError>;

/// Read-only access to the WALS database.
pub trait Catalog: Send + Sync + 'static {
    // -- languages ----------------------------------------------------------

    /// All languages, ordered by name.
    fn languages(&self) -> impl Future<Output = CatalogResult<Vec<LanguageWithGenus>>> + Send;

    /// One language by WALS code.
    fn language(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<LanguageWithGenus>>> + Send;

    /// Members of a sample, ordered by name, with genus and family loaded.
    fn sample_languages(
        &self,
        sample: SampleSize,
    ) -> impl Future<Output = CatalogResult<Vec<LanguageWithGenus>>> + Send;

    // -- genealogy ----------------------------------------------------------

    /// All families, ordered by name.
    fn families(&self) -> impl Future<Output = CatalogResult<Vec<Family>>> + Send;

    /// All genera, ordered by name.
    fn genera(&self) -> impl Future<Output = CatalogResult<Vec<Genus>>> + Send;

    /// One family by identifier.
    fn family(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Family>>> + Send;

    /// Languages of a family, ordered by name.
    fn family_languages(
        &self,
        family_id: &str,
    ) -> impl Future<Output = CatalogResult<Vec<LanguageWithGenus>>> + Send;

    // -- countries ----------------------------------------------------------

    /// All countries, ordered by name.
    fn countries(&self) -> impl Future<Output = CatalogResult<Vec<Country>>> + Send;

    /// One country by ISO code.
    fn country(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Country>>> + Send;

    /// Languages spoken in a country, ordered by name.
    fn country_languages(
        &self,
        country_id: &str,
    ) -> impl Future<Output = CatalogResult<Vec<LanguageWithGenus>>> + Send;

    // -- features and values ------------------------------------------------

    /// All features with their domains, in chapter order.
    fn parameters(&self) -> impl Future<Output = CatalogResult<Vec<Parameter>>> + Send;

    /// One feature with its domain.
    fn parameter(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Parameter>>> + Send;

    /// Value sets with their languages, optionally restricted to one feature.
    fn datapoints(
        &self,
        parameter_id: Option<&str>,
    ) -> impl Future<Output = CatalogResult<Vec<Datapoint>>> + Send;

    /// One value set with its values.
    fn valueset(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<ValueSet>>> + Send;

    /// The most recently updated value sets, newest first.
    fn recent_valuesets(
        &self,
        limit: u32,
    ) -> impl Future<Output = CatalogResult<Vec<ValueSet>>> + Send;

    // -- chapters and bibliography ------------------------------------------

    /// All chapters with their authors, in chapter order.
    fn contributions(&self) -> impl Future<Output = CatalogResult<Vec<Contribution>>> + Send;

    /// One chapter. References are loaded only when the query asks for them.
    fn contribution(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Contribution>>> + Send;

    /// All sources, ordered by name.
    fn sources(&self) -> impl Future<Output = CatalogResult<Vec<Source>>> + Send;

    /// One source.
    fn source(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Source>>> + Send;

    /// All authors, ordered by name.
    fn contributors(&self) -> impl Future<Output = CatalogResult<Vec<Contributor>>> + Send;

    /// One author.
    fn contributor(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Contributor>>> + Send;

    // -- examples -----------------------------------------------------------

    /// All example sentences, ordered by identifier.
    fn sentences(&self) -> impl Future<Output = CatalogResult<Vec<Sentence>>> + Send;

    /// One example sentence.
    fn sentence(
        &self,
        query: &LookupQuery,
    ) -> impl Future<Output = CatalogResult<Option<Sentence>>> + Send;
}

/// Sort key for WALS identifiers that start with a chapter number.
///
/// Orders `2A` before `10A` and `9` before `10`; identifiers without a
/// numeric prefix sort after all numbered ones.
pub fn chapter_order(id: &str) -> (u32, &str) {
    let digits = id.bytes().take_while(u8::is_ascii_digit).count();
    let number = id
        .get(..digits)
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(u32::MAX);
    (number, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_order_is_numeric() {
        let mut ids = vec!["10A", "2A", "1B", "1A", "144Y", "9"];
        ids.sort_by_key(|id| chapter_order(id));
        assert_eq!(ids, vec!["1A", "1B", "2A", "9", "10A", "144Y"]);
    }

    #[test]
    fn chapter_order_puts_unnumbered_last() {
        assert!(chapter_order("s1") > chapter_order("999"));
    }
}
