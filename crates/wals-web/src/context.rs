//! Request context resolution.
//!
//! Detail handlers build a base [`LookupQuery`] from the route's model and
//! the requested id, then pass it through [`resolve_context`]. Resolution
//! either refines the query (eager loading) or short-circuits the request
//! with a permanent redirect.

use wals_db::{Eager, LookupQuery};
use wals_types::Model;

use crate::routes::{RouteError, RouteName, RouteTable};

/// Outcome of resolving a detail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Look the resource up with this (possibly refined) query.
    Lookup(LookupQuery),
    /// Answer with `301 Moved Permanently` to this URL.
    MovedPermanently(String),
}

/// Whether a feature id carries its letter suffix (`1A`, `81B`).
///
/// Ids without one (`81`) are chapter numbers from 2008-era URLs.
pub fn has_feature_suffix(id: &str) -> bool {
    id.chars().last().is_some_and(|c| c.is_ascii_uppercase())
}

/// Refine a base lookup query for its model.
///
/// - Chapters load their references with sources in the same lookup.
/// - Features whose id lacks the letter suffix redirect to the chapter
///   with the same id.
/// - Everything else passes through unchanged.
///
/// # Errors
///
/// Returns [`RouteError`] if the redirect URL cannot be built.
pub fn resolve_context(query: LookupQuery, routes: &RouteTable) -> Result<Resolution, RouteError> {
    match query.model {
        Model::Contribution => Ok(Resolution::Lookup(
            query.with_eager(Eager::ReferencesWithSources),
        )),
        Model::Parameter if !has_feature_suffix(&query.id) => {
            let url = routes.resource_url(RouteName::Contribution, &query.id)?;
            tracing::debug!(id = %query.id, %url, "feature id without suffix, redirecting to chapter");
            Ok(Resolution::MovedPermanently(url))
        }
        _ => Ok(Resolution::Lookup(query)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn routes() -> RouteTable {
        RouteTable::new("").unwrap()
    }

    #[test]
    fn suffix_detection() {
        assert!(has_feature_suffix("1A"));
        assert!(has_feature_suffix("144Y"));
        assert!(!has_feature_suffix("81"));
        assert!(!has_feature_suffix("1a"));
        assert!(!has_feature_suffix(""));
    }

    #[test]
    fn contribution_loads_references() {
        let query = LookupQuery::new(Model::Contribution, "1");
        let resolution = resolve_context(query, &routes()).unwrap();
        assert!(
            matches!(
                &resolution,
                Resolution::Lookup(refined)
                    if refined.loads(Eager::ReferencesWithSources) && refined.id == "1"
            ),
            "{resolution:?}"
        );
    }

    #[test]
    fn feature_without_suffix_redirects_to_chapter() {
        let query = LookupQuery::new(Model::Parameter, "81");
        assert_eq!(
            resolve_context(query, &routes()).unwrap(),
            Resolution::MovedPermanently(String::from("/chapter/81"))
        );
    }

    #[test]
    fn lowercase_suffix_is_not_a_feature_id() {
        let query = LookupQuery::new(Model::Parameter, "81a");
        assert_eq!(
            resolve_context(query, &routes()).unwrap(),
            Resolution::MovedPermanently(String::from("/chapter/81a"))
        );
    }

    #[test]
    fn feature_with_suffix_passes_through() {
        let query = LookupQuery::new(Model::Parameter, "81A");
        assert_eq!(
            resolve_context(query.clone(), &routes()).unwrap(),
            Resolution::Lookup(query)
        );
    }

    #[test]
    fn other_models_pass_through() {
        for model in [Model::Language, Model::Source, Model::ValueSet, Model::Family] {
            let query = LookupQuery::new(model, "x");
            assert_eq!(
                resolve_context(query.clone(), &routes()).unwrap(),
                Resolution::Lookup(query)
            );
        }
    }
}
