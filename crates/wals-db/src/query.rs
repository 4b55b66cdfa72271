//! Lookup queries for single resources.
//!
//! A [`LookupQuery`] names the model and identifier a request resolved to,
//! plus any eager-loading directives. The web layer builds the base query
//! from the route match and may refine it before handing it to a
//! [`Catalog`](crate::Catalog).

use wals_types::Model;

/// Related rows a lookup should load in the same round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eager {
    /// A chapter's bibliographic references together with their sources.
    ReferencesWithSources,
}

/// A request for one resource by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    /// The model being looked up.
    pub model: Model,
    /// The identifier taken from the URL.
    pub id: String,
    /// Eager-loading directives.
    pub eager: Vec<Eager>,
}

impl LookupQuery {
    /// Create a base query with no eager loads.
    pub fn new(model: Model, id: impl Into<String>) -> Self {
        Self {
            model,
            id: id.into(),
            eager: Vec::new(),
        }
    }

    /// Add an eager-loading directive.
    #[must_use]
    pub fn with_eager(mut self, eager: Eager) -> Self {
        if !self.eager.contains(&eager) {
            self.eager.push(eager);
        }
        self
    }

    /// Whether the query asks for `eager` to be loaded.
    pub fn loads(&self, eager: Eager) -> bool {
        self.eager.contains(&eager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eager_directives_are_deduplicated() {
        let query = LookupQuery::new(Model::Contribution, "1")
            .with_eager(Eager::ReferencesWithSources)
            .with_eager(Eager::ReferencesWithSources);
        assert_eq!(query.eager.len(), 1);
        assert!(query.loads(Eager::ReferencesWithSources));
    }

    #[test]
    fn base_query_loads_nothing() {
        let query = LookupQuery::new(Model::Parameter, "1A");
        assert!(!query.loads(Eager::ReferencesWithSources));
        assert_eq!(query.id, "1A");
    }
}
