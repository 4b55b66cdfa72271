//! Shared type definitions for the WALS web application.
//!
//! The entities here are read-only views of the typological database:
//! the web layer never creates or mutates them. They are produced by the
//! `wals-db` catalog implementations and consumed by the `wals-web`
//! handlers, maps, and data tables.
//!
//! # Modules
//!
//! - [`enums`] -- Model kinds and sample sizes
//! - [`structs`] -- Entity structs (languages, features, chapters, sources)

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Model, SampleSize};
pub use structs::{
    Contribution, ContributionReference, Contributor, Country, Datapoint, DomainElement, Family,
    Genus, Language, LanguageWithGenus, Parameter, Sentence, Source, Value, ValueSet,
};
