//! Map-marker icons.
//!
//! Every entity that can appear on a map resolves to at most one icon:
//! values and domain elements use the domain element's icon, languages
//! and genera use the genus icon. Icons are served as static PNGs.

use wals_types::{DomainElement, Genus, LanguageWithGenus, Value};

/// An entity that can be drawn on a map.
#[derive(Debug, Clone, Copy)]
pub enum MarkerSubject<'a> {
    /// A coded value; drawn with its domain element's icon.
    Value(&'a Value),
    /// A feature value category.
    DomainElement(&'a DomainElement),
    /// A language; drawn with its genus icon.
    Language(&'a LanguageWithGenus),
    /// A genus.
    Genus(&'a Genus),
}

impl<'a> MarkerSubject<'a> {
    /// The icon identifier, if the entity has a non-empty one.
    pub fn icon(self) -> Option<&'a str> {
        let icon = match self {
            Self::Value(value) => value.domain_element.icon.as_deref(),
            Self::DomainElement(de) => de.icon.as_deref(),
            Self::Language(language) => language.genus.icon.as_deref(),
            Self::Genus(genus) => genus.icon.as_deref(),
        };
        icon.filter(|name| !name.is_empty())
    }
}

/// Turns icon identifiers into static asset URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerResolver {
    static_url: String,
}

impl MarkerResolver {
    /// Resolver for icons served under `static_url` (e.g. `/static`).
    pub fn new(static_url: &str) -> Self {
        Self {
            static_url: static_url.trim_end_matches('/').to_owned(),
        }
    }

    /// URL of the icon for `subject`, or `None` if it has no icon.
    pub fn marker_url(&self, subject: MarkerSubject<'_>) -> Option<String> {
        subject.icon().map(|icon| self.icon_url(icon))
    }

    /// URL of a named icon.
    pub fn icon_url(&self, icon: &str) -> String {
        format!("{}/icons/{icon}.png", self.static_url)
    }
}
