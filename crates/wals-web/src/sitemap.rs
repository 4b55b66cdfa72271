//! XML sitemaps for search engines.
//!
//! `/sitemap.xml` is a sitemap index pointing at one sitemap per resource
//! kind: chapters, features, references, examples and datapoints. Each
//! kind is split into chunks of at most [`SITEMAP_CHUNK`] URLs, served at
//! `/sitemap.{rsc}.{n}.xml` with `n` counted from zero.

use maud::{html, Markup, PreEscaped};
use wals_db::{Catalog, CatalogResult};

use crate::error::WebError;
use crate::routes::{RouteError, RouteName, RouteTable};

/// Most URLs a single sitemap may list.
pub const SITEMAP_CHUNK: usize = 50_000;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Prolog of every XML document the site serves.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Resource kinds listed in sitemaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapResource {
    /// Chapters.
    Contribution,
    /// Features.
    Parameter,
    /// References.
    Source,
    /// Example sentences.
    Sentence,
    /// Datapoints.
    ValueSet,
}

impl SitemapResource {
    /// Every kind, in index order.
    pub const ALL: [Self; 5] = [
        Self::Contribution,
        Self::Parameter,
        Self::Source,
        Self::Sentence,
        Self::ValueSet,
    ];

    /// Token used in sitemap URLs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::Parameter => "parameter",
            Self::Source => "source",
            Self::Sentence => "sentence",
            Self::ValueSet => "valueset",
        }
    }

    /// Parse a URL token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rsc| rsc.as_str() == token)
    }

    const fn route(self) -> RouteName {
        match self {
            Self::Contribution => RouteName::Contribution,
            Self::Parameter => RouteName::Parameter,
            Self::Source => RouteName::Source,
            Self::Sentence => RouteName::Sentence,
            Self::ValueSet => RouteName::ValueSet,
        }
    }

    async fn ids<C: Catalog>(self, catalog: &C) -> CatalogResult<Vec<String>> {
        Ok(match self {
            Self::Contribution => {
                catalog.contributions().await?.into_iter().map(|r| r.id).collect()
            }
            Self::Parameter => catalog.parameters().await?.into_iter().map(|r| r.id).collect(),
            Self::Source => catalog.sources().await?.into_iter().map(|r| r.id).collect(),
            Self::Sentence => catalog.sentences().await?.into_iter().map(|r| r.id).collect(),
            Self::ValueSet => catalog
                .datapoints(None)
                .await?
                .into_iter()
                .map(|dp| dp.valueset.id)
                .collect(),
        })
    }
}

/// The sitemap index: one entry per non-empty chunk of every kind.
///
/// # Errors
///
/// Returns [`WebError`] if the catalog fails or a URL cannot be built.
pub async fn index<C: Catalog>(catalog: &C, routes: &RouteTable) -> Result<Markup, WebError> {
    let mut locations = Vec::new();
    for rsc in SitemapResource::ALL {
        let chunks = rsc.ids(catalog).await?.len().div_ceil(SITEMAP_CHUNK);
        for n in 0..chunks {
            let n = n.to_string();
            let params = [("rsc", rsc.as_str()), ("n", n.as_str())];
            locations.push(routes.route_url(RouteName::Sitemap, &params)?);
        }
    }

    Ok(html! {
        (PreEscaped(XML_DECLARATION))
        sitemapindex xmlns=(SITEMAP_NS) {
            @for location in &locations {
                sitemap { loc { (location) } }
            }
        }
    })
}

/// Chunk `n` of the sitemap for resource kind `rsc`.
///
/// # Errors
///
/// Returns [`WebError::NotFound`] for an unknown kind or a chunk past
/// the end, and [`WebError`] if the catalog fails.
pub async fn sitemap<C: Catalog>(
    catalog: &C,
    routes: &RouteTable,
    rsc: &str,
    n: &str,
) -> Result<Markup, WebError> {
    let missing = || WebError::NotFound(format!("no sitemap {rsc}.{n}"));
    let kind = SitemapResource::from_token(rsc).ok_or_else(missing)?;
    let chunk = n.parse::<usize>().ok().ok_or_else(missing)?;

    let ids = kind.ids(catalog).await?;
    let urls = ids
        .chunks(SITEMAP_CHUNK)
        .nth(chunk)
        .ok_or_else(missing)?
        .iter()
        .map(|id| routes.resource_url(kind.route(), id))
        .collect::<Result<Vec<_>, RouteError>>()?;
    tracing::debug!(rsc, chunk, urls = urls.len(), "sitemap");

    Ok(html! {
        (PreEscaped(XML_DECLARATION))
        urlset xmlns=(SITEMAP_NS) {
            @for location in &urls {
                url { loc { (location) } }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_every_kind() {
        for rsc in SitemapResource::ALL {
            assert_eq!(SitemapResource::from_token(rsc.as_str()), Some(rsc));
        }
        assert_eq!(SitemapResource::from_token("language"), None);
    }

    #[test]
    fn each_kind_links_to_its_detail_route() {
        assert_eq!(SitemapResource::ValueSet.route(), RouteName::ValueSet);
        assert_eq!(SitemapResource::Contribution.route(), RouteName::Contribution);
    }
}
