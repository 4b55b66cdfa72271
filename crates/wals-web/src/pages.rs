//! Site-level pages: home, dataset metadata, sitemaps, about pages,
//! genealogy, changes and the OAI-PMH endpoints.
//!
//! HTML and XML are rendered with [`maud`], which escapes every spliced
//! value.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Deserialize;
use serde_json::json;
use wals_db::Catalog;

use crate::config::SiteConfig;
use crate::error::WebError;
use crate::marker::MarkerSubject;
use crate::menu::MenuItem;
use crate::routes::{RouteName, RouteTable};
use crate::sitemap::{self, XML_DECLARATION};
use crate::state::AppState;

fn page(title: &str, menu: &[MenuItem], content: &Markup) -> Html<String> {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                nav {
                    ul {
                        @for item in menu {
                            li id=(format!("menuitem_{}", item.key)) {
                                a href=(item.url) { (item.label) }
                            }
                        }
                    }
                }
                main { (content) }
            }
        }
    };
    Html(markup.into_string())
}

fn xml(markup: Markup) -> Response {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        markup.into_string(),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET / -- home
// ---------------------------------------------------------------------------

/// Home page with the navigation menu.
pub async fn dataset<C: Catalog>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    let site = &state.site;
    let content = html! {
        h1 { (site.name) }
        p {
            "Published by " (site.publisher) ", licensed under "
            a href=(site.license) { (site.license) } "."
        }
    };
    page(&site.name, &state.menu, &content)
}

// ---------------------------------------------------------------------------
// GET /{file} -- void.{ext} and sitemaps
// ---------------------------------------------------------------------------

/// Files at the site root: `/void.{ext}`, `/sitemap.xml` and
/// `/sitemap.{rsc}.{n}.xml`.
pub async fn root_file<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(file): Path<String>,
) -> Result<Response, WebError> {
    let path = format!("/{file}");
    let routes = &state.routes;

    if routes.match_route(RouteName::SitemapIndex, &path).is_some() {
        let markup = sitemap::index(&state.catalog, routes).await?;
        return Ok(xml(markup));
    }
    if let Some(m) = routes.match_route(RouteName::Sitemap, &path) {
        let rsc = m.get("rsc").map_or("", String::as_str);
        let n = m.get("n").map_or("", String::as_str);
        let markup = sitemap::sitemap(&state.catalog, routes, rsc, n).await?;
        return Ok(xml(markup));
    }
    if let Some(m) = routes.match_route(RouteName::DatasetAlt, &path) {
        let ext = m.get("ext").map_or("", String::as_str);
        return dataset_alt(&state.catalog, routes, &state.site, ext).await;
    }
    Err(WebError::NotFound(format!("no resource at {path}")))
}

/// Dataset metadata. Only `json` is served.
async fn dataset_alt<C: Catalog>(
    catalog: &C,
    routes: &RouteTable,
    site: &SiteConfig,
    ext: &str,
) -> Result<Response, WebError> {
    if ext != "json" {
        return Err(WebError::NotFound(format!("unsupported representation {ext:?}")));
    }

    Ok(Json(json!({
        "name": site.name,
        "publisher": site.publisher,
        "license": site.license,
        "url": routes.route_url(RouteName::Dataset, &[])?,
        "sitemap": routes.route_url(RouteName::SitemapIndex, &[])?,
        "counts": {
            "languages": catalog.languages().await?.len(),
            "features": catalog.parameters().await?.len(),
            "chapters": catalog.contributions().await?.len(),
            "datapoints": catalog.datapoints(None).await?.len(),
            "sources": catalog.sources().await?.len(),
        },
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// About pages
// ---------------------------------------------------------------------------

/// Legal notice.
pub async fn legal<C: Catalog>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    let site = &state.site;
    let content = html! {
        h1 { "Legal" }
        p { (site.name) " is published by " (site.publisher) "." }
        p {
            "The data is licensed under "
            a href=(site.license) { (site.license) } "."
        }
    };
    page("Legal", &state.menu, &content)
}

/// Credits page listing the chapter authors.
pub async fn credits<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let authors = state
        .catalog
        .contributors()
        .await?
        .into_iter()
        .map(|a| -> Result<(String, String), WebError> {
            let url = state.routes.resource_url(RouteName::Contributor, &a.id)?;
            Ok((url, a.name))
        })
        .collect::<Result<Vec<_>, WebError>>()?;
    let content = html! {
        h1 { "Credits" }
        h2 { "Authors" }
        ul {
            @for (url, name) in &authors {
                li { a href=(url) { (name) } }
            }
        }
    };
    Ok(page("Credits", &state.menu, &content))
}

// ---------------------------------------------------------------------------
// GET /languoid/genealogy
// ---------------------------------------------------------------------------

/// Families with their genera and language counts.
pub async fn genealogy<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let families = state.catalog.families().await?;
    let genera = state.catalog.genera().await?;
    let languages = state.catalog.languages().await?;

    let mut per_genus: BTreeMap<&str, usize> = BTreeMap::new();
    for lang in &languages {
        let count = per_genus.entry(lang.genus.id.as_str()).or_default();
        *count = count.saturating_add(1);
    }

    let tree = families
        .iter()
        .map(|family| -> Result<serde_json::Value, WebError> {
            let members: Vec<_> = genera
                .iter()
                .filter(|g| g.family_id == family.id)
                .map(|g| {
                    json!({
                        "id": g.id,
                        "name": g.name,
                        "icon": state.markers.marker_url(MarkerSubject::Genus(g)),
                        "languages": per_genus.get(g.id.as_str()).copied().unwrap_or(0),
                    })
                })
                .collect();
            Ok(json!({
                "id": family.id,
                "name": family.name,
                "url": state.routes.resource_url(RouteName::Family, &family.id)?,
                "genera": members,
            }))
        })
        .collect::<Result<Vec<_>, WebError>>()?;

    Ok(Json(tree))
}

// ---------------------------------------------------------------------------
// GET /changes
// ---------------------------------------------------------------------------

/// The most recently updated datapoints.
pub async fn changes<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let recent = state
        .catalog
        .recent_valuesets(state.site.changes_limit)
        .await?
        .iter()
        .map(|vs| -> Result<serde_json::Value, WebError> {
            Ok(json!({
                "id": vs.id,
                "url": state.routes.resource_url(RouteName::ValueSet, &vs.id)?,
                "updated": vs.updated,
            }))
        })
        .collect::<Result<Vec<_>, WebError>>()?;
    Ok(Json(recent))
}

// ---------------------------------------------------------------------------
// OAI-PMH
// ---------------------------------------------------------------------------

/// Query parameters of the OAI-PMH endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct OaiQuery {
    /// The OAI verb; `Identify` when absent.
    pub verb: Option<String>,
}

/// OAI-PMH endpoint for language metadata.
pub async fn olac<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<OaiQuery>,
) -> Result<Response, WebError> {
    oai(&state.routes, &state.site, RouteName::Olac, "languages", &query)
}

/// OAI-PMH endpoint for the bibliography.
pub async fn olac_source<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<OaiQuery>,
) -> Result<Response, WebError> {
    oai(&state.routes, &state.site, RouteName::OlacSource, "references", &query)
}

fn oai(
    routes: &RouteTable,
    site: &SiteConfig,
    route: RouteName,
    scope: &str,
    query: &OaiQuery,
) -> Result<Response, WebError> {
    let document = oai_document(routes, site, route, scope, query)?;
    Ok((
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        document.into_string(),
    )
        .into_response())
}

/// `Identify` for the `Identify` verb (the default), `badVerb` otherwise.
fn oai_document(
    routes: &RouteTable,
    site: &SiteConfig,
    route: RouteName,
    scope: &str,
    query: &OaiQuery,
) -> Result<Markup, WebError> {
    let base_url = routes.route_url(route, &[])?;
    let verb = query.verb.as_deref().unwrap_or("Identify");
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    Ok(html! {
        (PreEscaped(XML_DECLARATION))
        OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/" {
            responseDate { (now) }
            @if verb == "Identify" {
                request verb="Identify" { (base_url) }
                Identify {
                    repositoryName { (site.name) " (" (scope) ")" }
                    baseURL { (base_url) }
                    protocolVersion { "2.0" }
                    adminEmail { (site.contact) }
                    earliestDatestamp { "2008-04-01" }
                    deletedRecord { "no" }
                    granularity { "YYYY-MM-DD" }
                }
            } @else {
                request { (base_url) }
                error code="badVerb" { "Illegal OAI verb: " (verb) }
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn page_escapes_menu_and_title() {
        let menu = [MenuItem {
            key: "blog",
            label: "News & Views",
            url: String::from("/search?q=<b>&page=2"),
        }];
        let Html(body) = page("A <b>bold</b> title", &menu, &html! { p { "x" } });
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("<title>A &lt;b&gt;bold&lt;/b&gt; title</title>"));
        assert!(body.contains(r#"<li id="menuitem_blog">"#));
        assert!(body.contains(r#"href="/search?q=&lt;b&gt;&amp;page=2""#));
        assert!(body.contains(">News &amp; Views</a>"));
    }

    #[test]
    fn oai_escapes_unknown_verbs() {
        let routes = RouteTable::new("").unwrap();
        let query = OaiQuery {
            verb: Some(String::from("<List>")),
        };
        let site = SiteConfig::default();
        let xml = oai_document(&routes, &site, RouteName::Olac, "languages", &query)
            .unwrap()
            .into_string();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<error code="badVerb">Illegal OAI verb: &lt;List&gt;</error>"#));
        assert!(xml.contains("<request>/languoid/oai</request>"));
    }
}
