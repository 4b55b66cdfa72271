//! Resource endpoint handlers.
//!
//! Detail handlers take the id segment from the URL, split off an optional
//! `.{ext}` representation suffix, run the base lookup through
//! [`resolve_context`] and answer from the [`Catalog`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/languoid` | Languages table |
//! | `GET` | `/languoid/lect/wals_code_{id}` | Language detail |
//! | `GET` | `/languoid/family/{id}` | Family detail, map |
//! | `GET` | `/languoid/samples/{count}` | Language sample, map |
//! | `GET` | `/feature` | Features table |
//! | `GET` | `/feature/{id}` | Feature detail, map |
//! | `GET` | `/feature-info/{id}` | Feature summary |
//! | `GET` | `/values` | Datapoints table |
//! | `GET` | `/valuesets/{id}` | Datapoint detail |
//! | `GET` | `/chapter` | Chapters table |
//! | `GET` | `/chapter/{id}` | Chapter with references |
//! | `GET` | `/country`, `/country/{id}` | Countries, country map |
//! | `GET` | `/refdb`, `/refdb/record/{id}` | Bibliography |
//! | `GET` | `/author`, `/author/{id}` | Authors |
//! | `GET` | `/example`, `/example/{id}` | Example sentences |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use wals_db::{Catalog, LookupQuery};
use wals_types::Model;

use crate::context::{resolve_context, Resolution};
use crate::datatables::{self, Chapters, Datapoints, Features, Languages};
use crate::error::WebError;
use crate::legacy::moved_permanently;
use crate::maps::{self, MapKind, MapLayer};
use crate::marker::MarkerSubject;
use crate::routes::{RouteName, RouteTable};
use crate::sample::Sample;
use crate::state::AppState;

/// Prefix of language ids in language URLs.
const LANGUAGE_PREFIX: &str = "wals_code_";

// ---------------------------------------------------------------------------
// Representation suffixes
// ---------------------------------------------------------------------------

/// Representation selected by the `.{ext}` suffix of a detail URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// No suffix or `.json`.
    Json,
    /// `.geojson`; only resources with a map accept it.
    GeoJson,
}

/// Split `1A.geojson` into `("1A", Format::GeoJson)`.
///
/// # Errors
///
/// Returns [`WebError::NotFound`] for an empty id or an unknown suffix.
pub fn split_ext(segment: &str) -> Result<(&str, Format), WebError> {
    let (id, ext) = segment
        .split_once('.')
        .map_or((segment, None), |(id, ext)| (id, Some(ext)));
    if id.is_empty() {
        return Err(WebError::NotFound(format!("no resource at {segment:?}")));
    }
    let format = match ext {
        None | Some("json") => Format::Json,
        Some("geojson") => Format::GeoJson,
        Some(other) => {
            return Err(WebError::NotFound(format!("unsupported representation {other:?}")));
        }
    };
    Ok((id, format))
}

fn json_only(format: Format, kind: &str, id: &str) -> Result<(), WebError> {
    match format {
        Format::Json => Ok(()),
        Format::GeoJson => Err(WebError::NotFound(format!("{kind} {id:?} has no map"))),
    }
}

fn geojson(layer: &MapLayer) -> Response {
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        Json(layer),
    )
        .into_response()
}

/// Run the base query for `model` and `id` through context resolution.
fn resolve(routes: &RouteTable, model: Model, id: &str) -> Result<Resolution, WebError> {
    Ok(resolve_context(LookupQuery::new(model, id), routes)?)
}

// ---------------------------------------------------------------------------
// Languages, families, samples
// ---------------------------------------------------------------------------

/// Languages table.
pub async fn languages<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let rows = state.catalog.languages().await?;
    Ok(Json(datatables::render::<Languages>(&rows, &state.table_context())?))
}

/// One language. The path segment is `wals_code_{id}[.json]`.
pub async fn language<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let code = segment
        .strip_prefix(LANGUAGE_PREFIX)
        .ok_or_else(|| WebError::NotFound(format!("no language at {segment:?}")))?;
    let (id, format) = split_ext(code)?;
    json_only(format, "language", id)?;

    let query = match resolve(&state.routes, Model::Language, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let lang = state
        .catalog
        .language(&query)
        .await?
        .ok_or_else(|| WebError::not_found("language", id))?;

    let routes = &state.routes;
    let countries = lang
        .language
        .country_ids
        .iter()
        .map(|c| routes.resource_url(RouteName::Country, c))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(json!({
        "language": lang,
        "url": routes.resource_url(RouteName::Language, &lang.language.id)?,
        "family_url": routes.resource_url(RouteName::Family, &lang.family.id)?,
        "country_urls": countries,
        "icon": state.markers.marker_url(MarkerSubject::Language(&lang)),
    }))
    .into_response())
}

/// One family, or its map.
pub async fn family<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    let query = match resolve(&state.routes, Model::Family, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let family = state
        .catalog
        .family(&query)
        .await?
        .ok_or_else(|| WebError::not_found("family", id))?;
    let languages = state.catalog.family_languages(&family.id).await?;

    if format == Format::GeoJson {
        let layer = maps::language_map(
            MapKind::Family,
            &family.name,
            &languages,
            &state.markers,
            &state.routes,
        )?;
        return Ok(geojson(&layer));
    }

    let genera: Vec<_> = state
        .catalog
        .genera()
        .await?
        .into_iter()
        .filter(|g| g.family_id == family.id)
        .map(|g| {
            let icon = state.markers.marker_url(MarkerSubject::Genus(&g));
            json!({ "genus": g, "icon": icon })
        })
        .collect();

    Ok(Json(json!({
        "family": family,
        "url": state.routes.resource_url(RouteName::Family, &family.id)?,
        "genera": genera,
        "languages": languages.len(),
    }))
    .into_response())
}

/// A language sample, or its map.
pub async fn sample<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (count, format) = split_ext(&segment)?;
    let sample = Sample::from_token(count)?;
    let languages = sample.languages(&state.catalog).await?;

    if format == Format::GeoJson {
        let layer = maps::language_map(
            MapKind::Sample,
            &sample.name,
            &languages,
            &state.markers,
            &state.routes,
        )?;
        return Ok(geojson(&layer));
    }

    let table = datatables::render::<Languages>(&languages, &state.table_context())?;
    Ok(Json(json!({
        "name": sample.name,
        "count": sample.size.count(),
        "url": state.routes.route_url(RouteName::Sample, &[("count", count)])?,
        "languages": table,
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

/// All countries.
pub async fn countries<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    Ok(Json(state.catalog.countries().await?))
}

/// One country, or its map.
pub async fn country<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    let query = match resolve(&state.routes, Model::Country, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let country = state
        .catalog
        .country(&query)
        .await?
        .ok_or_else(|| WebError::not_found("country", id))?;
    let languages = state.catalog.country_languages(&country.id).await?;

    if format == Format::GeoJson {
        let layer = maps::language_map(
            MapKind::Country,
            &country.name,
            &languages,
            &state.markers,
            &state.routes,
        )?;
        return Ok(geojson(&layer));
    }

    let table = datatables::render::<Languages>(&languages, &state.table_context())?;
    Ok(Json(json!({
        "country": country,
        "url": state.routes.resource_url(RouteName::Country, &country.id)?,
        "languages": table,
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// Features and datapoints
// ---------------------------------------------------------------------------

/// Features table.
pub async fn parameters<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let rows = state.catalog.parameters().await?;
    Ok(Json(datatables::render::<Features>(&rows, &state.table_context())?))
}

/// One feature, or its map. Bare chapter numbers redirect to the chapter.
pub async fn parameter<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    let query = match resolve(&state.routes, Model::Parameter, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let parameter = state
        .catalog
        .parameter(&query)
        .await?
        .ok_or_else(|| WebError::not_found("feature", id))?;

    if format == Format::GeoJson {
        let datapoints = state.catalog.datapoints(Some(&parameter.id)).await?;
        let layer = maps::feature_map(&parameter, &datapoints, &state.markers, &state.routes)?;
        return Ok(geojson(&layer));
    }

    let domain: Vec<_> = parameter
        .domain
        .iter()
        .map(|de| {
            json!({
                "id": de.id,
                "name": de.name,
                "number": de.number,
                "icon": state.markers.marker_url(MarkerSubject::DomainElement(de)),
            })
        })
        .collect();

    Ok(Json(json!({
        "id": parameter.id,
        "name": parameter.name,
        "url": state.routes.resource_url(RouteName::Parameter, &parameter.id)?,
        "chapter_url": state.routes.resource_url(RouteName::Contribution, &parameter.chapter_id)?,
        "domain": domain,
    }))
    .into_response())
}

/// Compact feature summary for map popups.
pub async fn feature_info<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, WebError> {
    let parameter = state
        .catalog
        .parameter(&LookupQuery::new(Model::Parameter, id.as_str()))
        .await?
        .ok_or_else(|| WebError::not_found("feature", &id))?;

    let values: Vec<_> = parameter
        .domain
        .iter()
        .map(|de| {
            json!({
                "name": de.name,
                "icon": state.markers.marker_url(MarkerSubject::DomainElement(de)),
            })
        })
        .collect();

    Ok(Json(json!({
        "id": parameter.id,
        "name": parameter.name,
        "url": state.routes.resource_url(RouteName::Parameter, &parameter.id)?,
        "chapter_url": state.routes.resource_url(RouteName::Contribution, &parameter.chapter_id)?,
        "values": values,
    })))
}

/// Datapoints table.
pub async fn values<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let rows = state.catalog.datapoints(None).await?;
    Ok(Json(datatables::render::<Datapoints>(&rows, &state.table_context())?))
}

/// One datapoint.
pub async fn valueset<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    json_only(format, "datapoint", id)?;
    let query = match resolve(&state.routes, Model::ValueSet, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let valueset = state
        .catalog
        .valueset(&query)
        .await?
        .ok_or_else(|| WebError::not_found("datapoint", id))?;

    let values: Vec<_> = valueset
        .values
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "name": v.domain_element.name,
                "number": v.domain_element.number,
                "icon": state.markers.marker_url(MarkerSubject::Value(v)),
            })
        })
        .collect();

    let routes = &state.routes;
    Ok(Json(json!({
        "id": valueset.id,
        "url": routes.resource_url(RouteName::ValueSet, &valueset.id)?,
        "language_url": routes.resource_url(RouteName::Language, &valueset.language_id)?,
        "parameter_url": routes.resource_url(RouteName::Parameter, &valueset.parameter_id)?,
        "updated": valueset.updated,
        "values": values,
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// Chapters and bibliography
// ---------------------------------------------------------------------------

/// Chapters table.
pub async fn contributions<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    let rows = state.catalog.contributions().await?;
    Ok(Json(datatables::render::<Chapters>(&rows, &state.table_context())?))
}

/// One chapter with its references.
pub async fn contribution<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    json_only(format, "chapter", id)?;
    let query = match resolve(&state.routes, Model::Contribution, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let chapter = state
        .catalog
        .contribution(&query)
        .await?
        .ok_or_else(|| WebError::not_found("chapter", id))?;
    Ok(Json(chapter).into_response())
}

/// Bibliography.
pub async fn sources<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    Ok(Json(state.catalog.sources().await?))
}

/// One bibliography record.
pub async fn source<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    json_only(format, "source", id)?;
    let query = match resolve(&state.routes, Model::Source, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let source = state
        .catalog
        .source(&query)
        .await?
        .ok_or_else(|| WebError::not_found("source", id))?;
    Ok(Json(source).into_response())
}

/// Authors.
pub async fn contributors<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    Ok(Json(state.catalog.contributors().await?))
}

/// One author.
pub async fn contributor<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    json_only(format, "author", id)?;
    let query = match resolve(&state.routes, Model::Contributor, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let author = state
        .catalog
        .contributor(&query)
        .await?
        .ok_or_else(|| WebError::not_found("author", id))?;
    Ok(Json(author).into_response())
}

// ---------------------------------------------------------------------------
// Examples
// ---------------------------------------------------------------------------

/// Example sentences.
pub async fn sentences<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<impl IntoResponse, WebError> {
    Ok(Json(state.catalog.sentences().await?))
}

/// One example sentence.
pub async fn sentence<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    Path(segment): Path<String>,
) -> Result<Response, WebError> {
    let (id, format) = split_ext(&segment)?;
    json_only(format, "example", id)?;
    let query = match resolve(&state.routes, Model::Sentence, id)? {
        Resolution::Lookup(query) => query,
        Resolution::MovedPermanently(url) => return Ok(moved_permanently(&url)),
    };
    let sentence = state
        .catalog
        .sentence(&query)
        .await?
        .ok_or_else(|| WebError::not_found("example", id))?;
    Ok(Json(sentence).into_response())
}

/// Fallback for unmatched paths.
pub async fn not_found(uri: Uri) -> WebError {
    WebError::NotFound(format!("no route for {}", uri.path()))
}
