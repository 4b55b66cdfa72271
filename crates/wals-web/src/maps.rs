//! `GeoJSON` map layers.
//!
//! Four maps exist: a feature map (one point per datapoint, drawn with the
//! value's icon) and language maps for families, countries and samples
//! (drawn with the genus icon). Each point links back to its resource.

use serde::Serialize;
use wals_types::{Datapoint, LanguageWithGenus, Parameter};

use crate::marker::{MarkerResolver, MarkerSubject};
use crate::routes::{RouteError, RouteName, RouteTable};

/// The kinds of map the application draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    /// Values of one feature.
    Feature,
    /// Languages of one family.
    Family,
    /// Languages spoken in one country.
    Country,
    /// Members of a language sample.
    Sample,
}

/// A `GeoJSON` `FeatureCollection` with layer metadata.
#[derive(Debug, Clone, Serialize)]
pub struct MapLayer {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Layer metadata.
    pub properties: LayerProperties,
    /// One point per language.
    pub features: Vec<MapPoint>,
}

/// Metadata of a map layer.
#[derive(Debug, Clone, Serialize)]
pub struct LayerProperties {
    /// Which map this is.
    pub map: MapKind,
    /// Layer name, e.g. the feature or family name.
    pub name: String,
}

/// A `GeoJSON` point feature.
#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Point geometry.
    pub geometry: Geometry,
    /// Popup and styling data.
    pub properties: PointProperties,
}

/// `GeoJSON` point geometry, `[longitude, latitude]`.
#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Longitude then latitude.
    pub coordinates: [f64; 2],
}

/// Properties attached to a point.
#[derive(Debug, Clone, Serialize)]
pub struct PointProperties {
    /// Language id.
    pub language: String,
    /// Language name.
    pub name: String,
    /// Link to the language, or to the value set on feature maps.
    pub url: String,
    /// Marker icon URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Value name, on feature maps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl MapLayer {
    fn new(map: MapKind, name: &str, features: Vec<MapPoint>) -> Self {
        Self {
            kind: "FeatureCollection",
            properties: LayerProperties {
                map,
                name: name.to_owned(),
            },
            features,
        }
    }
}

impl MapPoint {
    fn new(language: &LanguageWithGenus, url: String, icon: Option<String>, value: Option<String>) -> Self {
        Self {
            kind: "Feature",
            geometry: Geometry {
                kind: "Point",
                coordinates: [language.language.longitude, language.language.latitude],
            },
            properties: PointProperties {
                language: language.language.id.clone(),
                name: language.language.name.clone(),
                url,
                icon,
                value,
            },
        }
    }
}

/// The map of one feature's datapoints.
///
/// # Errors
///
/// Returns [`RouteError`] if a value set URL cannot be built.
pub fn feature_map(
    parameter: &Parameter,
    datapoints: &[Datapoint],
    markers: &MarkerResolver,
    routes: &RouteTable,
) -> Result<MapLayer, RouteError> {
    let features = datapoints
        .iter()
        .map(|dp| -> Result<MapPoint, RouteError> {
            let first = dp.valueset.values.first();
            let icon = first.and_then(|v| markers.marker_url(MarkerSubject::Value(v)));
            let value = first.map(|v| v.domain_element.name.clone());
            let url = routes.resource_url(RouteName::ValueSet, &dp.valueset.id)?;
            Ok(MapPoint::new(&dp.language, url, icon, value))
        })
        .collect::<Result<Vec<_>, RouteError>>()?;
    Ok(MapLayer::new(MapKind::Feature, &parameter.name, features))
}

/// A map of languages drawn with their genus icons.
///
/// # Errors
///
/// Returns [`RouteError`] if a language URL cannot be built.
pub fn language_map(
    map: MapKind,
    name: &str,
    languages: &[LanguageWithGenus],
    markers: &MarkerResolver,
    routes: &RouteTable,
) -> Result<MapLayer, RouteError> {
    let features = languages
        .iter()
        .map(|lang| -> Result<MapPoint, RouteError> {
            let icon = markers.marker_url(MarkerSubject::Language(lang));
            let url = routes.resource_url(RouteName::Language, &lang.language.id)?;
            Ok(MapPoint::new(lang, url, icon, None))
        })
        .collect::<Result<Vec<_>, RouteError>>()?;
    Ok(MapLayer::new(map, name, features))
}
