//! Column definitions for the tabular listings.
//!
//! Four listings are served as data tables: chapters, features, languages
//! and datapoints. A table is `{"name", "columns", "rows"}`, where each row
//! holds one JSON cell per column.

use serde::Serialize;
use serde_json::{json, Value as Cell};
use wals_types::{Contribution, Datapoint, LanguageWithGenus, Parameter};

use crate::marker::{MarkerResolver, MarkerSubject};
use crate::routes::{RouteError, RouteName, RouteTable};

/// A table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Machine name.
    pub name: &'static str,
    /// Header label.
    pub title: &'static str,
}

const fn col(name: &'static str, title: &'static str) -> Column {
    Column { name, title }
}

/// What cells need to build links and icons.
#[derive(Debug, Clone, Copy)]
pub struct TableContext<'a> {
    /// For resource links.
    pub routes: &'a RouteTable,
    /// For marker icons.
    pub markers: &'a MarkerResolver,
}

/// A listing rendered as a data table.
pub trait DataTable {
    /// The record type of one row.
    type Row;

    /// Table name, as registered for the listing route.
    const NAME: &'static str;

    /// Columns in display order.
    const COLUMNS: &'static [Column];

    /// One cell per column for `row`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if a link cannot be built.
    fn cells(row: &Self::Row, ctx: &TableContext<'_>) -> Result<Vec<Cell>, RouteError>;
}

/// A rendered table.
#[derive(Debug, Clone, Serialize)]
pub struct TablePayload {
    /// Table name.
    pub name: &'static str,
    /// Column headers.
    pub columns: &'static [Column],
    /// Cell rows.
    pub rows: Vec<Vec<Cell>>,
}

/// Render `rows` with table `T`.
///
/// # Errors
///
/// Returns [`RouteError`] if a link cannot be built.
pub fn render<T: DataTable>(rows: &[T::Row], ctx: &TableContext<'_>) -> Result<TablePayload, RouteError> {
    Ok(TablePayload {
        name: T::NAME,
        columns: T::COLUMNS,
        rows: rows
            .iter()
            .map(|row| T::cells(row, ctx))
            .collect::<Result<Vec<_>, RouteError>>()?,
    })
}

/// Chapters listing.
#[derive(Debug, Clone, Copy)]
pub struct Chapters;

impl DataTable for Chapters {
    type Row = Contribution;
    const NAME: &'static str = "chapters";
    const COLUMNS: &'static [Column] = &[
        col("number", "Chapter"),
        col("name", "Title"),
        col("authors", "Authors"),
        col("url", "Link"),
    ];

    fn cells(row: &Contribution, ctx: &TableContext<'_>) -> Result<Vec<Cell>, RouteError> {
        let authors = row
            .contributors
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" and ");
        Ok(vec![
            json!(row.id),
            json!(row.name),
            json!(authors),
            json!(ctx.routes.resource_url(RouteName::Contribution, &row.id)?),
        ])
    }
}

/// Features listing.
#[derive(Debug, Clone, Copy)]
pub struct Features;

impl DataTable for Features {
    type Row = Parameter;
    const NAME: &'static str = "features";
    const COLUMNS: &'static [Column] = &[
        col("id", "ID"),
        col("name", "Feature"),
        col("chapter", "Chapter"),
        col("categories", "Values"),
        col("url", "Link"),
    ];

    fn cells(row: &Parameter, ctx: &TableContext<'_>) -> Result<Vec<Cell>, RouteError> {
        Ok(vec![
            json!(row.id),
            json!(row.name),
            json!(ctx.routes.resource_url(RouteName::Contribution, &row.chapter_id)?),
            json!(row.domain.len()),
            json!(ctx.routes.resource_url(RouteName::Parameter, &row.id)?),
        ])
    }
}

/// Languages listing.
#[derive(Debug, Clone, Copy)]
pub struct Languages;

impl DataTable for Languages {
    type Row = LanguageWithGenus;
    const NAME: &'static str = "languages";
    const COLUMNS: &'static [Column] = &[
        col("name", "Name"),
        col("id", "WALS code"),
        col("iso_codes", "ISO 639-3"),
        col("genus", "Genus"),
        col("family", "Family"),
        col("latitude", "Latitude"),
        col("longitude", "Longitude"),
        col("icon", "Marker"),
        col("url", "Link"),
    ];

    fn cells(row: &LanguageWithGenus, ctx: &TableContext<'_>) -> Result<Vec<Cell>, RouteError> {
        let lang = &row.language;
        Ok(vec![
            json!(lang.name),
            json!(lang.id),
            json!(lang.iso_codes.join(", ")),
            json!(row.genus.name),
            json!(row.family.name),
            json!(lang.latitude),
            json!(lang.longitude),
            json!(ctx.markers.marker_url(MarkerSubject::Language(row))),
            json!(ctx.routes.resource_url(RouteName::Language, &lang.id)?),
        ])
    }
}

/// Datapoints listing.
#[derive(Debug, Clone, Copy)]
pub struct Datapoints;

impl DataTable for Datapoints {
    type Row = Datapoint;
    const NAME: &'static str = "datapoints";
    const COLUMNS: &'static [Column] = &[
        col("language", "Language"),
        col("feature", "Feature"),
        col("value", "Value"),
        col("icon", "Marker"),
        col("url", "Link"),
    ];

    fn cells(row: &Datapoint, ctx: &TableContext<'_>) -> Result<Vec<Cell>, RouteError> {
        let first = row.valueset.values.first();
        Ok(vec![
            json!(row.language.language.name),
            json!(row.valueset.parameter_id),
            json!(first.map(|v| v.domain_element.name.as_str())),
            json!(first.and_then(|v| ctx.markers.marker_url(MarkerSubject::Value(v)))),
            json!(ctx.routes.resource_url(RouteName::ValueSet, &row.valueset.id)?),
        ])
    }
}
