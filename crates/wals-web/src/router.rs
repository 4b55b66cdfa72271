//! Axum router construction.
//!
//! Assembles every route into a single [`Router`]. The legacy URL
//! middleware is layered inside the trace layer so that redirects and
//! `410` answers are traced like any other response.

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use wals_db::Catalog;

use crate::handlers;
use crate::legacy;
use crate::pages;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// Paths mirror the named routes in [`crate::routes::ROUTE_PATTERNS`].
/// Detail segments are captured whole and parsed by the handlers, since
/// a route like `/languoid/lect/wals_code_{id}` mixes literal text and a
/// placeholder within one segment. `/{file}` serves `/void.{ext}` and the sitemaps.
pub fn build_router<C: Catalog>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        // Site
        .route("/", get(pages::dataset::<C>))
        .route("/{file}", get(pages::root_file::<C>))
        .route("/about/legal", get(pages::legal::<C>))
        .route("/about/credits", get(pages::credits::<C>))
        .route("/changes", get(pages::changes::<C>))
        // Languages
        .route("/languoid", get(handlers::languages::<C>))
        .route("/languoid/lect/{code}", get(handlers::language::<C>))
        .route("/languoid/family/{id}", get(handlers::family::<C>))
        .route("/languoid/samples/{count}", get(handlers::sample::<C>))
        .route("/languoid/genealogy", get(pages::genealogy::<C>))
        .route("/languoid/oai", get(pages::olac::<C>))
        .route("/country", get(handlers::countries::<C>))
        .route("/country/{id}", get(handlers::country::<C>))
        // Features and datapoints
        .route("/feature", get(handlers::parameters::<C>))
        .route("/feature/{id}", get(handlers::parameter::<C>))
        .route("/feature-info/{id}", get(handlers::feature_info::<C>))
        .route("/values", get(handlers::values::<C>))
        .route("/valuesets/{id}", get(handlers::valueset::<C>))
        // Chapters and bibliography
        .route("/chapter", get(handlers::contributions::<C>))
        .route("/chapter/{id}", get(handlers::contribution::<C>))
        .route("/refdb", get(handlers::sources::<C>))
        .route("/refdb/record/{id}", get(handlers::source::<C>))
        .route("/refdb_oai", get(pages::olac_source::<C>))
        .route("/author", get(handlers::contributors::<C>))
        .route("/author/{id}", get(handlers::contributor::<C>))
        .route("/example", get(handlers::sentences::<C>))
        .route("/example/{id}", get(handlers::sentence::<C>))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            legacy::intercept::<C>,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
