//! Redirects and tombstones for URLs of earlier WALS editions.
//!
//! [`LegacyTable`] is an ordered list of path patterns, each paired with
//! an action: a `301` to a URL built from the match, or a `410`. It runs
//! as middleware ahead of normal routing; the first matching rule wins and
//! paths that match no rule continue to the router untouched.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use wals_db::Catalog;

use crate::context::has_feature_suffix;
use crate::error::WebError;
use crate::routes::{MatchDict, Pattern, RouteError, RouteName, RouteTable};
use crate::state::AppState;

/// Builds a redirect target from the placeholder values of a match.
pub type RedirectTarget = fn(&MatchDict, &RouteTable) -> Result<String, RouteError>;

/// What to do with a request whose path matches a legacy rule.
#[derive(Debug, Clone, Copy)]
pub enum LegacyAction {
    /// Answer `301 Moved Permanently` to the built URL.
    Redirect(RedirectTarget),
    /// Answer `410 Gone`.
    Gone,
}

/// The response a legacy rule decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyOutcome {
    /// `301` with this `Location`.
    MovedPermanently(String),
    /// `410`.
    Gone,
}

#[derive(Debug, Clone)]
struct LegacyRule {
    pattern: Pattern,
    action: LegacyAction,
}

/// Ordered legacy URL rules.
#[derive(Debug, Clone, Default)]
pub struct LegacyTable {
    rules: Vec<LegacyRule>,
}

impl LegacyTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a permanent redirect rule.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if `pattern` does not compile.
    pub fn add_301(&mut self, pattern: &str, target: RedirectTarget) -> Result<(), RouteError> {
        self.push(pattern, LegacyAction::Redirect(target))
    }

    /// Append a gone rule.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if `pattern` does not compile.
    pub fn add_410(&mut self, pattern: &str) -> Result<(), RouteError> {
        self.push(pattern, LegacyAction::Gone)
    }

    fn push(&mut self, pattern: &str, action: LegacyAction) -> Result<(), RouteError> {
        self.rules.push(LegacyRule {
            pattern: Pattern::parse(pattern)?,
            action,
        });
        Ok(())
    }

    /// The rules for URLs of the 2008 and 2011 editions.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if a pattern does not compile.
    pub fn wals() -> Result<Self, RouteError> {
        let mut table = Self::new();

        table.add_301("/index", |_, routes| routes.route_url(RouteName::Dataset, &[]))?;
        table.add_301("/.{ext}", |m, routes| {
            routes.route_url(RouteName::DatasetAlt, &[("ext", param(m, "ext"))])
        })?;
        table.add_301("/datapoint/{fid}/wals_code_{lid}", datapoint_target)?;
        table.add_301(r"/feature/description/{id:[0-9]+}", |m, routes| {
            routes.resource_url(RouteName::Contribution, param(m, "id"))
        })?;
        for pattern in ["/languoid/lect", "/languoid/family", "/languoid/genus"] {
            table.add_301(pattern, |_, routes| routes.route_url(RouteName::Languages, &[]))?;
        }
        for pattern in ["/refdb/", "/refdb/record", "/refdb/record/", "/refdb/search"] {
            table.add_301(pattern, |_, routes| routes.route_url(RouteName::Sources, &[]))?;
        }
        table.add_410("/languoid/osd.{ext}")?;
        table.add_410("/experimental/{id}")?;

        Ok(table)
    }

    /// Number of rules.
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule matching `path` and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if a redirect target cannot be built.
    pub fn resolve(&self, path: &str, routes: &RouteTable) -> Result<Option<LegacyOutcome>, RouteError> {
        for rule in &self.rules {
            let Some(matched) = rule.pattern.matches(path) else {
                continue;
            };
            let outcome = match rule.action {
                LegacyAction::Redirect(target) => {
                    LegacyOutcome::MovedPermanently(target(&matched, routes)?)
                }
                LegacyAction::Gone => LegacyOutcome::Gone,
            };
            tracing::debug!(path, rule = rule.pattern.as_str(), ?outcome, "legacy url");
            return Ok(Some(outcome));
        }
        Ok(None)
    }
}

/// `/datapoint/1/wals_code_eng` names feature `1A`: bare chapter numbers
/// get the `A` suffix before the value set id is built.
fn datapoint_target(m: &MatchDict, routes: &RouteTable) -> Result<String, RouteError> {
    let fid = param(m, "fid");
    let lid = param(m, "lid");
    let id = if has_feature_suffix(fid) {
        format!("{fid}-{lid}")
    } else {
        format!("{fid}A-{lid}")
    };
    routes.resource_url(RouteName::ValueSet, &id)
}

fn param<'a>(m: &'a MatchDict, name: &str) -> &'a str {
    m.get(name).map_or("", String::as_str)
}

/// A `301 Moved Permanently` response.
pub fn moved_permanently(location: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location.to_owned())],
    )
        .into_response()
}

/// Middleware applying [`AppState::legacy`] before routing.
///
/// Rules see the percent-decoded path. Paths that do not decode to UTF-8
/// are left to the router.
pub async fn intercept<C: Catalog>(
    State(state): State<Arc<AppState<C>>>,
    request: Request,
    next: Next,
) -> Response {
    let outcome = urlencoding::decode(request.uri().path())
        .map_or(Ok(None), |path| state.legacy.resolve(&path, &state.routes));
    match outcome {
        Ok(Some(LegacyOutcome::MovedPermanently(location))) => moved_permanently(&location),
        Ok(Some(LegacyOutcome::Gone)) => {
            WebError::Gone(format!("{} is no longer available", request.uri().path()))
                .into_response()
        }
        Ok(None) => next.run(request).await,
        Err(e) => WebError::from(e).into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> Option<LegacyOutcome> {
        let routes = RouteTable::new("").unwrap();
        LegacyTable::wals().unwrap().resolve(path, &routes).unwrap()
    }

    fn redirect(to: &str) -> Option<LegacyOutcome> {
        Some(LegacyOutcome::MovedPermanently(to.to_owned()))
    }

    #[test]
    fn index_and_dotted_root_go_to_dataset() {
        assert_eq!(resolve("/index"), redirect("/"));
        assert_eq!(resolve("/.rdf"), redirect("/void.rdf"));
        assert_eq!(resolve("/.json"), redirect("/void.json"));
    }

    #[test]
    fn datapoint_appends_suffix_to_chapter_number() {
        assert_eq!(resolve("/datapoint/1/wals_code_eng"), redirect("/valuesets/1A-eng"));
        assert_eq!(resolve("/datapoint/81/wals_code_ger"), redirect("/valuesets/81A-ger"));
    }

    #[test]
    fn datapoint_keeps_existing_suffix() {
        assert_eq!(resolve("/datapoint/1B/wals_code_eng"), redirect("/valuesets/1B-eng"));
    }

    #[test]
    fn feature_description_requires_digits() {
        assert_eq!(resolve("/feature/description/81"), redirect("/chapter/81"));
        assert_eq!(resolve("/feature/description/81A"), None);
    }

    #[test]
    fn languoid_and_refdb_indexes() {
        for path in ["/languoid/lect", "/languoid/family", "/languoid/genus"] {
            assert_eq!(resolve(path), redirect("/languoid"), "{path}");
        }
        for path in ["/refdb/", "/refdb/record", "/refdb/record/", "/refdb/search"] {
            assert_eq!(resolve(path), redirect("/refdb"), "{path}");
        }
    }

    #[test]
    fn retired_endpoints_are_gone() {
        assert_eq!(resolve("/languoid/osd.xml"), Some(LegacyOutcome::Gone));
        assert_eq!(resolve("/experimental/anything"), Some(LegacyOutcome::Gone));
    }

    #[test]
    fn current_urls_fall_through() {
        for path in ["/", "/feature/1A", "/languoid", "/refdb", "/languoid/lect/wals_code_eng", "/void.json"] {
            assert_eq!(resolve(path), None, "{path}");
        }
    }

    #[test]
    fn first_match_wins() {
        let routes = RouteTable::new("").unwrap();
        let mut table = LegacyTable::new();
        table.add_301("/x/{id}", |_, _| Ok(String::from("/first"))).unwrap();
        table.add_410("/x/{id}").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve("/x/1", &routes).unwrap(),
            Some(LegacyOutcome::MovedPermanently(String::from("/first")))
        );
    }

    #[test]
    fn redirects_use_public_url() {
        let routes = RouteTable::new("https://wals.info").unwrap();
        let outcome = LegacyTable::wals().unwrap().resolve("/index", &routes).unwrap();
        assert_eq!(
            outcome,
            Some(LegacyOutcome::MovedPermanently(String::from("https://wals.info/")))
        );
    }
}
