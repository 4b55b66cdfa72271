//! Site navigation.

use serde::Serialize;

use crate::routes::{RouteError, RouteName, RouteTable};

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Stable key (`dataset`, `parameters`, ..., `blog`).
    pub key: &'static str,
    /// Label shown to readers.
    pub label: &'static str,
    /// Link target.
    pub url: String,
}

/// The WALS news blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    host: String,
}

impl Blog {
    /// Blog served from `host` (e.g. `blog.wals.info`).
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_matches('/').to_owned(),
        }
    }

    /// URL of a page on the blog.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.host, path.trim_start_matches('/'))
    }
}

const ROUTE_ENTRIES: &[(RouteName, &str)] = &[
    (RouteName::Dataset, "Home"),
    (RouteName::Parameters, "Features"),
    (RouteName::Contributions, "Chapters"),
    (RouteName::Languages, "Languages"),
    (RouteName::Sources, "References"),
    (RouteName::Contributors, "Authors"),
];

/// The navigation menu, in display order, ending with the news blog.
///
/// # Errors
///
/// Returns [`RouteError`] if a route URL cannot be built.
pub fn wals_menu(routes: &RouteTable, blog: &Blog) -> Result<Vec<MenuItem>, RouteError> {
    let mut items = ROUTE_ENTRIES
        .iter()
        .map(|(name, label)| -> Result<MenuItem, RouteError> {
            Ok(MenuItem {
                key: name.as_str(),
                label: *label,
                url: routes.route_url(*name, &[])?,
            })
        })
        .collect::<Result<Vec<_>, RouteError>>()?;
    items.push(MenuItem {
        key: "blog",
        label: "Newsblog",
        url: blog.url("category/news/"),
    });
    Ok(items)
}
