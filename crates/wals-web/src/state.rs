//! Shared application state.
//!
//! [`AppState`] is built once at startup and shared read-only across
//! requests behind an `Arc`.

use wals_db::Catalog;

use crate::config::SiteConfig;
use crate::legacy::LegacyTable;
use crate::marker::MarkerResolver;
use crate::menu::{wals_menu, Blog, MenuItem};
use crate::routes::{RouteError, RouteTable};

/// Everything handlers need to answer a request.
#[derive(Debug)]
pub struct AppState<C> {
    /// Data access.
    pub catalog: C,
    /// Named routes for building URLs.
    pub routes: RouteTable,
    /// Legacy URL rules, applied before routing.
    pub legacy: LegacyTable,
    /// Navigation menu.
    pub menu: Vec<MenuItem>,
    /// Marker icon URLs.
    pub markers: MarkerResolver,
    /// Site metadata.
    pub site: SiteConfig,
}

impl<C: Catalog> AppState<C> {
    /// Assemble the state for `catalog` and `site`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if a route or legacy pattern does not
    /// compile.
    pub fn new(catalog: C, site: SiteConfig) -> Result<Self, RouteError> {
        let routes = RouteTable::new(&site.public_url)?;
        let menu = wals_menu(&routes, &Blog::new(&site.blog_host))?;
        Ok(Self {
            catalog,
            legacy: LegacyTable::wals()?,
            markers: MarkerResolver::new(&site.static_url),
            routes,
            menu,
            site,
        })
    }

    /// The table context used to render listings.
    pub const fn table_context(&self) -> crate::datatables::TableContext<'_> {
        crate::datatables::TableContext {
            routes: &self.routes,
            markers: &self.markers,
        }
    }
}
