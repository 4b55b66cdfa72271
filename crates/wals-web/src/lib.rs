//! HTTP layer for the WALS web application.
//!
//! This crate maps URLs onto the WALS database:
//!
//! - **Route table** ([`routes`]) naming every resource URL and building
//!   canonical links
//! - **Legacy URLs** ([`legacy`]) answering `301`/`410` for paths of the
//!   2008 and 2011 editions before normal routing
//! - **Context resolution** ([`context`]) refining lookups (eager loads)
//!   or redirecting bare chapter numbers from feature URLs
//! - **Language samples** ([`sample`]) served as virtual resources
//! - **Map markers** ([`marker`]) and `GeoJSON` layers ([`maps`])
//! - **Listings** ([`datatables`]) and the navigation [`menu`]
//! - **Sitemaps** ([`sitemap`]) for chapters, features, references,
//!   examples and datapoints
//!
//! # Request flow
//!
//! ```text
//! request -> TraceLayer -> legacy::intercept --(match)--> 301 / 410
//!                                |
//!                                v
//!                         axum route -> handler -> resolve_context --> 301
//!                                                        |
//!                                                        v
//!                                                     Catalog -> JSON / GeoJSON / HTML
//! ```

pub mod config;
pub mod context;
pub mod datatables;
pub mod error;
pub mod handlers;
pub mod legacy;
pub mod maps;
pub mod marker;
pub mod menu;
pub mod pages;
pub mod router;
pub mod routes;
pub mod sample;
pub mod server;
pub mod sitemap;
pub mod state;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError, DatabaseConfig, LoggingConfig, SiteConfig};
pub use error::WebError;
pub use router::build_router;
pub use routes::{RouteError, RouteName, RouteTable};
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
