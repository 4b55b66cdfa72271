//! Read-only data layer for the WALS web application.
//!
//! The web layer talks to the database exclusively through the
//! [`Catalog`] trait. Two implementations are provided:
//!
//! ```text
//! Catalog
//!     |
//!     +-- PgCatalog      (PostgreSQL via sqlx, production)
//!     +-- MemoryCatalog  (JSON data dump, tests and small snapshots)
//! ```
//!
//! # Modules
//!
//! - [`catalog`] -- The [`Catalog`] trait and shared ordering helpers
//! - [`query`] -- [`LookupQuery`] and eager-loading directives
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`pg_catalog`] -- [`Catalog`] over `PostgreSQL`
//! - [`memory`] -- [`Catalog`] over an in-memory [`DataDump`]
//! - [`error`] -- Shared error types

pub mod catalog;
pub mod error;
pub mod memory;
pub mod pg_catalog;
pub mod postgres;
pub mod query;

// Re-export primary types for convenience.
pub use catalog::{Catalog, CatalogResult};
pub use error::DbError;
pub use memory::{
    ContributionRecord, DataDump, MemoryCatalog, ReferenceRecord, ValueRecord, ValueSetRecord,
};
pub use pg_catalog::PgCatalog;
pub use postgres::{PostgresConfig, PostgresPool};
pub use query::{Eager, LookupQuery};
