//! Error types for the server binary.
//!
//! [`AppError`] wraps every failure mode during startup and serving so
//! that `main` can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wals_web::ConfigError,
    },

    /// Connecting to the database, migrating it or loading the data dump
    /// failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: wals_db::DbError,
    },

    /// A route or legacy URL pattern did not compile.
    #[error("route error: {source}")]
    Route {
        /// The underlying route error.
        #[from]
        source: wals_web::RouteError,
    },

    /// The HTTP server failed to start or stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: wals_web::ServerError,
    },

    /// Neither `database.url` nor `data_file` is configured.
    #[error("no data source: set database.url (or DATABASE_URL) or data_file")]
    NoDataSource,
}
