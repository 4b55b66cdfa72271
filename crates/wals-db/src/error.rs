//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`], I/O and JSON errors with context about which operation failed.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A data dump could not be parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A data dump could not be read from disk.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
