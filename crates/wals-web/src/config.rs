//! Configuration loading for the WALS web application.
//!
//! The canonical configuration lives in `wals-config.yaml` at the project
//! root. Every section and field has a default, so an empty file (or no
//! file at all) yields a runnable configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::server::ServerConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level application configuration, mirroring `wals-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerConfig,

    /// Site metadata and URL prefixes.
    #[serde(default)]
    pub site: SiteConfig,

    /// `PostgreSQL` connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// JSON data dump served when no database URL is configured.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DATABASE_URL` overrides `database.url`
    /// - `WALS_HOST` overrides `server.host`
    /// - `WALS_PORT` overrides `server.port` (ignored if not a port number)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override connection settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.database.url = Some(val);
        }
        if let Ok(val) = std::env::var("WALS_HOST") {
            self.server.host = val;
        }
        if let Some(port) = std::env::var("WALS_PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }
}

/// Site metadata and URL prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    /// Dataset name shown on the home page.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Publisher named in dataset metadata.
    #[serde(default = "default_publisher")]
    pub publisher: String,

    /// License URL named in dataset metadata.
    #[serde(default = "default_license")]
    pub license: String,

    /// Contact address published in OAI-PMH `Identify` responses.
    #[serde(default = "default_contact")]
    pub contact: String,

    /// Prefix for generated URLs, e.g. `https://wals.info`. Empty means
    /// host-relative URLs.
    #[serde(default)]
    pub public_url: String,

    /// Prefix under which static assets (marker icons) are served.
    #[serde(default = "default_static_url")]
    pub static_url: String,

    /// Host name of the news blog.
    #[serde(default = "default_blog_host")]
    pub blog_host: String,

    /// Number of value sets listed on the changes page.
    #[serde(default = "default_changes_limit")]
    pub changes_limit: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            publisher: default_publisher(),
            license: default_license(),
            contact: default_contact(),
            public_url: String::new(),
            static_url: default_static_url(),
            blog_host: default_blog_host(),
            changes_limit: default_changes_limit(),
        }
    }
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. When absent the catalog is loaded from `data_file`.
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Apply embedded migrations at startup.
    #[serde(default)]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            run_migrations: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_site_name() -> String {
    String::from("WALS Online")
}

fn default_publisher() -> String {
    String::from("Max Planck Institute for Evolutionary Anthropology")
}

fn default_license() -> String {
    String::from("https://creativecommons.org/licenses/by/4.0/")
}

fn default_contact() -> String {
    String::from("info@wals.info")
}

fn default_static_url() -> String {
    String::from("/static")
}

fn default_blog_host() -> String {
    String::from("blog.wals.info")
}

const fn default_changes_limit() -> u32 {
    50
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    String::from("info")
}
