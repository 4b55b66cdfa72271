//! WALS web application binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `wals-config.yaml` (path overridable with
//!    `WALS_CONFIG`), applying environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Open the catalog: `PostgreSQL` when a database URL is configured,
//!    otherwise the JSON data dump
//! 4. Build the application state and serve until `Ctrl-C`

mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;
use wals_db::{Catalog, MemoryCatalog, PgCatalog, PostgresConfig, PostgresPool};
use wals_web::{start_server, AppConfig, AppState, LoggingConfig};

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "wals-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.logging);

    info!(
        site = config.site.name,
        host = config.server.host,
        port = config.server.port,
        "wals-server starting"
    );

    if let Some(url) = config.database.url.clone() {
        let pg_config = PostgresConfig::new(&url)
            .with_max_connections(config.database.max_connections)
            .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs));
        let pool = PostgresPool::connect(&pg_config).await.map_err(AppError::from)?;
        if config.database.run_migrations {
            pool.run_migrations().await.map_err(AppError::from)?;
            info!("Migrations applied");
        }
        let result = serve(&config, PgCatalog::new(&pool)).await;
        pool.close().await;
        result?;
    } else if let Some(path) = &config.data_file {
        let catalog = MemoryCatalog::from_json_file(path).map_err(AppError::from)?;
        serve(&config, catalog).await?;
    } else {
        return Err(AppError::NoDataSource.into());
    }

    info!("wals-server exiting");
    Ok(())
}

async fn serve<C: Catalog>(config: &AppConfig, catalog: C) -> Result<(), AppError> {
    let state = AppState::new(catalog, config.site.clone())?;
    start_server(&config.server, Arc::new(state)).await?;
    Ok(())
}

fn load_config() -> Result<AppConfig, AppError> {
    let path = std::env::var_os("WALS_CONFIG").map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        Ok(AppConfig::from_file(&path)?)
    } else {
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
