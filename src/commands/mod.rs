//! CLI command definitions and dispatch.

pub mod catalog;
pub mod collection;
pub mod config;
pub mod content;
pub mod migrate;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use crate::output::OutputFormat;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::{ContentStore, DatabasePool, PgContentStore};

/// Folio: collection content ordering and relationship reconciliation
#[derive(Debug, Parser)]
#[command(name = "folio", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(short, long, env = "FOLIO_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Collections and their ordered content
    Collection(collection::CollectionArgs),
    /// Content items
    Content(content::ContentArgs),
    /// Tags, people, cameras, lenses, locations and film types
    Catalog(catalog::CatalogArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load configuration from the base file and environment overlay
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Collection(args) => collection::execute(args, &config, self.format).await,
            Commands::Content(args) => content::execute(args, &config, self.format).await,
            Commands::Catalog(args) => catalog::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Helper: connect to PostgreSQL and wrap the pool in a content store
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn ContentStore>, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(Arc::new(PgContentStore::new(pool.into_pool())))
}

/// Helper: read a JSON request body from a file, or stdin when `path` is `-`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin())
            .map_err(|e| AppError::invalid_argument(format!("Failed to read stdin: {e}")))?
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            AppError::invalid_argument(format!("Failed to read {}: {e}", path.display()))
        })?
    };
    serde_json::from_str(&raw)
        .map_err(|e| AppError::invalid_argument(format!("Invalid request JSON: {e}")))
}
