//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod engine;
pub mod logging;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::database::DatabaseConfig;
pub use self::engine::EngineConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Prefix for environment-variable overrides (`FOLIO__DATABASE__URL`, ...).
const ENV_PREFIX: &str = "FOLIO";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay + env vars).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Request-size limits for the ordering and reconciliation engine.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and
    /// environment variables prefixed with `FOLIO__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration from an explicit base file, then apply the
    /// environment overlay and environment variables.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        debug!(base, env, "Loading configuration");

        let base = base.trim_end_matches(".toml");
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config_uses_defaults() {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                "[database]\nurl = \"postgres://localhost/folio\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .expect("build");
        let app: AppConfig = config.try_deserialize().expect("deserialize");

        assert_eq!(app.database.url, "postgres://localhost/folio");
        assert_eq!(app.database.max_connections, 20);
        assert_eq!(app.logging.level, "info");
        assert_eq!(app.engine.max_reorder_batch, 1000);
    }
}
