//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    output::print_kv("database.url", &shown.database.url);
                    output::print_kv(
                        "database.max_connections",
                        &shown.database.max_connections.to_string(),
                    );
                    output::print_kv(
                        "database.statement_timeout_ms",
                        &shown.database.statement_timeout_ms.to_string(),
                    );
                    output::print_kv("logging.level", &shown.logging.level);
                    output::print_kv("logging.format", &shown.logging.format);
                    output::print_kv(
                        "engine.max_reorder_batch",
                        &shown.engine.max_reorder_batch.to_string(),
                    );
                    output::print_kv(
                        "engine.max_create_names",
                        &shown.engine.max_create_names.to_string(),
                    );
                    output::print_kv(
                        "engine.max_new_content",
                        &shown.engine.max_new_content.to_string(),
                    );
                }
            }
        }
    }
    Ok(())
}
