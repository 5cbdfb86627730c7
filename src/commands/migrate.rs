//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::DatabasePool;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database is reachable
    Ping,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            folio_database::migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Ping => {
            if pool.health_check().await? {
                output::print_success("Database is reachable.");
            } else {
                output::print_warning("Database did not answer the health check.");
            }
        }
    }

    pool.close().await;
    Ok(())
}
