//! Catalog CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_entity::catalog::CatalogKind;
use folio_service::CatalogService;

/// Arguments for catalog commands
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog subcommand
    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Catalog subcommands
#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List entities of one kind
    List {
        /// tag, person, camera, lens, location or film_type
        kind: String,
    },
    /// Find an entity by name (ignoring case) or create it
    Add {
        /// tag, person, camera, lens, location or film_type
        kind: String,
        /// Entity name
        name: String,
    },
}

/// Catalog entity display row
#[derive(Debug, Serialize, Tabled)]
struct EntityRow {
    /// Entity ID
    id: i64,
    /// Name
    name: String,
    /// Created at
    created_at: String,
}

/// Execute catalog commands
pub async fn execute(
    args: &CatalogArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let service = CatalogService::new(store);

    match &args.command {
        CatalogCommand::List { kind } => {
            let kind: CatalogKind = kind.parse()?;
            let rows: Vec<EntityRow> = service
                .list_catalog(kind)
                .await?
                .into_iter()
                .map(|e| EntityRow {
                    id: e.id.get(),
                    name: e.name,
                    created_at: e.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        CatalogCommand::Add { kind, name } => {
            let kind: CatalogKind = kind.parse()?;
            let entity = service.find_or_create(kind, name).await?;
            output::print_success(&format!("{kind} {} is '{}'", entity.id, entity.name));
        }
    }

    Ok(())
}
