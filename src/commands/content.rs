//! Content CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_core::types::ContentId;
use folio_entity::content::NewContent;
use folio_entity::update::{ContentAggregate, ContentUpdate};
use folio_service::ContentService;

/// Arguments for content commands
#[derive(Debug, Args)]
pub struct ContentArgs {
    /// Content subcommand
    #[command(subcommand)]
    pub command: ContentCommand,
}

/// Content subcommands
#[derive(Debug, Subcommand)]
pub enum ContentCommand {
    /// Show a content item with its tags, people and memberships
    Show {
        /// Content ID
        id: i64,
    },
    /// Create a content item from a JSON file ("-" for stdin)
    Create {
        /// Request file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Apply a partial update read from a JSON file ("-" for stdin)
    Update {
        /// Content ID
        id: i64,
        /// Request file
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Execute content commands
pub async fn execute(
    args: &ContentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let service = ContentService::new(store, config.engine.clone());

    let aggregate = match &args.command {
        ContentCommand::Show { id } => service.get_content(ContentId::new(*id)).await?,
        ContentCommand::Create { file } => {
            let new: NewContent = super::read_json(file)?;
            let created = service.create_content(new).await?;
            output::print_success(&format!("Created content {}", created.content.id));
            created
        }
        ContentCommand::Update { id, file } => {
            let update: ContentUpdate = super::read_json(file)?;
            service.update_content(ContentId::new(*id), update).await?
        }
    };

    print_aggregate(&aggregate, format);
    Ok(())
}

fn print_aggregate(aggregate: &ContentAggregate, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(aggregate),
        OutputFormat::Table => {
            let c = &aggregate.content;
            output::print_kv("ID", &c.id.to_string());
            output::print_kv("Kind", c.kind().as_str());
            output::print_kv("Title", c.title.as_deref().unwrap_or("-"));
            let tags: Vec<&str> = aggregate.tags.iter().map(|t| t.name.as_str()).collect();
            output::print_kv("Tags", &tags.join(", "));
            let people: Vec<&str> = aggregate.people.iter().map(|p| p.name.as_str()).collect();
            output::print_kv("People", &people.join(", "));
            for m in &aggregate.memberships {
                output::print_kv(
                    &format!("In collection {}", m.collection_id),
                    &format!(
                        "position {}{}",
                        m.order_index,
                        if m.visible { "" } else { " (hidden)" }
                    ),
                );
            }
        }
    }
}
