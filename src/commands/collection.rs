//! Collection management CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_core::types::{CollectionId, ContentId};
use folio_entity::collection::{Collection, CollectionKind, NewCollection, OrderedContentList};
use folio_entity::update::{
    CollectionAggregate, CollectionUpdate, ContentRef, ReorderItem, VisibilityChange,
};
use folio_service::{CollectionService, IntegrityReport};

/// Arguments for collection commands
#[derive(Debug, Args)]
pub struct CollectionArgs {
    /// Collection subcommand
    #[command(subcommand)]
    pub command: CollectionCommand,
}

/// Collection subcommands
#[derive(Debug, Subcommand)]
pub enum CollectionCommand {
    /// List all collections
    List,
    /// Show a collection and its ordered content
    Show {
        /// Collection ID or slug
        collection: String,
    },
    /// Create an empty collection
    Create {
        /// Title
        #[arg(short, long)]
        title: String,
        /// Kind: blog, gallery, portfolio, art_gallery, client_gallery, home
        #[arg(short, long, default_value = "gallery")]
        kind: String,
        /// Slug (derived from the title when omitted)
        #[arg(short, long)]
        slug: Option<String>,
    },
    /// Move content to explicit positions; other content shifts around it
    Reorder {
        /// Collection ID
        id: i64,
        /// Moves as CONTENT_ID:NEW_INDEX
        #[arg(required = true)]
        moves: Vec<String>,
    },
    /// Add existing content
    Add {
        /// Collection ID
        id: i64,
        /// Content IDs, in order
        #[arg(required = true)]
        content: Vec<i64>,
        /// Insert as a block at this position instead of appending
        #[arg(long)]
        at: Option<i32>,
    },
    /// Remove content (the content itself is kept)
    Remove {
        /// Collection ID
        id: i64,
        /// Content IDs
        #[arg(required = true)]
        content: Vec<i64>,
    },
    /// Show or hide content within the collection
    Visibility {
        /// Collection ID
        id: i64,
        /// Content IDs
        #[arg(required = true)]
        content: Vec<i64>,
        /// Hide instead of show
        #[arg(long)]
        hide: bool,
    },
    /// Apply a partial update read from a JSON file ("-" for stdin)
    Update {
        /// Collection ID
        id: i64,
        /// Request file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Report gaps and duplicates in the order indices
    Check {
        /// Collection ID
        id: i64,
    },
    /// Renumber the order indices to 0..n
    Repair {
        /// Collection ID
        id: i64,
    },
    /// Delete a collection
    Delete {
        /// Collection ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Collection display row
#[derive(Debug, Serialize, Tabled)]
struct CollectionRow {
    /// Collection ID
    id: i64,
    /// Kind
    kind: String,
    /// Title
    title: String,
    /// Slug
    slug: String,
    /// Public
    visible: bool,
    /// Content version
    version: i64,
    /// Updated at
    updated_at: String,
}

impl From<&Collection> for CollectionRow {
    fn from(c: &Collection) -> Self {
        Self {
            id: c.id.get(),
            kind: c.kind.to_string(),
            title: c.title.clone(),
            slug: c.slug.clone(),
            visible: c.visible,
            version: c.content_version,
            updated_at: c.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Ordered content display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Position
    index: i32,
    /// Content ID
    content_id: i64,
    /// Kind
    kind: String,
    /// Title
    title: String,
    /// Shown in this collection
    visible: bool,
}

/// Execute collection commands
pub async fn execute(
    args: &CollectionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let service = CollectionService::new(store, config.engine.clone());

    match &args.command {
        CollectionCommand::List => {
            let collections = service.list_collections().await?;
            let rows: Vec<CollectionRow> = collections.iter().map(CollectionRow::from).collect();
            output::print_list(&rows, format);
        }
        CollectionCommand::Show { collection } => {
            let aggregate = match collection.parse::<i64>() {
                Ok(id) => service.get_collection(CollectionId::new(id)).await?,
                Err(_) => service.get_collection_by_slug(collection).await?,
            };
            print_aggregate(&aggregate, format);
        }
        CollectionCommand::Create { title, kind, slug } => {
            let created = service
                .create_collection(NewCollection {
                    kind: kind.parse::<CollectionKind>()?,
                    title: title.clone(),
                    slug: slug.clone(),
                    description: None,
                    collection_date: None,
                    visible: true,
                    display_mode: None,
                    password_hash: None,
                })
                .await?;
            output::print_success(&format!(
                "Created collection {} ({})",
                created.collection.id, created.collection.slug
            ));
        }
        CollectionCommand::Reorder { id, moves } => {
            let items = moves
                .iter()
                .map(|m| parse_move(m))
                .collect::<Result<Vec<_>, _>>()?;
            let list = service
                .reorder_content(CollectionId::new(*id), &items)
                .await?;
            print_entries(&list, format);
        }
        CollectionCommand::Add { id, content, at } => {
            let refs: Vec<ContentRef> = content
                .iter()
                .map(|c| ContentRef::Existing(ContentId::new(*c)))
                .collect();
            let list = service
                .add_content(CollectionId::new(*id), &refs, *at)
                .await?;
            print_entries(&list, format);
        }
        CollectionCommand::Remove { id, content } => {
            let ids: Vec<ContentId> = content.iter().copied().map(ContentId::new).collect();
            let list = service
                .remove_content(CollectionId::new(*id), &ids)
                .await?;
            print_entries(&list, format);
        }
        CollectionCommand::Visibility { id, content, hide } => {
            let changes: Vec<VisibilityChange> = content
                .iter()
                .map(|c| VisibilityChange {
                    content_id: ContentRef::Existing(ContentId::new(*c)),
                    visible: !hide,
                })
                .collect();
            let list = service
                .set_visibility(CollectionId::new(*id), &changes)
                .await?;
            print_entries(&list, format);
        }
        CollectionCommand::Update { id, file } => {
            let update: CollectionUpdate = super::read_json(file)?;
            let aggregate = service
                .update_collection(CollectionId::new(*id), update)
                .await?;
            print_aggregate(&aggregate, format);
        }
        CollectionCommand::Check { id } => {
            let report = service.check_integrity(CollectionId::new(*id)).await?;
            print_report(&report, format);
        }
        CollectionCommand::Repair { id } => {
            let report = service.repair(CollectionId::new(*id)).await?;
            print_report(&report, format);
        }
        CollectionCommand::Delete { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete collection {id}? Content is kept; references to it are removed."
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            service.delete_collection(CollectionId::new(*id)).await?;
            output::print_success(&format!("Collection {id} deleted."));
        }
    }

    Ok(())
}

/// Parse `CONTENT_ID:NEW_INDEX`.
fn parse_move(raw: &str) -> Result<ReorderItem, AppError> {
    let invalid = || AppError::invalid_argument(format!("Invalid move '{raw}': expected ID:INDEX"));
    let (content, index) = raw.split_once(':').ok_or_else(invalid)?;
    let content: i64 = content.trim().parse().map_err(|_| invalid())?;
    let index: i32 = index.trim().parse().map_err(|_| invalid())?;
    Ok(ReorderItem::new(ContentId::new(content), index))
}

fn print_aggregate(aggregate: &CollectionAggregate, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(aggregate),
        OutputFormat::Table => {
            let c = &aggregate.collection;
            output::print_kv("ID", &c.id.to_string());
            output::print_kv("Title", &c.title);
            output::print_kv("Slug", &c.slug);
            output::print_kv("Kind", c.kind.as_str());
            output::print_kv("Display mode", c.display_mode.as_str());
            output::print_kv(
                "Location",
                aggregate.location.as_ref().map_or("-", |l| l.name.as_str()),
            );
            let tags: Vec<&str> = aggregate.tags.iter().map(|t| t.name.as_str()).collect();
            output::print_kv("Tags", &tags.join(", "));
            output::print_kv(
                "Cover",
                &c.cover_content_id.map_or("-".to_string(), |id| id.to_string()),
            );
            output::print_kv("Content version", &c.content_version.to_string());
            println!();
            print_entries(&aggregate.content, format);
        }
    }
}

fn print_entries(list: &OrderedContentList, format: OutputFormat) {
    let rows: Vec<EntryRow> = list
        .entries
        .iter()
        .map(|e| EntryRow {
            index: e.order_index,
            content_id: e.content.id.get(),
            kind: e.content.kind().to_string(),
            title: e.content.title.clone().unwrap_or_default(),
            visible: e.visible,
        })
        .collect();
    output::print_list(&rows, format);
}

fn print_report(report: &IntegrityReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Table => {
            output::print_kv("Collection", &report.collection_id.to_string());
            output::print_kv("Entries", &report.entries.to_string());
            output::print_kv("Content version", &report.content_version.to_string());
            if report.is_consistent() {
                output::print_success("Order indices are dense.");
            } else {
                output::print_kv("Gaps", &format!("{:?}", report.gaps));
                output::print_kv("Duplicates", &format!("{:?}", report.duplicates));
                output::print_kv("Out of range", &format!("{:?}", report.out_of_range));
                output::print_warning("Order indices are inconsistent; run `collection repair`.");
            }
        }
    }
}
