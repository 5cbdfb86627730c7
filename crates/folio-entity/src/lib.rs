//! # folio-entity
//!
//! Domain entity models for Folio. Every struct in this crate represents a
//! database table row, a domain value object, or a partial-update payload
//! consumed by the ordering and reconciliation engine. Database entities
//! additionally derive `sqlx::FromRow`.

pub mod catalog;
pub mod collection;
pub mod content;
pub mod update;

pub use catalog::{CatalogKind, NamedEntity, RelationKind};
pub use collection::{Collection, CollectionContent, CollectionKind, DisplayMode, NewCollection};
pub use content::{Content, ContentBody, ContentDraft, ContentKind, NewContent};
