//! The collection ↔ content relation and its ordered read model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use folio_core::types::{CollectionId, ContentId};

use crate::content::Content;

/// One row of the collection ↔ content relation.
///
/// For a fixed `collection_id` the set of `order_index` values is always
/// exactly `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CollectionContent {
    /// The owning collection.
    pub collection_id: CollectionId,
    /// The member content.
    pub content_id: ContentId,
    /// Position within the collection.
    pub order_index: i32,
    /// Whether the content is shown in this collection.
    pub visible: bool,
}

/// A content item at its position within one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedEntry {
    /// The content itself.
    pub content: Content,
    /// Position within the collection.
    pub order_index: i32,
    /// Collection-local visibility.
    pub visible: bool,
}

/// The full, ordered content of a collection after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedContentList {
    /// The collection the entries belong to.
    pub collection_id: CollectionId,
    /// The collection's content version after the operation.
    pub content_version: i64,
    /// Entries sorted by `order_index`.
    pub entries: Vec<OrderedEntry>,
}

impl OrderedContentList {
    /// Content ids in display order.
    pub fn content_ids(&self) -> Vec<ContentId> {
        self.entries.iter().map(|e| e.content.id).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
