//! Reorder and visibility instructions.

use serde::{Deserialize, Serialize};

use super::reference::ContentRef;

/// Move one content item to an explicit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    /// The content to move; may be a placeholder for new content.
    pub content_id: ContentRef,
    /// Requested zero-based position.
    pub new_index: i32,
}

impl ReorderItem {
    /// Build a reorder item.
    pub fn new(content_id: impl Into<ContentRef>, new_index: i32) -> Self {
        Self {
            content_id: content_id.into(),
            new_index,
        }
    }
}

/// Change the collection-local visibility of one content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityChange {
    /// The content; may be a placeholder for new content.
    pub content_id: ContentRef,
    /// New visibility.
    pub visible: bool,
}
