//! Content discriminants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The variant of a content row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A photograph with capture metadata.
    Image,
    /// A block of prose.
    Text,
    /// An embedded animated gif.
    Gif,
    /// A pointer to another collection.
    CollectionReference,
}

impl ContentKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Gif => "gif",
            Self::CollectionReference => "collection_reference",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Markup format of a text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text_format", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Plain text.
    #[default]
    Plain,
    /// Markdown source.
    Markdown,
    /// Sanitized HTML.
    Html,
}
