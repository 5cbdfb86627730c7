//! Content entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{CollectionId, ContentId, EntityId};

use super::kind::{ContentKind, TextFormat};

/// A polymorphic unit of material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Unique content identifier.
    pub id: ContentId,
    /// Optional title.
    pub title: Option<String>,
    /// Optional description or caption.
    pub description: Option<String>,
    /// Thumbnail / preview URL.
    pub preview_url: Option<String>,
    /// Variant-specific attributes.
    pub body: ContentBody,
    /// When the content was created.
    pub created_at: DateTime<Utc>,
    /// When the content was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// The content discriminant.
    pub fn kind(&self) -> ContentKind {
        self.body.kind()
    }

    /// The collection this content points at, for collection references.
    pub fn referenced_collection(&self) -> Option<CollectionId> {
        match &self.body {
            ContentBody::CollectionReference(r) => Some(r.collection_id),
            _ => None,
        }
    }
}

/// Variant-specific content attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBody {
    /// A photograph.
    Image(ImageAttributes),
    /// A text block.
    Text(TextAttributes),
    /// An animated gif.
    Gif(GifAttributes),
    /// A nested collection.
    CollectionReference(CollectionReference),
}

impl ContentBody {
    /// The discriminant for this body.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Image(_) => ContentKind::Image,
            Self::Text(_) => ContentKind::Text,
            Self::Gif(_) => ContentKind::Gif,
            Self::CollectionReference(_) => ContentKind::CollectionReference,
        }
    }
}

/// Photograph attributes and capture metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAttributes {
    /// Full-resolution image URL.
    pub image_url: String,
    /// Width in pixels.
    pub width: Option<i32>,
    /// Height in pixels.
    pub height: Option<i32>,
    /// ISO sensitivity.
    pub iso: Option<i32>,
    /// Aperture, e.g. `f/2.8`.
    pub aperture: Option<String>,
    /// Shutter speed, e.g. `1/250`.
    pub shutter_speed: Option<String>,
    /// Focal length, e.g. `35mm`.
    pub focal_length: Option<String>,
    /// When the photograph was taken.
    pub capture_date: Option<NaiveDate>,
    /// Camera catalog entity.
    pub camera_id: Option<EntityId>,
    /// Lens catalog entity.
    pub lens_id: Option<EntityId>,
    /// Film stock catalog entity.
    pub film_type_id: Option<EntityId>,
    /// Location catalog entity.
    pub location_id: Option<EntityId>,
    /// Monochrome flag.
    pub black_and_white: bool,
    /// Star rating, 0..=5.
    pub rating: Option<i16>,
}

/// Text block attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAttributes {
    /// The text itself.
    pub body: String,
    /// Markup format of `body`.
    #[serde(default)]
    pub format: TextFormat,
}

/// Gif attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GifAttributes {
    /// Gif URL.
    pub gif_url: String,
    /// Width in pixels.
    pub width: Option<i32>,
    /// Height in pixels.
    pub height: Option<i32>,
}

/// A pointer to another collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReference {
    /// The referenced collection.
    pub collection_id: CollectionId,
}
