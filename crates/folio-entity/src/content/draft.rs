//! Content creation payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use folio_core::types::{CollectionId, ContentId};

use super::kind::ContentKind;
use super::model::{Content, ContentBody, GifAttributes, TextAttributes};
use crate::update::EntityRef;

/// A request to create a content item, possibly referencing catalog
/// entities by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    /// Optional title.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Thumbnail / preview URL.
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Variant-specific attributes.
    pub body: NewContentBody,
}

/// Variant payload of a [`NewContent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewContentBody {
    /// Image metadata for an already-uploaded image.
    Image(NewImage),
    /// A text block.
    Text(TextAttributes),
    /// A gif.
    Gif(GifAttributes),
    /// A pointer to another collection.
    CollectionReference {
        /// The referenced collection.
        collection_id: CollectionId,
    },
}

impl NewContentBody {
    /// The discriminant of the content this creates.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Image(_) => ContentKind::Image,
            Self::Text(_) => ContentKind::Text,
            Self::Gif(_) => ContentKind::Gif,
            Self::CollectionReference { .. } => ContentKind::CollectionReference,
        }
    }
}

/// Image metadata with unresolved catalog references.
///
/// Bounds mirror the `contents` column types so oversized values are
/// rejected before anything reaches the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewImage {
    /// URL of the already-uploaded image.
    #[validate(length(min = 1))]
    pub image_url: String,
    /// Width in pixels.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub width: Option<i32>,
    /// Height in pixels.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub height: Option<i32>,
    /// Film speed.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub iso: Option<i32>,
    /// Aperture as shown, e.g. `f/2.8`.
    #[serde(default)]
    #[validate(length(max = 20))]
    pub aperture: Option<String>,
    /// Shutter speed as shown, e.g. `1/250`.
    #[serde(default)]
    #[validate(length(max = 20))]
    pub shutter_speed: Option<String>,
    /// Focal length as shown, e.g. `50mm`.
    #[serde(default)]
    #[validate(length(max = 20))]
    pub focal_length: Option<String>,
    #[serde(default)]
    pub capture_date: Option<NaiveDate>,
    /// Camera, by id or by name.
    #[serde(default)]
    pub camera: Option<EntityRef>,
    /// Lens, by id or by name.
    #[serde(default)]
    pub lens: Option<EntityRef>,
    /// Film stock, by id or by name.
    #[serde(default)]
    pub film_type: Option<EntityRef>,
    /// Where the image was taken, by id or by name.
    #[serde(default)]
    pub location: Option<EntityRef>,
    #[serde(default)]
    pub black_and_white: bool,
    /// Star rating.
    #[serde(default)]
    #[validate(range(min = 0, max = 5))]
    pub rating: Option<i16>,
}

/// A content row ready to be inserted: every catalog reference resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    /// Optional title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Thumbnail / preview URL.
    pub preview_url: Option<String>,
    /// Variant-specific attributes.
    pub body: ContentBody,
}

impl ContentDraft {
    /// Materialize the draft with a store-assigned id and timestamp.
    pub fn into_content(self, id: ContentId, now: DateTime<Utc>) -> Content {
        Content {
            id,
            title: self.title,
            description: self.description,
            preview_url: self.preview_url,
            body: self.body,
            created_at: now,
            updated_at: now,
        }
    }

    /// A plain text draft.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            title: None,
            description: None,
            preview_url: None,
            body: ContentBody::Text(TextAttributes {
                body: body.into(),
                format: Default::default(),
            }),
        }
    }
}
