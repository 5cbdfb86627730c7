//! Flat database row for the single-table `contents` layout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use folio_core::AppError;
use folio_core::types::{CollectionId, ContentId, EntityId};

use super::kind::{ContentKind, TextFormat};
use super::model::{
    CollectionReference, Content, ContentBody, GifAttributes, ImageAttributes, TextAttributes,
};

/// One row of the `contents` table. Variant columns are nullable and only
/// populated for the matching `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentRow {
    /// Content ID.
    pub id: ContentId,
    /// Variant discriminant.
    pub kind: ContentKind,
    /// Optional title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Thumbnail / preview URL.
    pub preview_url: Option<String>,
    /// Image URL (images).
    pub image_url: Option<String>,
    /// Gif URL (gifs).
    pub gif_url: Option<String>,
    /// Width in pixels (images and gifs).
    pub width: Option<i32>,
    /// Height in pixels (images and gifs).
    pub height: Option<i32>,
    /// Film speed (images).
    pub iso: Option<i32>,
    /// Aperture as shown (images).
    pub aperture: Option<String>,
    /// Shutter speed as shown (images).
    pub shutter_speed: Option<String>,
    /// Focal length as shown (images).
    pub focal_length: Option<String>,
    /// Capture date (images).
    pub capture_date: Option<NaiveDate>,
    /// Camera (images).
    pub camera_id: Option<EntityId>,
    /// Lens (images).
    pub lens_id: Option<EntityId>,
    /// Film stock (images).
    pub film_type_id: Option<EntityId>,
    /// Location (images).
    pub location_id: Option<EntityId>,
    /// Monochrome flag; false for non-images.
    pub black_and_white: bool,
    /// Star rating 0..=5 (images).
    pub rating: Option<i16>,
    /// Body (text).
    pub text_body: Option<String>,
    /// Body format (text).
    pub text_format: Option<TextFormat>,
    /// Target collection (collection references).
    pub referenced_collection_id: Option<CollectionId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for Content {
    type Error = AppError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let (id, kind) = (row.id, row.kind);
        let missing =
            |column: &str| AppError::internal(format!("Content {id} of kind {kind} has no {column}"));

        let body = match kind {
            ContentKind::Image => ContentBody::Image(ImageAttributes {
                image_url: row.image_url.ok_or_else(|| missing("image_url"))?,
                width: row.width,
                height: row.height,
                iso: row.iso,
                aperture: row.aperture,
                shutter_speed: row.shutter_speed,
                focal_length: row.focal_length,
                capture_date: row.capture_date,
                camera_id: row.camera_id,
                lens_id: row.lens_id,
                film_type_id: row.film_type_id,
                location_id: row.location_id,
                black_and_white: row.black_and_white,
                rating: row.rating,
            }),
            ContentKind::Text => ContentBody::Text(TextAttributes {
                body: row.text_body.ok_or_else(|| missing("text_body"))?,
                format: row.text_format.unwrap_or_default(),
            }),
            ContentKind::Gif => ContentBody::Gif(GifAttributes {
                gif_url: row.gif_url.ok_or_else(|| missing("gif_url"))?,
                width: row.width,
                height: row.height,
            }),
            ContentKind::CollectionReference => {
                ContentBody::CollectionReference(CollectionReference {
                    collection_id: row
                        .referenced_collection_id
                        .ok_or_else(|| missing("referenced_collection_id"))?,
                })
            }
        };

        Ok(Content {
            id,
            title: row.title,
            description: row.description,
            preview_url: row.preview_url,
            body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ContentRow {
    /// Flatten a content back into its row form.
    pub fn from_content(content: &Content) -> Self {
        let mut row = Self {
            id: content.id,
            kind: content.kind(),
            title: content.title.clone(),
            description: content.description.clone(),
            preview_url: content.preview_url.clone(),
            image_url: None,
            gif_url: None,
            width: None,
            height: None,
            iso: None,
            aperture: None,
            shutter_speed: None,
            focal_length: None,
            capture_date: None,
            camera_id: None,
            lens_id: None,
            film_type_id: None,
            location_id: None,
            black_and_white: false,
            rating: None,
            text_body: None,
            text_format: None,
            referenced_collection_id: None,
            created_at: content.created_at,
            updated_at: content.updated_at,
        };

        match &content.body {
            ContentBody::Image(image) => {
                row.image_url = Some(image.image_url.clone());
                row.width = image.width;
                row.height = image.height;
                row.iso = image.iso;
                row.aperture = image.aperture.clone();
                row.shutter_speed = image.shutter_speed.clone();
                row.focal_length = image.focal_length.clone();
                row.capture_date = image.capture_date;
                row.camera_id = image.camera_id;
                row.lens_id = image.lens_id;
                row.film_type_id = image.film_type_id;
                row.location_id = image.location_id;
                row.black_and_white = image.black_and_white;
                row.rating = image.rating;
            }
            ContentBody::Text(text) => {
                row.text_body = Some(text.body.clone());
                row.text_format = Some(text.format);
            }
            ContentBody::Gif(gif) => {
                row.gif_url = Some(gif.gif_url.clone());
                row.width = gif.width;
                row.height = gif.height;
            }
            ContentBody::CollectionReference(reference) => {
                row.referenced_collection_id = Some(reference.collection_id);
            }
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_content() -> Content {
        Content {
            id: ContentId::new(9),
            title: Some("Intro".to_string()),
            description: None,
            preview_url: None,
            body: ContentBody::Text(TextAttributes {
                body: "Hello".to_string(),
                format: TextFormat::Markdown,
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_for_text_only_sets_text_columns() {
        let row = ContentRow::from_content(&text_content());
        assert_eq!(row.kind, ContentKind::Text);
        assert_eq!(row.text_body.as_deref(), Some("Hello"));
        assert!(row.image_url.is_none());
        assert!(row.referenced_collection_id.is_none());
    }

    #[test]
    fn test_row_missing_variant_column_is_internal_error() {
        let mut row = ContentRow::from_content(&text_content());
        row.kind = ContentKind::Gif;
        let err = Content::try_from(row).unwrap_err();
        assert_eq!(err.kind, folio_core::error::ErrorKind::Internal);
        assert!(err.message.contains("gif_url"));
    }
}
