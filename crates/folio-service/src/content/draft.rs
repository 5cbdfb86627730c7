//! Turning creation payloads into storable drafts.

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_database::StoreTransaction;
use folio_entity::catalog::CatalogKind;
use folio_entity::content::{
    CollectionReference, ContentBody, ContentDraft, ImageAttributes, NewContent, NewContentBody,
};
use validator::Validate;

use crate::catalog::EntityResolver;

/// `None` for blank strings, the trimmed value otherwise.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate `new` and resolve every catalog reference it carries.
///
/// Camera, lens, film type and location references reuse or create catalog
/// entities on `tx`. A collection reference must point at an existing
/// collection.
pub(crate) async fn resolve_draft(
    tx: &mut dyn StoreTransaction,
    resolver: &EntityResolver,
    new: &NewContent,
) -> AppResult<ContentDraft> {
    let body = match &new.body {
        NewContentBody::Image(image) => {
            image.validate()?;
            let image_url = required(&image.image_url, "image_url")?;
            ContentBody::Image(ImageAttributes {
                image_url,
                width: image.width,
                height: image.height,
                iso: image.iso,
                aperture: non_blank(image.aperture.as_deref()),
                shutter_speed: non_blank(image.shutter_speed.as_deref()),
                focal_length: non_blank(image.focal_length.as_deref()),
                capture_date: image.capture_date,
                camera_id: resolver
                    .apply_ref(tx, CatalogKind::Camera, image.camera.as_ref(), None)
                    .await?,
                lens_id: resolver
                    .apply_ref(tx, CatalogKind::Lens, image.lens.as_ref(), None)
                    .await?,
                film_type_id: resolver
                    .apply_ref(tx, CatalogKind::FilmType, image.film_type.as_ref(), None)
                    .await?,
                location_id: resolver
                    .apply_ref(tx, CatalogKind::Location, image.location.as_ref(), None)
                    .await?,
                black_and_white: image.black_and_white,
                rating: image.rating,
            })
        }
        NewContentBody::Text(text) => {
            if text.body.trim().is_empty() {
                return Err(AppError::invalid_argument("Text content body cannot be blank"));
            }
            ContentBody::Text(text.clone())
        }
        NewContentBody::Gif(gif) => {
            let mut gif = gif.clone();
            gif.gif_url = required(&gif.gif_url, "gif_url")?;
            ContentBody::Gif(gif)
        }
        NewContentBody::CollectionReference { collection_id } => {
            if tx.find_collection(*collection_id).await?.is_none() {
                return Err(AppError::not_found(format!(
                    "Referenced collection {collection_id} not found"
                )));
            }
            ContentBody::CollectionReference(CollectionReference {
                collection_id: *collection_id,
            })
        }
    };

    Ok(ContentDraft {
        title: non_blank(new.title.as_deref()),
        description: non_blank(new.description.as_deref()),
        preview_url: non_blank(new.preview_url.as_deref()),
        body,
    })
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
