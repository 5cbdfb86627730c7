//! Content repository implementation.
//!
//! All content variants share the single `contents` table; rows are read
//! as [`ContentRow`] and folded into [`Content`].

use chrono::Utc;
use sqlx::PgConnection;

use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_entity::content::{Content, ContentDraft, ContentRow};

use super::{db_error, raw_ids};

/// Repository for polymorphic content rows.
#[derive(Debug, Clone, Copy)]
pub struct ContentRepository;

impl ContentRepository {
    /// Load content rows by id. Unknown ids are skipped.
    pub async fn find_by_ids(conn: &mut PgConnection, ids: &[ContentId]) -> AppResult<Vec<Content>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ContentRow>(
            "SELECT * FROM contents WHERE id = ANY($1) ORDER BY id ASC",
        )
        .bind(raw_ids(ids))
        .fetch_all(conn)
        .await
        .map_err(|e| db_error("Failed to load content", e))?;

        rows.into_iter().map(Content::try_from).collect()
    }

    /// Create a new content row.
    pub async fn create(conn: &mut PgConnection, draft: &ContentDraft) -> AppResult<Content> {
        let row = ContentRow::from_content(&draft.clone().into_content(ContentId::new(0), Utc::now()));

        let created = sqlx::query_as::<_, ContentRow>(
            "INSERT INTO contents \
             (kind, title, description, preview_url, image_url, gif_url, width, height, iso, \
              aperture, shutter_speed, focal_length, capture_date, camera_id, lens_id, \
              film_type_id, location_id, black_and_white, rating, text_body, text_format, \
              referenced_collection_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, $21, $22) \
             RETURNING *",
        )
        .bind(row.kind)
        .bind(&row.title)
        .bind(&row.description)
        .bind(&row.preview_url)
        .bind(&row.image_url)
        .bind(&row.gif_url)
        .bind(row.width)
        .bind(row.height)
        .bind(row.iso)
        .bind(&row.aperture)
        .bind(&row.shutter_speed)
        .bind(&row.focal_length)
        .bind(row.capture_date)
        .bind(row.camera_id)
        .bind(row.lens_id)
        .bind(row.film_type_id)
        .bind(row.location_id)
        .bind(row.black_and_white)
        .bind(row.rating)
        .bind(&row.text_body)
        .bind(row.text_format)
        .bind(row.referenced_collection_id)
        .fetch_one(conn)
        .await
        .map_err(|e| db_error("Failed to create content", e))?;

        Content::try_from(created)
    }

    /// Persist every column of a modified content row.
    pub async fn update(conn: &mut PgConnection, content: &Content) -> AppResult<Content> {
        let row = ContentRow::from_content(content);

        let updated = sqlx::query_as::<_, ContentRow>(
            "UPDATE contents SET title = $2, description = $3, preview_url = $4, image_url = $5, \
             gif_url = $6, width = $7, height = $8, iso = $9, aperture = $10, \
             shutter_speed = $11, focal_length = $12, capture_date = $13, camera_id = $14, \
             lens_id = $15, film_type_id = $16, location_id = $17, black_and_white = $18, \
             rating = $19, text_body = $20, text_format = $21, \
             referenced_collection_id = $22, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(row.id)
        .bind(&row.title)
        .bind(&row.description)
        .bind(&row.preview_url)
        .bind(&row.image_url)
        .bind(&row.gif_url)
        .bind(row.width)
        .bind(row.height)
        .bind(row.iso)
        .bind(&row.aperture)
        .bind(&row.shutter_speed)
        .bind(&row.focal_length)
        .bind(row.capture_date)
        .bind(row.camera_id)
        .bind(row.lens_id)
        .bind(row.film_type_id)
        .bind(row.location_id)
        .bind(row.black_and_white)
        .bind(row.rating)
        .bind(&row.text_body)
        .bind(row.text_format)
        .bind(row.referenced_collection_id)
        .fetch_one(conn)
        .await
        .map_err(|e| db_error("Failed to update content", e))?;

        Content::try_from(updated)
    }

    /// Delete a content row. Fails while any collection still holds it.
    pub async fn delete(conn: &mut PgConnection, id: ContentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| db_error("Failed to delete content", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of collection-reference rows pointing at `collection`.
    pub async fn find_references_to(
        conn: &mut PgConnection,
        collection: CollectionId,
    ) -> AppResult<Vec<ContentId>> {
        sqlx::query_scalar::<_, ContentId>(
            "SELECT id FROM contents WHERE referenced_collection_id = $1 ORDER BY id ASC",
        )
        .bind(collection)
        .fetch_all(conn)
        .await
        .map_err(|e| db_error("Failed to find collection references", e))
    }
}
