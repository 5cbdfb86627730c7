//! Collection repository implementation.

use sqlx::PgConnection;

use folio_core::result::AppResult;
use folio_core::types::CollectionId;
use folio_entity::collection::slug::slugify;
use folio_entity::collection::{Collection, NewCollection};

use super::db_error;

/// Repository for collection rows and their content version.
#[derive(Debug, Clone, Copy)]
pub struct CollectionRepository;

impl CollectionRepository {
    /// Find a collection by ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: CollectionId,
    ) -> AppResult<Option<Collection>> {
        sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("Failed to find collection", e))
    }

    /// Find a collection by slug.
    pub async fn find_by_slug(conn: &mut PgConnection, slug: &str) -> AppResult<Option<Collection>> {
        sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE slug = $1")
            .bind(slug)
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("Failed to find collection by slug", e))
    }

    /// List all collections.
    pub async fn find_all(conn: &mut PgConnection) -> AppResult<Vec<Collection>> {
        sqlx::query_as::<_, Collection>("SELECT * FROM collections ORDER BY id ASC")
            .fetch_all(conn)
            .await
            .map_err(|e| db_error("Failed to list collections", e))
    }

    /// Create a new collection.
    pub async fn create(conn: &mut PgConnection, data: &NewCollection) -> AppResult<Collection> {
        let slug = data.slug.clone().unwrap_or_else(|| slugify(&data.title));
        let display_mode = data
            .display_mode
            .unwrap_or_else(|| data.kind.default_display_mode());

        sqlx::query_as::<_, Collection>(
            "INSERT INTO collections \
             (kind, title, slug, description, collection_date, visible, display_mode, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.kind)
        .bind(data.title.trim())
        .bind(&slug)
        .bind(&data.description)
        .bind(data.collection_date)
        .bind(data.visible)
        .bind(display_mode)
        .bind(&data.password_hash)
        .fetch_one(conn)
        .await
        .map_err(|e| db_error(&format!("Failed to create collection '{slug}'"), e))
    }

    /// Update scalar fields, location and cover of a collection.
    pub async fn update(conn: &mut PgConnection, collection: &Collection) -> AppResult<Collection> {
        sqlx::query_as::<_, Collection>(
            "UPDATE collections SET title = $2, slug = $3, description = $4, location_id = $5, \
             collection_date = $6, visible = $7, display_mode = $8, password_hash = $9, \
             cover_content_id = $10, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(collection.id)
        .bind(&collection.title)
        .bind(&collection.slug)
        .bind(&collection.description)
        .bind(collection.location_id)
        .bind(collection.collection_date)
        .bind(collection.visible)
        .bind(collection.display_mode)
        .bind(&collection.password_hash)
        .bind(collection.cover_content_id)
        .fetch_one(conn)
        .await
        .map_err(|e| db_error("Failed to update collection", e))
    }

    /// Delete a collection. Relation rows and tags cascade.
    pub async fn delete(conn: &mut PgConnection, id: CollectionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| db_error("Failed to delete collection", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Check-and-increment the content version.
    ///
    /// Returns `None` when the stored version no longer equals `expected`
    /// (or the collection is gone).
    pub async fn bump_content_version(
        conn: &mut PgConnection,
        id: CollectionId,
        expected: i64,
    ) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE collections SET content_version = content_version + 1, updated_at = NOW() \
             WHERE id = $1 AND content_version = $2 RETURNING content_version",
        )
        .bind(id)
        .bind(expected)
        .fetch_optional(conn)
        .await
        .map_err(|e| db_error("Failed to bump collection content version", e))
    }
}
