//! Repository for the ordered collection ↔ content relation.

use sqlx::PgConnection;

use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_entity::collection::CollectionContent;

use super::{db_error, raw_ids};

/// Repository for `collection_content` rows.
///
/// Multi-row writes are single `UNNEST` statements keyed by content id, so a
/// reorder of any size is one round-trip. The `(collection_id, order_index)`
/// uniqueness constraint is deferred to commit.
#[derive(Debug, Clone, Copy)]
pub struct MembershipRepository;

impl MembershipRepository {
    /// Relation rows of a collection in display order.
    pub async fn find_by_collection(
        conn: &mut PgConnection,
        collection: CollectionId,
    ) -> AppResult<Vec<CollectionContent>> {
        sqlx::query_as::<_, CollectionContent>(
            "SELECT collection_id, content_id, order_index, visible FROM collection_content \
             WHERE collection_id = $1 ORDER BY order_index ASC, content_id ASC",
        )
        .bind(collection)
        .fetch_all(conn)
        .await
        .map_err(|e| db_error("Failed to list collection content", e))
    }

    /// Every collection a content item belongs to.
    pub async fn find_by_content(
        conn: &mut PgConnection,
        content: ContentId,
    ) -> AppResult<Vec<CollectionContent>> {
        sqlx::query_as::<_, CollectionContent>(
            "SELECT collection_id, content_id, order_index, visible FROM collection_content \
             WHERE content_id = $1 ORDER BY collection_id ASC",
        )
        .bind(content)
        .fetch_all(conn)
        .await
        .map_err(|e| db_error("Failed to list content memberships", e))
    }

    /// Insert relation rows.
    pub async fn insert_many(conn: &mut PgConnection, rows: &[CollectionContent]) -> AppResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let collection_ids: Vec<i64> = rows.iter().map(|r| r.collection_id.get()).collect();
        let content_ids: Vec<i64> = rows.iter().map(|r| r.content_id.get()).collect();
        let indices: Vec<i32> = rows.iter().map(|r| r.order_index).collect();
        let visible: Vec<bool> = rows.iter().map(|r| r.visible).collect();

        sqlx::query(
            "INSERT INTO collection_content (collection_id, content_id, order_index, visible) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::int[], $4::bool[])",
        )
        .bind(collection_ids)
        .bind(content_ids)
        .bind(indices)
        .bind(visible)
        .execute(conn)
        .await
        .map_err(|e| db_error("Failed to add content to collection", e))?;

        Ok(())
    }

    /// Delete relation rows of `ids` within one collection.
    pub async fn delete_many(
        conn: &mut PgConnection,
        collection: CollectionId,
        ids: &[ContentId],
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM collection_content WHERE collection_id = $1 AND content_id = ANY($2)",
        )
        .bind(collection)
        .bind(raw_ids(ids))
        .execute(conn)
        .await
        .map_err(|e| db_error("Failed to remove content from collection", e))?;

        Ok(result.rows_affected())
    }

    /// Batched order-index update.
    pub async fn update_positions(
        conn: &mut PgConnection,
        collection: CollectionId,
        positions: &[(ContentId, i32)],
    ) -> AppResult<u64> {
        if positions.is_empty() {
            return Ok(0);
        }

        let (ids, indices): (Vec<i64>, Vec<i32>) =
            positions.iter().map(|&(id, index)| (id.get(), index)).unzip();

        let result = sqlx::query(
            "UPDATE collection_content AS cc SET order_index = v.order_index \
             FROM UNNEST($2::bigint[], $3::int[]) AS v(content_id, order_index) \
             WHERE cc.collection_id = $1 AND cc.content_id = v.content_id",
        )
        .bind(collection)
        .bind(ids)
        .bind(indices)
        .execute(conn)
        .await
        .map_err(|e| db_error("Failed to reorder collection content", e))?;

        Ok(result.rows_affected())
    }

    /// Batched visibility update.
    pub async fn update_visibility(
        conn: &mut PgConnection,
        collection: CollectionId,
        changes: &[(ContentId, bool)],
    ) -> AppResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let (ids, flags): (Vec<i64>, Vec<bool>) =
            changes.iter().map(|&(id, visible)| (id.get(), visible)).unzip();

        let result = sqlx::query(
            "UPDATE collection_content AS cc SET visible = v.visible \
             FROM UNNEST($2::bigint[], $3::bool[]) AS v(content_id, visible) \
             WHERE cc.collection_id = $1 AND cc.content_id = v.content_id",
        )
        .bind(collection)
        .bind(ids)
        .bind(flags)
        .execute(conn)
        .await
        .map_err(|e| db_error("Failed to update content visibility", e))?;

        Ok(result.rows_affected())
    }
}
