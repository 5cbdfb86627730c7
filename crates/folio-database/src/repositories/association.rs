//! Repository for the many-to-many join tables.

use std::collections::BTreeSet;

use sqlx::PgConnection;

use folio_core::result::AppResult;
use folio_core::types::EntityId;
use folio_entity::catalog::RelationKind;

use super::{db_error, raw_ids};

/// Repository for `content_tags`, `content_people` and `collection_tags`.
#[derive(Debug, Clone, Copy)]
pub struct AssociationRepository;

impl AssociationRepository {
    /// Entity ids associated with `parent`.
    pub async fn find_ids(
        conn: &mut PgConnection,
        relation: RelationKind,
        parent: i64,
    ) -> AppResult<BTreeSet<EntityId>> {
        let sql = format!(
            "SELECT {entity} FROM {table} WHERE {parent_col} = $1",
            entity = relation.entity_column(),
            table = relation.table(),
            parent_col = relation.parent_column(),
        );
        let ids = sqlx::query_scalar::<_, EntityId>(&sql)
            .bind(parent)
            .fetch_all(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to list {relation}"), e))?;

        Ok(ids.into_iter().collect())
    }

    /// Insert association rows, ignoring rows that already exist.
    pub async fn insert_many(
        conn: &mut PgConnection,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {table} ({parent_col}, {entity}) \
             SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
            table = relation.table(),
            parent_col = relation.parent_column(),
            entity = relation.entity_column(),
        );
        sqlx::query(&sql)
            .bind(parent)
            .bind(raw_ids(ids))
            .execute(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to insert {relation}"), e))?;

        Ok(())
    }

    /// Delete association rows.
    pub async fn delete_many(
        conn: &mut PgConnection,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "DELETE FROM {table} WHERE {parent_col} = $1 AND {entity} = ANY($2)",
            table = relation.table(),
            parent_col = relation.parent_column(),
            entity = relation.entity_column(),
        );
        sqlx::query(&sql)
            .bind(parent)
            .bind(raw_ids(ids))
            .execute(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to delete {relation}"), e))?;

        Ok(())
    }
}
