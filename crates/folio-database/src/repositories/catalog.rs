//! Catalog entity repository.
//!
//! The six catalog tables share one shape, so queries are built from
//! [`CatalogKind::table`]. Table names come from a closed enum and are never
//! caller input.

use sqlx::PgConnection;

use folio_core::result::AppResult;
use folio_core::types::EntityId;
use folio_entity::catalog::{CatalogKind, NamedEntity};

use super::{db_error, raw_ids};

/// Repository for named catalog entities.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRepository;

impl CatalogRepository {
    /// Load entities by id. Unknown ids are skipped.
    pub async fn find_by_ids(
        conn: &mut PgConnection,
        kind: CatalogKind,
        ids: &[EntityId],
    ) -> AppResult<Vec<NamedEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM {} WHERE id = ANY($1) ORDER BY id ASC",
            kind.table()
        );
        sqlx::query_as::<_, NamedEntity>(&sql)
            .bind(raw_ids(ids))
            .fetch_all(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to load {kind} entities"), e))
    }

    /// Find an entity by name, ignoring case.
    pub async fn find_by_name(
        conn: &mut PgConnection,
        kind: CatalogKind,
        name: &str,
    ) -> AppResult<Option<NamedEntity>> {
        let sql = format!(
            "SELECT * FROM {} WHERE LOWER(name) = LOWER($1)",
            kind.table()
        );
        sqlx::query_as::<_, NamedEntity>(&sql)
            .bind(name.trim())
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to find {kind} by name"), e))
    }

    /// Insert an entity or return the one already holding that name.
    ///
    /// A concurrent insert of the same name blocks on the unique index and
    /// then returns the winner's row.
    pub async fn upsert(
        conn: &mut PgConnection,
        kind: CatalogKind,
        name: &str,
    ) -> AppResult<NamedEntity> {
        let table = kind.table();
        let sql = format!(
            "INSERT INTO {table} (name) VALUES ($1) \
             ON CONFLICT ((LOWER(name))) DO UPDATE SET name = {table}.name \
             RETURNING *"
        );
        sqlx::query_as::<_, NamedEntity>(&sql)
            .bind(name.trim())
            .fetch_one(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to create {kind} '{name}'"), e))
    }

    /// List all entities of one kind.
    pub async fn find_all(conn: &mut PgConnection, kind: CatalogKind) -> AppResult<Vec<NamedEntity>> {
        let sql = format!("SELECT * FROM {} ORDER BY LOWER(name) ASC", kind.table());
        sqlx::query_as::<_, NamedEntity>(&sql)
            .fetch_all(conn)
            .await
            .map_err(|e| db_error(&format!("Failed to list {kind} entities"), e))
    }
}
