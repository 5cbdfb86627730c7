//! PostgreSQL implementation of the [`ContentStore`] contract.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId, EntityId};
use folio_entity::catalog::{CatalogKind, NamedEntity, RelationKind};
use folio_entity::collection::{Collection, CollectionContent, NewCollection};
use folio_entity::content::{Content, ContentDraft};

use crate::repositories::{
    AssociationRepository, CatalogRepository, CollectionRepository, ContentRepository,
    MembershipRepository, db_error,
};
use crate::store::{ContentStore, StoreTransaction};

/// Content store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

/// An open PostgreSQL transaction. Rolled back by sqlx when dropped
/// uncommitted.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn find_collection(&mut self, id: CollectionId) -> AppResult<Option<Collection>> {
        CollectionRepository::find_by_id(&mut self.tx, id).await
    }

    async fn find_collection_by_slug(&mut self, slug: &str) -> AppResult<Option<Collection>> {
        CollectionRepository::find_by_slug(&mut self.tx, slug).await
    }

    async fn list_collections(&mut self) -> AppResult<Vec<Collection>> {
        CollectionRepository::find_all(&mut self.tx).await
    }

    async fn insert_collection(&mut self, data: &NewCollection) -> AppResult<Collection> {
        CollectionRepository::create(&mut self.tx, data).await
    }

    async fn update_collection(&mut self, collection: &Collection) -> AppResult<Collection> {
        CollectionRepository::update(&mut self.tx, collection).await
    }

    async fn delete_collection(&mut self, id: CollectionId) -> AppResult<bool> {
        CollectionRepository::delete(&mut self.tx, id).await
    }

    async fn bump_content_version(&mut self, id: CollectionId, expected: i64) -> AppResult<i64> {
        match CollectionRepository::bump_content_version(&mut self.tx, id, expected).await? {
            Some(version) => {
                debug!(collection_id = %id, version, "Content version advanced");
                Ok(version)
            }
            None => {
                warn!(collection_id = %id, expected, "Content version check failed");
                Err(AppError::conflict(format!(
                    "Collection {id} was modified concurrently (expected content version {expected})"
                )))
            }
        }
    }

    async fn find_contents(&mut self, ids: &[ContentId]) -> AppResult<Vec<Content>> {
        ContentRepository::find_by_ids(&mut self.tx, ids).await
    }

    async fn insert_content(&mut self, draft: &ContentDraft) -> AppResult<Content> {
        ContentRepository::create(&mut self.tx, draft).await
    }

    async fn update_content(&mut self, content: &Content) -> AppResult<Content> {
        ContentRepository::update(&mut self.tx, content).await
    }

    async fn delete_content(&mut self, id: ContentId) -> AppResult<bool> {
        ContentRepository::delete(&mut self.tx, id).await
    }

    async fn find_references_to(&mut self, collection: CollectionId) -> AppResult<Vec<ContentId>> {
        ContentRepository::find_references_to(&mut self.tx, collection).await
    }

    async fn list_entries(&mut self, collection: CollectionId) -> AppResult<Vec<CollectionContent>> {
        MembershipRepository::find_by_collection(&mut self.tx, collection).await
    }

    async fn list_memberships(&mut self, content: ContentId) -> AppResult<Vec<CollectionContent>> {
        MembershipRepository::find_by_content(&mut self.tx, content).await
    }

    async fn insert_entries(&mut self, rows: &[CollectionContent]) -> AppResult<()> {
        MembershipRepository::insert_many(&mut self.tx, rows).await
    }

    async fn delete_entries(
        &mut self,
        collection: CollectionId,
        ids: &[ContentId],
    ) -> AppResult<u64> {
        MembershipRepository::delete_many(&mut self.tx, collection, ids).await
    }

    async fn apply_positions(
        &mut self,
        collection: CollectionId,
        positions: &[(ContentId, i32)],
    ) -> AppResult<u64> {
        MembershipRepository::update_positions(&mut self.tx, collection, positions).await
    }

    async fn apply_visibility(
        &mut self,
        collection: CollectionId,
        changes: &[(ContentId, bool)],
    ) -> AppResult<u64> {
        MembershipRepository::update_visibility(&mut self.tx, collection, changes).await
    }

    async fn find_entities(
        &mut self,
        kind: CatalogKind,
        ids: &[EntityId],
    ) -> AppResult<Vec<NamedEntity>> {
        CatalogRepository::find_by_ids(&mut self.tx, kind, ids).await
    }

    async fn find_entity_by_name(
        &mut self,
        kind: CatalogKind,
        name: &str,
    ) -> AppResult<Option<NamedEntity>> {
        CatalogRepository::find_by_name(&mut self.tx, kind, name).await
    }

    async fn insert_entity(&mut self, kind: CatalogKind, name: &str) -> AppResult<NamedEntity> {
        CatalogRepository::upsert(&mut self.tx, kind, name).await
    }

    async fn list_entities(&mut self, kind: CatalogKind) -> AppResult<Vec<NamedEntity>> {
        CatalogRepository::find_all(&mut self.tx, kind).await
    }

    async fn list_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
    ) -> AppResult<BTreeSet<EntityId>> {
        AssociationRepository::find_ids(&mut self.tx, relation, parent).await
    }

    async fn insert_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()> {
        AssociationRepository::insert_many(&mut self.tx, relation, parent, ids).await
    }

    async fn delete_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()> {
        AssociationRepository::delete_many(&mut self.tx, relation, parent, ids).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| db_error("Failed to roll back transaction", e))
    }
}
