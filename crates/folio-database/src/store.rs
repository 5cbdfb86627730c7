//! The persistence contract the ordering and reconciliation engine is
//! written against.
//!
//! Every mutating engine operation opens exactly one [`StoreTransaction`],
//! performs all of its reads and writes through it, and commits once.
//! Dropping a transaction without committing rolls it back.

use std::collections::BTreeSet;

use async_trait::async_trait;

use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId, EntityId};
use folio_entity::catalog::{CatalogKind, NamedEntity, RelationKind};
use folio_entity::collection::{Collection, CollectionContent, NewCollection};
use folio_entity::content::{Content, ContentDraft};

/// A durable store of collections, content, the ordered relation between
/// them, and catalog entities.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Open a new transaction.
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;
}

/// One unit of work against a [`ContentStore`].
///
/// Reads observe the transaction's own writes. Nothing is visible to other
/// transactions until [`StoreTransaction::commit`] succeeds.
#[async_trait]
pub trait StoreTransaction: Send {
    // ── Collections ──────────────────────────────────────────────

    /// Find a collection by id.
    async fn find_collection(&mut self, id: CollectionId) -> AppResult<Option<Collection>>;

    /// Find a collection by slug.
    async fn find_collection_by_slug(&mut self, slug: &str) -> AppResult<Option<Collection>>;

    /// List every collection, ordered by id.
    async fn list_collections(&mut self) -> AppResult<Vec<Collection>>;

    /// Insert a collection. The slug falls back to one derived from the
    /// title. A duplicate slug is a conflict.
    async fn insert_collection(&mut self, data: &NewCollection) -> AppResult<Collection>;

    /// Persist the scalar fields, location and cover of a loaded collection.
    /// The content version is never written here.
    async fn update_collection(&mut self, collection: &Collection) -> AppResult<Collection>;

    /// Delete a collection and, by cascade, its relation rows and tags.
    /// Returns `false` when the collection did not exist.
    async fn delete_collection(&mut self, id: CollectionId) -> AppResult<bool>;

    /// Check-and-increment the collection's content version.
    ///
    /// Succeeds only while the stored version still equals `expected`, and
    /// returns the new version. Otherwise the collection was modified
    /// concurrently and the call fails with a conflict.
    async fn bump_content_version(&mut self, id: CollectionId, expected: i64) -> AppResult<i64>;

    // ── Content ──────────────────────────────────────────────────

    /// Load the given content items. Unknown ids are skipped.
    async fn find_contents(&mut self, ids: &[ContentId]) -> AppResult<Vec<Content>>;

    /// Insert a new content item.
    async fn insert_content(&mut self, draft: &ContentDraft) -> AppResult<Content>;

    /// Persist a modified content item.
    async fn update_content(&mut self, content: &Content) -> AppResult<Content>;

    /// Delete a content item that no collection holds any more.
    async fn delete_content(&mut self, id: ContentId) -> AppResult<bool>;

    /// Ids of collection-reference content pointing at `collection`.
    async fn find_references_to(&mut self, collection: CollectionId) -> AppResult<Vec<ContentId>>;

    // ── Collection ↔ content relation ────────────────────────────

    /// Relation rows of a collection, sorted by `order_index`.
    async fn list_entries(&mut self, collection: CollectionId) -> AppResult<Vec<CollectionContent>>;

    /// Every relation row of a content item, sorted by collection id.
    async fn list_memberships(&mut self, content: ContentId) -> AppResult<Vec<CollectionContent>>;

    /// Insert relation rows in one statement.
    async fn insert_entries(&mut self, rows: &[CollectionContent]) -> AppResult<()>;

    /// Delete the relation rows of `ids` within `collection`.
    async fn delete_entries(&mut self, collection: CollectionId, ids: &[ContentId])
    -> AppResult<u64>;

    /// Write new order indices in one batched statement. Transient
    /// duplicates between rows are allowed until commit.
    async fn apply_positions(
        &mut self,
        collection: CollectionId,
        positions: &[(ContentId, i32)],
    ) -> AppResult<u64>;

    /// Write collection-local visibility flags in one batched statement.
    async fn apply_visibility(
        &mut self,
        collection: CollectionId,
        changes: &[(ContentId, bool)],
    ) -> AppResult<u64>;

    // ── Catalog ──────────────────────────────────────────────────

    /// Load the given entities of one kind. Unknown ids are skipped.
    async fn find_entities(
        &mut self,
        kind: CatalogKind,
        ids: &[EntityId],
    ) -> AppResult<Vec<NamedEntity>>;

    /// Find an entity by name, case-insensitively.
    async fn find_entity_by_name(
        &mut self,
        kind: CatalogKind,
        name: &str,
    ) -> AppResult<Option<NamedEntity>>;

    /// Insert an entity, or return the existing one whose name matches
    /// case-insensitively.
    async fn insert_entity(&mut self, kind: CatalogKind, name: &str) -> AppResult<NamedEntity>;

    /// Every entity of one kind, sorted by name.
    async fn list_entities(&mut self, kind: CatalogKind) -> AppResult<Vec<NamedEntity>>;

    // ── Many-to-many associations ────────────────────────────────

    /// Entity ids currently associated with `parent` through `relation`.
    async fn list_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
    ) -> AppResult<BTreeSet<EntityId>>;

    /// Add association rows. Already-present rows are ignored.
    async fn insert_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()>;

    /// Remove association rows.
    async fn delete_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()>;

    // ── Lifecycle ────────────────────────────────────────────────

    /// Make every write of this transaction durable and visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write of this transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
