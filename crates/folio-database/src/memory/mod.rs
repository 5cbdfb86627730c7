//! In-memory implementation of the [`ContentStore`] contract.
//!
//! Used by the service and scenario tests. It enforces the same constraints
//! as the PostgreSQL schema
//! (unique slugs and names, unique order indices checked at commit) and the
//! same optimistic content-version protocol.

mod state;
mod transaction;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use folio_core::result::AppResult;

use crate::store::{ContentStore, StoreTransaction};

pub use transaction::MemoryStoreTransaction;

use state::MemoryState;

/// State shared by every transaction of one store.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: Mutex<MemoryState>,
    next_id: AtomicI64,
    entry_writes: AtomicU64,
    association_writes: AtomicU64,
}

/// Content store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    shared: Arc<Shared>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collection ↔ content rows inserted, deleted or updated by
    /// committed transactions.
    pub fn entry_writes(&self) -> u64 {
        self.shared.entry_writes.load(Ordering::SeqCst)
    }

    /// Number of association rows inserted or deleted by committed
    /// transactions.
    pub fn association_writes(&self) -> u64 {
        self.shared.association_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let snapshot = self.shared.state.lock().await.clone();
        Ok(Box::new(MemoryStoreTransaction::new(
            Arc::clone(&self.shared),
            snapshot,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use folio_core::error::ErrorKind;
    use folio_core::types::{CollectionId, ContentId};
    use folio_entity::catalog::{CatalogKind, RelationKind};
    use folio_entity::collection::{CollectionContent, CollectionKind, NewCollection};
    use folio_entity::content::ContentDraft;

    use super::*;

    fn gallery(title: &str) -> NewCollection {
        NewCollection {
            kind: CollectionKind::Gallery,
            title: title.to_string(),
            slug: None,
            description: None,
            collection_date: None,
            visible: true,
            display_mode: None,
            password_hash: None,
        }
    }

    fn row(collection: CollectionId, content: ContentId, order_index: i32) -> CollectionContent {
        CollectionContent {
            collection_id: collection,
            content_id: content,
            order_index,
            visible: true,
        }
    }

    async fn seeded(store: &MemoryContentStore, items: usize) -> (CollectionId, Vec<ContentId>) {
        let mut tx = store.begin().await.unwrap();
        let collection = tx.insert_collection(&gallery("Kyoto")).await.unwrap();
        let mut ids = Vec::new();
        for i in 0..items {
            let content = tx
                .insert_content(&ContentDraft::text(format!("block {i}")))
                .await
                .unwrap();
            tx.insert_entries(&[row(collection.id, content.id, i as i32)])
                .await
                .unwrap();
            ids.push(content.id);
        }
        tx.commit().await.unwrap();
        (collection.id, ids)
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryContentStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_collection(&gallery("Draft")).await.unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slug_derived_and_unique() {
        let store = MemoryContentStore::new();
        let mut tx = store.begin().await.unwrap();
        let created = tx.insert_collection(&gallery("Kyoto Autumn")).await.unwrap();
        assert_eq!(created.slug, "kyoto-autumn");

        let err = tx
            .insert_collection(&gallery("Kyoto  autumn!"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_concurrent_version_bump_conflicts() {
        let store = MemoryContentStore::new();
        let (collection, _) = seeded(&store, 2).await;

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        assert_eq!(first.bump_content_version(collection, 0).await.unwrap(), 1);
        assert_eq!(second.bump_content_version(collection, 0).await.unwrap(), 1);

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let mut tx = store.begin().await.unwrap();
        let stored = tx.find_collection(collection).await.unwrap().unwrap();
        assert_eq!(stored.content_version, 1);
    }

    #[tokio::test]
    async fn test_bump_after_foreign_commit_conflicts_immediately() {
        let store = MemoryContentStore::new();
        let (collection, _) = seeded(&store, 1).await;

        let mut late = store.begin().await.unwrap();
        let mut early = store.begin().await.unwrap();
        early.bump_content_version(collection, 0).await.unwrap();
        early.commit().await.unwrap();

        let err = late.bump_content_version(collection, 0).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_order_uniqueness_checked_at_commit() {
        let store = MemoryContentStore::new();
        let (collection, ids) = seeded(&store, 3).await;

        // Transient duplicates inside the transaction are fine.
        let mut tx = store.begin().await.unwrap();
        tx.apply_positions(collection, &[(ids[0], 2)]).await.unwrap();
        tx.apply_positions(collection, &[(ids[2], 0)]).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let order: Vec<ContentId> = tx
            .list_entries(collection)
            .await
            .unwrap()
            .iter()
            .map(|r| r.content_id)
            .collect();
        assert_eq!(order, vec![ids[2], ids[1], ids[0]]);

        // A duplicate that survives to commit is rejected.
        tx.apply_positions(collection, &[(ids[0], 1)]).await.unwrap();
        let err = tx.commit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_concurrent_association_writes_are_merged() {
        let store = MemoryContentStore::new();
        let (_, ids) = seeded(&store, 1).await;
        let parent = ids[0].get();

        let mut tx = store.begin().await.unwrap();
        let film = tx.insert_entity(CatalogKind::Tag, "film").await.unwrap().id;
        let night = tx.insert_entity(CatalogKind::Tag, "night").await.unwrap().id;
        let rain = tx.insert_entity(CatalogKind::Tag, "rain").await.unwrap().id;
        tx.insert_associations(RelationKind::ContentTags, parent, &[rain])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first
            .insert_associations(RelationKind::ContentTags, parent, &[film])
            .await
            .unwrap();
        second
            .insert_associations(RelationKind::ContentTags, parent, &[night])
            .await
            .unwrap();
        second
            .delete_associations(RelationKind::ContentTags, parent, &[rain])
            .await
            .unwrap();
        first.commit().await.unwrap();
        second.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let tags = tx
            .list_associations(RelationKind::ContentTags, parent)
            .await
            .unwrap();
        assert_eq!(tags, BTreeSet::from([film, night]));
    }

    #[tokio::test]
    async fn test_association_on_concurrently_deleted_parent_fails() {
        let store = MemoryContentStore::new();
        let mut tx = store.begin().await.unwrap();
        let content = tx
            .insert_content(&ContentDraft::text("loose"))
            .await
            .unwrap()
            .id;
        let tag = tx.insert_entity(CatalogKind::Tag, "film").await.unwrap().id;
        tx.commit().await.unwrap();

        let mut tagger = store.begin().await.unwrap();
        let mut deleter = store.begin().await.unwrap();
        tagger
            .insert_associations(RelationKind::ContentTags, content.get(), &[tag])
            .await
            .unwrap();
        assert!(deleter.delete_content(content).await.unwrap());
        deleter.commit().await.unwrap();

        let err = tagger.commit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_entity_insert_reuses_name_ignoring_case() {
        let store = MemoryContentStore::new();
        let mut tx = store.begin().await.unwrap();
        let first = tx.insert_entity(CatalogKind::Tag, "Travel").await.unwrap();
        let again = tx.insert_entity(CatalogKind::Tag, " travel ").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.name, "Travel");

        let other_kind = tx.insert_entity(CatalogKind::Person, "travel").await.unwrap();
        assert_ne!(other_kind.id, first.id);
    }

    #[tokio::test]
    async fn test_held_content_cannot_be_deleted() {
        let store = MemoryContentStore::new();
        let (collection, ids) = seeded(&store, 1).await;

        let mut tx = store.begin().await.unwrap();
        let err = tx.delete_content(ids[0]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);

        tx.delete_entries(collection, &ids).await.unwrap();
        assert!(tx.delete_content(ids[0]).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_counters_only_count_committed_changes() {
        let store = MemoryContentStore::new();
        let (collection, ids) = seeded(&store, 2).await;
        assert_eq!(store.entry_writes(), 2);

        let mut tx = store.begin().await.unwrap();
        tx.apply_visibility(collection, &[(ids[0], false)]).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(store.entry_writes(), 2);

        let mut tx = store.begin().await.unwrap();
        let tag = tx.insert_entity(CatalogKind::Tag, "film").await.unwrap();
        tx.insert_associations(RelationKind::ContentTags, ids[0].get(), &[tag.id])
            .await
            .unwrap();
        tx.insert_associations(RelationKind::ContentTags, ids[0].get(), &[tag.id])
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.association_writes(), 1);
    }
}
