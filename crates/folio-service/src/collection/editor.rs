//! Membership edits shared by the collection and content services.
//!
//! Every method runs on the caller's transaction and leaves the collection's
//! order indices dense. Callers lock the collection first.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use folio_core::config::EngineConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_database::StoreTransaction;
use folio_entity::collection::{Collection, CollectionContent};

use super::read::require_collection;
use crate::ordering::{OrderIndexAllocator, ReorderCoordinator, allocator};

/// Adds, removes and toggles content within one collection.
#[derive(Debug, Clone)]
pub(crate) struct MembershipEditor {
    allocator: OrderIndexAllocator,
    coordinator: ReorderCoordinator,
}

impl MembershipEditor {
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self {
            allocator: OrderIndexAllocator::new(),
            coordinator: ReorderCoordinator::new(config),
        }
    }

    pub(crate) fn coordinator(&self) -> &ReorderCoordinator {
        &self.coordinator
    }

    /// Load the collection and advance its content version from the value
    /// just read. Returns the collection carrying the new version.
    pub(crate) async fn lock(
        &self,
        tx: &mut dyn StoreTransaction,
        id: CollectionId,
    ) -> AppResult<Collection> {
        let mut collection = require_collection(tx, id).await?;
        collection.content_version = tx
            .bump_content_version(id, collection.content_version)
            .await?;
        Ok(collection)
    }

    /// Append `items` in order after the current last entry. With
    /// `insert_at`, the new block is then moved to start at that position
    /// and the entries behind it shift right.
    pub(crate) async fn insert(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
        items: &[(ContentId, bool)],
        insert_at: Option<i32>,
    ) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let rows = tx.list_entries(collection).await?;
        let present: BTreeSet<ContentId> = rows.iter().map(|r| r.content_id).collect();
        let mut seen = BTreeSet::new();
        for &(id, _) in items {
            if !seen.insert(id) {
                return Err(AppError::invalid_argument(format!(
                    "Content {id} is listed more than once"
                )));
            }
            if present.contains(&id) {
                return Err(AppError::conflict(format!(
                    "Content {id} is already in collection {collection}"
                )));
            }
        }

        let ids: Vec<ContentId> = items.iter().map(|(id, _)| *id).collect();
        let found = tx.find_contents(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|c| c.id == **id)) {
            return Err(AppError::not_found(format!("Content {missing} not found")));
        }
        if let Some(cycle) = found
            .iter()
            .find(|c| c.referenced_collection() == Some(collection))
        {
            return Err(AppError::invalid_argument(format!(
                "Content {} references collection {collection} and cannot be placed in it",
                cycle.id
            )));
        }

        if let Some(position) = insert_at {
            let len = i32::try_from(rows.len()).unwrap_or(i32::MAX);
            if !(0..=len).contains(&position) {
                return Err(AppError::invalid_argument(format!(
                    "Insert position {position} is outside 0..={len}"
                )));
            }
        }

        let start = allocator::next_index(&rows);
        let new_rows: Vec<CollectionContent> = items
            .iter()
            .zip(start..)
            .map(|(&(content_id, visible), order_index)| CollectionContent {
                collection_id: collection,
                content_id,
                order_index,
                visible,
            })
            .collect();
        tx.insert_entries(&new_rows).await?;

        // Appending after a gap leaves the collection sparse.
        self.allocator.compact(tx, collection).await?;
        if let Some(position) = insert_at {
            self.coordinator
                .place_block(tx, collection, &ids, position)
                .await?;
        }

        debug!(
            collection_id = %collection,
            added = ids.len(),
            insert_at = ?insert_at,
            "Content added to collection"
        );
        Ok(())
    }

    /// Remove `ids` and close the gaps they leave. Every id must be a member.
    pub(crate) async fn remove(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
        ids: &[ContentId],
    ) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let rows = tx.list_entries(collection).await?;
        let unique: BTreeSet<ContentId> = ids.iter().copied().collect();
        if let Some(stranger) = unique
            .iter()
            .find(|id| !rows.iter().any(|r| r.content_id == **id))
        {
            return Err(AppError::not_found(format!(
                "Content {stranger} is not in collection {collection}"
            )));
        }

        let targets: Vec<ContentId> = unique.into_iter().collect();
        tx.delete_entries(collection, &targets).await?;
        let moved = self.allocator.compact(tx, collection).await?;

        debug!(
            collection_id = %collection,
            removed = targets.len(),
            moved,
            "Content removed from collection"
        );
        Ok(())
    }

    /// Set collection-local visibility. Rows already in the requested state
    /// are not written. Returns the number of rows written.
    pub(crate) async fn set_visibility(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
        changes: &[(ContentId, bool)],
    ) -> AppResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let rows = tx.list_entries(collection).await?;
        // Last instruction for an item wins.
        let requested: BTreeMap<ContentId, bool> = changes.iter().copied().collect();
        let mut updates = Vec::new();
        for (id, visible) in requested {
            let row = rows.iter().find(|r| r.content_id == id).ok_or_else(|| {
                AppError::not_found(format!("Content {id} is not in collection {collection}"))
            })?;
            if row.visible != visible {
                updates.push((id, visible));
            }
        }

        if updates.is_empty() {
            return Ok(0);
        }
        tx.apply_visibility(collection, &updates).await
    }

    /// Clear the collection's cover when it points at one of `removed`.
    pub(crate) async fn clear_cover(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
        removed: &[ContentId],
    ) -> AppResult<()> {
        let mut stored = require_collection(tx, collection).await?;
        if stored
            .cover_content_id
            .is_some_and(|cover| removed.contains(&cover))
        {
            stored.cover_content_id = None;
            tx.update_collection(&stored).await?;
        }
        Ok(())
    }
}
