//! Next-index allocation and compaction.

use tracing::debug;

use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_database::StoreTransaction;
use folio_entity::collection::CollectionContent;

/// The index a newly appended row takes: one past the current maximum, or
/// `0` for an empty collection.
pub fn next_index(rows: &[CollectionContent]) -> i32 {
    rows.iter().map(|r| r.order_index).max().map_or(0, |max| max + 1)
}

/// Positions that renumber `rows` to `0..n` while preserving their relative
/// order. Only rows whose index changes are returned.
///
/// Ties (possible only in a corrupted collection) are broken by content id.
pub fn compact_positions(rows: &[CollectionContent]) -> Vec<(ContentId, i32)> {
    let mut sorted: Vec<&CollectionContent> = rows.iter().collect();
    sorted.sort_by_key(|r| (r.order_index, r.content_id));

    sorted
        .into_iter()
        .zip(0..)
        .filter(|(row, index)| row.order_index != *index)
        .map(|(row, index)| (row.content_id, index))
        .collect()
}

/// Whether the indices of `rows` are exactly `0..n`.
pub fn is_dense(rows: &[CollectionContent]) -> bool {
    let mut indices: Vec<i32> = rows.iter().map(|r| r.order_index).collect();
    indices.sort_unstable();
    indices.iter().zip(0..).all(|(&actual, expected)| actual == expected)
}

/// Transactional next-index and compaction over a store.
///
/// The current maximum is always read inside the caller's transaction and
/// never cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderIndexAllocator;

impl OrderIndexAllocator {
    /// Creates a new allocator.
    pub fn new() -> Self {
        Self
    }

    /// The next free index of `collection`.
    pub async fn next_index(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
    ) -> AppResult<i32> {
        let rows = tx.list_entries(collection).await?;
        Ok(next_index(&rows))
    }

    /// Renumber `collection` to `0..n`, writing only changed rows. Returns
    /// the number of rows written.
    pub async fn compact(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
    ) -> AppResult<u64> {
        let rows = tx.list_entries(collection).await?;
        let positions = compact_positions(&rows);
        if positions.is_empty() {
            return Ok(0);
        }

        debug!(collection_id = %collection, moved = positions.len(), "Compacting collection");
        tx.apply_positions(collection, &positions).await
    }
}
