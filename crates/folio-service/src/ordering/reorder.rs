//! Explicit-target, implicit-shift reordering.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use folio_core::config::EngineConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_database::StoreTransaction;
use folio_entity::collection::CollectionContent;

/// Compute the new display order of a collection.
///
/// `current` is the collection's content in display order. Each named item
/// lands exactly at its target; the unnamed items keep their relative order
/// and fill the remaining slots from the front. The result is always a
/// permutation of `current`.
///
/// Fails with `NotFound` when an item is not in the collection and with
/// `InvalidArgument` for an out-of-range target, a repeated target or a
/// repeated item.
pub fn plan_reorder(current: &[ContentId], moves: &[(ContentId, i32)]) -> AppResult<Vec<ContentId>> {
    let len = current.len();
    let members: BTreeSet<ContentId> = current.iter().copied().collect();
    let mut slots: Vec<Option<ContentId>> = vec![None; len];
    let mut named = BTreeSet::new();

    for &(id, target) in moves {
        if !members.contains(&id) {
            return Err(AppError::not_found(format!(
                "Content {id} is not in this collection"
            )));
        }
        let slot = usize::try_from(target)
            .ok()
            .filter(|&slot| slot < len)
            .ok_or_else(|| {
                AppError::invalid_argument(format!(
                    "Target index {target} for content {id} is outside 0..{len}"
                ))
            })?;
        if !named.insert(id) {
            return Err(AppError::invalid_argument(format!(
                "Content {id} appears more than once in the reorder batch"
            )));
        }
        if slots[slot].replace(id).is_some() {
            return Err(AppError::invalid_argument(format!(
                "Target index {target} is requested more than once"
            )));
        }
    }

    let mut rest = current.iter().copied().filter(|id| !named.contains(id));
    let order = slots
        .into_iter()
        .map(|slot| slot.or_else(|| rest.next()))
        .collect::<Option<Vec<ContentId>>>()
        .ok_or_else(|| AppError::internal("Reorder plan left an empty slot"))?;
    Ok(order)
}

/// Positions that turn `rows` into `order`, skipping rows already in place.
pub fn changed_positions(rows: &[CollectionContent], order: &[ContentId]) -> Vec<(ContentId, i32)> {
    let before: BTreeMap<ContentId, i32> =
        rows.iter().map(|r| (r.content_id, r.order_index)).collect();

    order
        .iter()
        .zip(0..)
        .filter(|(id, index)| before.get(*id) != Some(index))
        .map(|(id, index)| (*id, index))
        .collect()
}

/// Applies reorder batches as one validated, batched write.
#[derive(Debug, Clone)]
pub struct ReorderCoordinator {
    /// Request limits.
    config: EngineConfig,
}

impl ReorderCoordinator {
    /// Creates a new coordinator.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Reject batches above the configured size.
    pub fn check_batch(&self, len: usize) -> AppResult<()> {
        if len > self.config.max_reorder_batch {
            return Err(AppError::invalid_argument(format!(
                "Reorder batch of {len} items exceeds the maximum of {}",
                self.config.max_reorder_batch
            )));
        }
        Ok(())
    }

    /// Validate `moves` against the collection's current rows and return
    /// the positions that would change. Nothing is written.
    pub fn plan(
        &self,
        rows: &[CollectionContent],
        moves: &[(ContentId, i32)],
    ) -> AppResult<Vec<(ContentId, i32)>> {
        self.check_batch(moves.len())?;
        plan_positions(rows, moves)
    }

    /// Plan and apply `moves` on the caller's transaction. Returns the
    /// positions written; an empty result means the order was already as
    /// requested and nothing was written.
    pub async fn apply(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
        moves: &[(ContentId, i32)],
    ) -> AppResult<Vec<(ContentId, i32)>> {
        self.check_batch(moves.len())?;
        apply_moves(tx, collection, moves).await
    }

    /// Move `ids` (already members) to the contiguous block starting at
    /// `start`, in the given order.
    pub async fn place_block(
        &self,
        tx: &mut dyn StoreTransaction,
        collection: CollectionId,
        ids: &[ContentId],
        start: i32,
    ) -> AppResult<Vec<(ContentId, i32)>> {
        let moves: Vec<(ContentId, i32)> = ids
            .iter()
            .zip(0..)
            .map(|(&id, offset)| (id, start.saturating_add(offset)))
            .collect();
        apply_moves(tx, collection, &moves).await
    }
}

fn plan_positions(
    rows: &[CollectionContent],
    moves: &[(ContentId, i32)],
) -> AppResult<Vec<(ContentId, i32)>> {
    let current: Vec<ContentId> = rows.iter().map(|r| r.content_id).collect();
    let order = plan_reorder(&current, moves)?;
    Ok(changed_positions(rows, &order))
}

async fn apply_moves(
    tx: &mut dyn StoreTransaction,
    collection: CollectionId,
    moves: &[(ContentId, i32)],
) -> AppResult<Vec<(ContentId, i32)>> {
    let rows = tx.list_entries(collection).await?;
    let positions = plan_positions(&rows, moves)?;

    debug!(
        collection_id = %collection,
        requested = moves.len(),
        changed = positions.len(),
        "Reorder plan"
    );
    if !positions.is_empty() {
        tx.apply_positions(collection, &positions).await?;
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use folio_core::error::ErrorKind;

    use super::*;

    fn ids(raw: &[i64]) -> Vec<ContentId> {
        raw.iter().copied().map(ContentId::new).collect()
    }

    fn rows(order: &[i64]) -> Vec<CollectionContent> {
        order
            .iter()
            .zip(0..)
            .map(|(&id, order_index)| CollectionContent {
                collection_id: CollectionId::new(1),
                content_id: ContentId::new(id),
                order_index,
                visible: true,
            })
            .collect()
    }

    #[test]
    fn test_move_last_to_front_shifts_others() {
        // [a, b, c, d], d -> 0
        let order = plan_reorder(&ids(&[1, 2, 3, 4]), &[(ContentId::new(4), 0)]).unwrap();
        assert_eq!(order, ids(&[4, 1, 2, 3]));
    }

    #[test]
    fn test_named_items_fixed_unnamed_fill_in_order() {
        let order = plan_reorder(
            &ids(&[1, 2, 3, 4, 5]),
            &[(ContentId::new(1), 4), (ContentId::new(5), 1)],
        )
        .unwrap();
        assert_eq!(order, ids(&[2, 5, 3, 4, 1]));
    }

    #[test]
    fn test_swap() {
        let order = plan_reorder(
            &ids(&[1, 2, 3]),
            &[(ContentId::new(1), 2), (ContentId::new(3), 0)],
        )
        .unwrap();
        assert_eq!(order, ids(&[3, 2, 1]));
    }

    #[test]
    fn test_invalid_batches() {
        let current = ids(&[1, 2, 3]);

        let out_of_range = plan_reorder(&current, &[(ContentId::new(1), 3)]).unwrap_err();
        assert_eq!(out_of_range.kind, ErrorKind::InvalidArgument);

        let negative = plan_reorder(&current, &[(ContentId::new(1), -1)]).unwrap_err();
        assert_eq!(negative.kind, ErrorKind::InvalidArgument);

        let duplicate_target =
            plan_reorder(&current, &[(ContentId::new(1), 0), (ContentId::new(2), 0)]).unwrap_err();
        assert_eq!(duplicate_target.kind, ErrorKind::InvalidArgument);

        let duplicate_item =
            plan_reorder(&current, &[(ContentId::new(1), 0), (ContentId::new(1), 1)]).unwrap_err();
        assert_eq!(duplicate_item.kind, ErrorKind::InvalidArgument);

        let stranger = plan_reorder(&current, &[(ContentId::new(9), 0)]).unwrap_err();
        assert_eq!(stranger.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_identity_batch_changes_nothing() {
        let before = rows(&[1, 2, 3]);
        let order = plan_reorder(
            &ids(&[1, 2, 3]),
            &[(ContentId::new(2), 1), (ContentId::new(3), 2)],
        )
        .unwrap();
        assert!(changed_positions(&before, &order).is_empty());
    }

    #[test]
    fn test_changed_positions_skips_unmoved_rows() {
        let before = rows(&[1, 2, 3, 4]);
        let order = ids(&[1, 3, 2, 4]);
        assert_eq!(
            changed_positions(&before, &order),
            vec![(ContentId::new(3), 1), (ContentId::new(2), 2)]
        );
    }

    #[test]
    fn test_batch_limit() {
        let coordinator = ReorderCoordinator::new(EngineConfig {
            max_reorder_batch: 2,
            ..Default::default()
        });
        assert!(coordinator.check_batch(2).is_ok());
        assert_eq!(
            coordinator.check_batch(3).unwrap_err().kind,
            ErrorKind::InvalidArgument
        );
    }
}
