//! Read models assembled inside a transaction.

use std::collections::BTreeMap;

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_database::StoreTransaction;
use folio_entity::catalog::{CatalogKind, NamedEntity, RelationKind};
use folio_entity::collection::{Collection, OrderedContentList, OrderedEntry};
use folio_entity::content::Content;
use folio_entity::update::CollectionAggregate;

/// Load a collection or fail with `NotFound`.
pub(crate) async fn require_collection(
    tx: &mut dyn StoreTransaction,
    id: CollectionId,
) -> AppResult<Collection> {
    tx.find_collection(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Collection {id} not found")))
}

/// Load a content item or fail with `NotFound`.
pub(crate) async fn require_content(
    tx: &mut dyn StoreTransaction,
    id: ContentId,
) -> AppResult<Content> {
    tx.find_contents(&[id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(format!("Content {id} not found")))
}

/// The collection's content in display order, as seen by `tx`.
pub(crate) async fn load_ordered(
    tx: &mut dyn StoreTransaction,
    id: CollectionId,
) -> AppResult<OrderedContentList> {
    let collection = require_collection(tx, id).await?;
    let rows = tx.list_entries(id).await?;
    let ids: Vec<ContentId> = rows.iter().map(|r| r.content_id).collect();
    let mut contents: BTreeMap<ContentId, Content> = tx
        .find_contents(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let entries = rows
        .iter()
        .map(|row| {
            contents
                .remove(&row.content_id)
                .map(|content| OrderedEntry {
                    content,
                    order_index: row.order_index,
                    visible: row.visible,
                })
                .ok_or_else(|| {
                    AppError::internal(format!(
                        "Collection {id} holds missing content {}",
                        row.content_id
                    ))
                })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(OrderedContentList {
        collection_id: id,
        content_version: collection.content_version,
        entries,
    })
}

/// Entities associated with `parent` through `relation`, sorted by name.
pub(crate) async fn load_associated(
    tx: &mut dyn StoreTransaction,
    relation: RelationKind,
    parent: i64,
) -> AppResult<Vec<NamedEntity>> {
    let ids: Vec<_> = tx
        .list_associations(relation, parent)
        .await?
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut entities = tx.find_entities(relation.entity_kind(), &ids).await?;
    entities.sort_by_key(|e| e.name.to_lowercase());
    Ok(entities)
}

/// The collection with its location, tags and ordered content.
pub(crate) async fn load_aggregate(
    tx: &mut dyn StoreTransaction,
    id: CollectionId,
) -> AppResult<CollectionAggregate> {
    let collection = require_collection(tx, id).await?;
    let location = match collection.location_id {
        Some(location_id) => tx
            .find_entities(CatalogKind::Location, &[location_id])
            .await?
            .into_iter()
            .next(),
        None => None,
    };
    let tags = load_associated(tx, RelationKind::CollectionTags, id.get()).await?;
    let content = load_ordered(tx, id).await?;

    Ok(CollectionAggregate {
        collection,
        location,
        tags,
        content,
    })
}
