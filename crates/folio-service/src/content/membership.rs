//! Content-side reconciliation of collection memberships.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_database::StoreTransaction;
use folio_entity::update::{MembershipDelta, MembershipLink};

use crate::association::reconcile;
use crate::collection::editor::MembershipEditor;

/// Apply `delta` to the memberships of `content`.
///
/// `keep` names collections that must hold the content afterwards (a
/// collection that does not hold it yet gets it appended), `add` links
/// content into new collections (appended, or at `order_index`), and
/// `remove` wins over both.
/// Every collection gaining or losing the content has its content version
/// advanced once and is left densely ordered.
pub(crate) async fn apply_membership(
    tx: &mut dyn StoreTransaction,
    editor: &MembershipEditor,
    content: ContentId,
    delta: &MembershipDelta,
) -> AppResult<()> {
    let current: BTreeSet<CollectionId> = tx
        .list_memberships(content)
        .await?
        .into_iter()
        .map(|m| m.collection_id)
        .collect();

    for id in delta.keep_ids() {
        if !current.contains(id) && tx.find_collection(*id).await?.is_none() {
            return Err(AppError::not_found(format!("Collection {id} not found")));
        }
    }

    let removed: BTreeSet<CollectionId> = delta.remove_ids().iter().copied().collect();
    let mut links: BTreeMap<CollectionId, MembershipLink> = BTreeMap::new();
    for link in delta.add_links() {
        if links.insert(link.collection_id, *link).is_some() {
            return Err(AppError::invalid_argument(format!(
                "Collection {} is added more than once",
                link.collection_id
            )));
        }
        if current.contains(&link.collection_id) && !removed.contains(&link.collection_id) {
            return Err(AppError::conflict(format!(
                "Content {content} is already in collection {}",
                link.collection_id
            )));
        }
    }

    let added: Vec<CollectionId> = links.keys().copied().collect();
    let plan = reconcile(&current, delta.keep_ids(), &added, delta.remove_ids());
    debug!(
        content_id = %content,
        insert = ?plan.insert,
        delete = ?plan.delete,
        "Membership plan"
    );

    for collection in &plan.delete {
        editor.lock(tx, *collection).await?;
        editor.remove(tx, *collection, &[content]).await?;
        editor.clear_cover(tx, *collection, &[content]).await?;
    }
    for collection in &plan.insert {
        let link = links
            .get(collection)
            .copied()
            .unwrap_or_else(|| MembershipLink::append(*collection));
        editor.lock(tx, *collection).await?;
        editor
            .insert(
                tx,
                *collection,
                &[(content, link.visible.unwrap_or(true))],
                link.order_index,
            )
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use folio_core::config::EngineConfig;
    use folio_core::error::ErrorKind;
    use folio_database::{ContentStore, MemoryContentStore};
    use folio_entity::collection::{CollectionKind, NewCollection};
    use folio_entity::content::ContentDraft;

    use super::*;

    async fn collection(tx: &mut dyn StoreTransaction, title: &str) -> CollectionId {
        tx.insert_collection(&NewCollection {
            kind: CollectionKind::Gallery,
            title: title.to_string(),
            slug: None,
            description: None,
            collection_date: None,
            visible: true,
            display_mode: None,
            password_hash: None,
        })
        .await
        .unwrap()
        .id
    }

    async fn memberships(tx: &mut dyn StoreTransaction, content: ContentId) -> Vec<CollectionId> {
        tx.list_memberships(content)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.collection_id)
            .collect()
    }

    #[tokio::test]
    async fn test_keep_add_remove() {
        let store = MemoryContentStore::new();
        let editor = MembershipEditor::new(EngineConfig::default());
        let mut tx = store.begin().await.unwrap();
        let a = collection(tx.as_mut(), "A").await;
        let b = collection(tx.as_mut(), "B").await;
        let c = collection(tx.as_mut(), "C").await;
        let content = tx.insert_content(&ContentDraft::text("hello")).await.unwrap().id;

        let link = MembershipDelta {
            add: Some(vec![MembershipLink::append(a), MembershipLink::append(b)]),
            ..Default::default()
        };
        apply_membership(tx.as_mut(), &editor, content, &link).await.unwrap();
        assert_eq!(memberships(tx.as_mut(), content).await, vec![a, b]);

        let move_over = MembershipDelta {
            keep: Some(vec![a]),
            add: Some(vec![MembershipLink {
                collection_id: c,
                visible: Some(false),
                order_index: Some(0),
            }]),
            remove: None,
        };
        apply_membership(tx.as_mut(), &editor, content, &move_over)
            .await
            .unwrap();
        assert_eq!(memberships(tx.as_mut(), content).await, vec![a, c]);

        let in_c = tx.list_entries(c).await.unwrap();
        assert_eq!(in_c.len(), 1);
        assert!(!in_c[0].visible);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_keep_links_collection_not_yet_holding_content() {
        let store = MemoryContentStore::new();
        let editor = MembershipEditor::new(EngineConfig::default());
        let mut tx = store.begin().await.unwrap();
        let a = collection(tx.as_mut(), "A").await;
        let b = collection(tx.as_mut(), "B").await;
        let first = tx.insert_content(&ContentDraft::text("first")).await.unwrap().id;
        let content = tx.insert_content(&ContentDraft::text("second")).await.unwrap().id;
        let seed = MembershipDelta {
            add: Some(vec![MembershipLink::append(a)]),
            ..Default::default()
        };
        apply_membership(tx.as_mut(), &editor, first, &seed).await.unwrap();
        let join_b = MembershipDelta {
            add: Some(vec![MembershipLink::append(b)]),
            ..Default::default()
        };
        apply_membership(tx.as_mut(), &editor, content, &join_b).await.unwrap();

        let keep = MembershipDelta {
            keep: Some(vec![a]),
            ..Default::default()
        };
        apply_membership(tx.as_mut(), &editor, content, &keep).await.unwrap();

        assert_eq!(memberships(tx.as_mut(), content).await, vec![a]);
        let in_a = tx.list_entries(a).await.unwrap();
        let order: Vec<(ContentId, i32)> =
            in_a.iter().map(|r| (r.content_id, r.order_index)).collect();
        assert_eq!(order, vec![(first, 0), (content, 1)]);
        assert!(in_a[1].visible);
        assert!(tx.list_entries(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_deltas() {
        let store = MemoryContentStore::new();
        let editor = MembershipEditor::new(EngineConfig::default());
        let mut tx = store.begin().await.unwrap();
        let a = collection(tx.as_mut(), "A").await;
        let content = tx.insert_content(&ContentDraft::text("hello")).await.unwrap().id;

        let keep_unknown = MembershipDelta {
            keep: Some(vec![CollectionId::new(404)]),
            ..Default::default()
        };
        let err = apply_membership(tx.as_mut(), &editor, content, &keep_unknown)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let unknown = MembershipDelta {
            add: Some(vec![MembershipLink::append(CollectionId::new(404))]),
            ..Default::default()
        };
        let err = apply_membership(tx.as_mut(), &editor, content, &unknown)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let add = MembershipDelta {
            add: Some(vec![MembershipLink::append(a)]),
            ..Default::default()
        };
        apply_membership(tx.as_mut(), &editor, content, &add).await.unwrap();
        let again = MembershipDelta {
            keep: Some(vec![a]),
            add: Some(vec![MembershipLink::append(a)]),
            ..Default::default()
        };
        let err = apply_membership(tx.as_mut(), &editor, content, &again)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
