//! Integration tests for collection ordering, bundled updates and
//! optimistic concurrency.

mod helpers;

use folio_core::config::EngineConfig;
use folio_core::error::ErrorKind;
use folio_core::types::ContentId;
use folio_entity::collection::CollectionPatch;
use folio_entity::update::{
    AssociationDelta, CollectionUpdate, ContentRef, EntityRef, ReorderItem, VisibilityChange,
};
use folio_service::ReorderCoordinator;

#[tokio::test]
async fn test_reorder_moves_last_item_to_front() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Kyoto", 4).await;
    let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

    let list = app
        .collections
        .reorder_content(collection, &[ReorderItem::new(d, 0)])
        .await
        .unwrap();

    assert_eq!(list.content_ids(), vec![d, a, b, c]);
    assert_eq!(app.indices(collection).await, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_reorder_multiple_targets() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Lisbon", 6).await;

    app.collections
        .reorder_content(
            collection,
            &[ReorderItem::new(ids[0], 5), ReorderItem::new(ids[5], 0), ReorderItem::new(ids[3], 1)],
        )
        .await
        .unwrap();

    assert_eq!(
        app.order(collection).await,
        vec![ids[5], ids[3], ids[1], ids[2], ids[4], ids[0]]
    );
}

#[tokio::test]
async fn test_invalid_reorder_changes_nothing() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Porto", 3).await;
    let before = app.collections.ordered_content(collection).await.unwrap();

    let err = app
        .collections
        .reorder_content(collection, &[ReorderItem::new(ids[0], 2), ReorderItem::new(ids[1], 7)])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    let stranger = app.create_text("elsewhere").await;
    let err = app
        .collections
        .reorder_content(collection, &[ReorderItem::new(stranger, 0)])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let after = app.collections.ordered_content(collection).await.unwrap();
    assert_eq!(after.content_ids(), before.content_ids());
    assert_eq!(after.content_version, before.content_version);
}

#[tokio::test]
async fn test_repeated_reorder_is_idempotent() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Oslo", 4).await;
    let batch = [ReorderItem::new(ids[2], 0)];

    app.collections.reorder_content(collection, &batch).await.unwrap();
    let writes = app.memory().entry_writes();
    let version = app.collections.ordered_content(collection).await.unwrap().content_version;

    let list = app.collections.reorder_content(collection, &batch).await.unwrap();

    assert_eq!(app.memory().entry_writes(), writes);
    assert_eq!(list.content_version, version);
    assert_eq!(list.content_ids(), vec![ids[2], ids[0], ids[1], ids[3]]);
}

#[tokio::test]
async fn test_remove_compacts_remaining_content() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Tokyo", 5).await;

    app.collections
        .remove_content(collection, &[ids[2]])
        .await
        .unwrap();

    assert_eq!(app.order(collection).await, vec![ids[0], ids[1], ids[3], ids[4]]);
    assert_eq!(app.indices(collection).await, vec![0, 1, 2, 3]);

    // The content itself survives removal.
    let content = app.contents.get_content(ids[2]).await.unwrap();
    assert!(content.memberships.is_empty());
}

#[tokio::test]
async fn test_add_at_position_and_duplicate_add() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Rome", 3).await;
    let extra = app.create_text("intermission").await;

    app.collections
        .add_content(collection, &[ContentRef::Existing(extra)], Some(1))
        .await
        .unwrap();
    assert_eq!(app.order(collection).await, vec![ids[0], extra, ids[1], ids[2]]);

    let err = app
        .collections
        .add_content(collection, &[ContentRef::Existing(extra)], None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_visibility_is_collection_local() {
    let app = helpers::TestApp::new();
    let (first, ids) = app.seed("Day one", 2).await;
    let second = app.create_collection("Best of").await;
    app.collections
        .add_content(second, &[ContentRef::Existing(ids[0])], None)
        .await
        .unwrap();

    app.collections
        .set_visibility(
            first,
            &[VisibilityChange {
                content_id: ContentRef::Existing(ids[0]),
                visible: false,
            }],
        )
        .await
        .unwrap();

    let first_list = app.collections.ordered_content(first).await.unwrap();
    let second_list = app.collections.ordered_content(second).await.unwrap();
    assert!(!first_list.entries[0].visible);
    assert!(second_list.entries[0].visible);
}

#[tokio::test]
async fn test_update_with_placeholders() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Journal", 2).await;

    let aggregate = app
        .collections
        .update_collection(
            collection,
            CollectionUpdate {
                new_content: vec![helpers::text("first new"), helpers::text("second new")],
                visibility: vec![VisibilityChange {
                    content_id: ContentRef::Placeholder(1),
                    visible: false,
                }],
                reorder: vec![ReorderItem {
                    content_id: ContentRef::Placeholder(2),
                    new_index: 0,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let order = aggregate.content.content_ids();
    assert_eq!(order.len(), 4);
    assert_eq!(&order[1..3], &[ids[0], ids[1]]);
    assert_eq!(aggregate.content.entries[0].content.title.as_deref(), Some("second new"));
    assert_eq!(aggregate.content.entries[3].content.title.as_deref(), Some("first new"));
    assert!(!aggregate.content.entries[3].visible);
    assert!(aggregate.content.entries[0].visible);
}

#[tokio::test]
async fn test_failed_update_rolls_back_everything() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Atomic", 3).await;
    let before = app.collections.get_collection(collection).await.unwrap();

    let err = app
        .collections
        .update_collection(
            collection,
            CollectionUpdate {
                fields: CollectionPatch {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
                tags: Some(AssociationDelta {
                    create: Some(vec!["should-not-exist".to_string()]),
                    ..Default::default()
                }),
                remove_content: vec![ids[0]],
                new_content: vec![helpers::text("orphan")],
                reorder: vec![ReorderItem {
                    content_id: ContentRef::Placeholder(3),
                    new_index: 0,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    let after = app.collections.get_collection(collection).await.unwrap();
    assert_eq!(after.collection.title, before.collection.title);
    assert_eq!(after.collection.content_version, before.collection.content_version);
    assert_eq!(after.content.content_ids(), ids);
    assert!(after.tags.is_empty());
    assert!(
        app.catalog
            .list_catalog(folio_entity::catalog::CatalogKind::Tag)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_bundled_update() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Roll 12", 4).await;
    let loose = app.create_text("loose frame").await;

    let aggregate = app
        .collections
        .update_collection(
            collection,
            CollectionUpdate {
                fields: CollectionPatch {
                    title: Some("Roll 12: Hokkaido".to_string()),
                    slug: Some("roll-12-hokkaido".to_string()),
                    cover_content_id: Some(loose),
                    ..Default::default()
                },
                location: Some(EntityRef::Create("Sapporo".to_string())),
                tags: Some(AssociationDelta {
                    create: Some(vec!["Film".to_string(), "snow".to_string()]),
                    ..Default::default()
                }),
                remove_content: vec![ids[1]],
                add_content: vec![loose],
                reorder: vec![ReorderItem::new(loose, 0)],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let c = &aggregate.collection;
    assert_eq!(c.title, "Roll 12: Hokkaido");
    assert_eq!(c.slug, "roll-12-hokkaido");
    assert_eq!(c.cover_content_id, Some(loose));
    assert_eq!(aggregate.location.as_ref().map(|l| l.name.as_str()), Some("Sapporo"));
    let tags: Vec<&str> = aggregate.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["Film", "snow"]);
    assert_eq!(aggregate.content.content_ids(), vec![loose, ids[0], ids[2], ids[3]]);

    let by_slug = app
        .collections
        .get_collection_by_slug("roll-12-hokkaido")
        .await
        .unwrap();
    assert_eq!(by_slug.collection.id, collection);
}

#[tokio::test]
async fn test_cover_must_be_member() {
    let app = helpers::TestApp::new();
    let (collection, _) = app.seed("Covers", 2).await;
    let outsider = app.create_text("outsider").await;

    let err = app
        .collections
        .update_collection(
            collection,
            CollectionUpdate {
                fields: CollectionPatch {
                    cover_content_id: Some(outsider),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_concurrent_writer_conflicts() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Shared", 3).await;
    let version = app.collections.ordered_content(collection).await.unwrap().content_version;

    // A second writer starts from the same version and holds its transaction.
    let mut other = app.store.begin().await.unwrap();
    other.bump_content_version(collection, version).await.unwrap();
    other
        .apply_positions(collection, &[(ids[0], 2), (ids[2], 0)])
        .await
        .unwrap();

    app.collections
        .reorder_content(collection, &[ReorderItem::new(ids[1], 0)])
        .await
        .unwrap();

    let err = other.commit().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.order(collection).await, vec![ids[1], ids[0], ids[2]]);
}

#[tokio::test]
async fn test_two_reorders_from_same_version_commit_once() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Race", 4).await;
    let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);
    let coordinator = ReorderCoordinator::new(EngineConfig::default());
    let before = app.collections.ordered_content(collection).await.unwrap().content_version;

    // Both writers read and plan before either writes.
    let mut writers = Vec::new();
    for target in [d, c] {
        let mut tx = app.store.begin().await.unwrap();
        let seen = tx.find_collection(collection).await.unwrap().unwrap();
        let rows = tx.list_entries(collection).await.unwrap();
        let positions = coordinator.plan(&rows, &[(target, 0)]).unwrap();
        writers.push((tx, seen.content_version, positions));
    }
    for (tx, version, positions) in &mut writers {
        tx.bump_content_version(collection, *version).await.unwrap();
        tx.apply_positions(collection, positions).await.unwrap();
    }

    let mut outcomes = Vec::new();
    for (tx, _, _) in writers {
        outcomes.push(tx.commit().await);
    }

    assert!(outcomes[0].is_ok());
    let err = outcomes[1].as_ref().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.order(collection).await, vec![d, a, b, c]);
    assert_eq!(app.indices(collection).await, vec![0, 1, 2, 3]);
    let list = app.collections.ordered_content(collection).await.unwrap();
    assert_eq!(list.content_version, before + 1);
}

#[tokio::test]
async fn test_stale_writer_conflicts_before_writing() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Stale", 2).await;

    let mut stale = app.store.begin().await.unwrap();
    let seen = stale.find_collection(collection).await.unwrap().unwrap();

    app.collections
        .remove_content(collection, &[ids[0]])
        .await
        .unwrap();

    let err = stale
        .bump_content_version(collection, seen.content_version)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.order(collection).await, vec![ids[1]]);
}

#[tokio::test]
async fn test_reorder_batch_limit() {
    let app = helpers::TestApp::new();
    let (collection, ids) = app.seed("Limits", 3).await;
    let items: Vec<ReorderItem> = (0..1001)
        .map(|i| ReorderItem::new(ids[i % 3], 0))
        .collect();

    let err = app
        .collections
        .reorder_content(collection, &items)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_unknown_collection() {
    let app = helpers::TestApp::new();
    let missing = folio_core::types::CollectionId::new(9_999);

    let err = app
        .collections
        .reorder_content(missing, &[ReorderItem::new(ContentId::new(1), 0)])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app.collections.get_collection(missing).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
