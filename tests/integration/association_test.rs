//! Integration tests for tag, person and membership reconciliation.

mod helpers;

use folio_core::error::ErrorKind;
use folio_core::types::EntityId;
use folio_entity::catalog::{CatalogKind, RelationKind};
use folio_entity::content::{NewContent, NewContentBody};
use folio_entity::update::{
    AssociationDelta, ContentRef, ContentUpdate, MembershipDelta, MembershipLink,
};

async fn tag(app: &helpers::TestApp, name: &str) -> EntityId {
    app.catalog.find_or_create(CatalogKind::Tag, name).await.unwrap().id
}

#[tokio::test]
async fn test_keep_create_remove() {
    let app = helpers::TestApp::new();
    let content = app.create_text("harbour at dawn").await;
    let t1 = tag(&app, "harbour").await;
    let t2 = tag(&app, "dawn").await;
    let t5 = tag(&app, "boats").await;
    app.reconciler
        .reconcile_associations(
            content.get(),
            RelationKind::ContentTags,
            &AssociationDelta::keep([t1, t2, t5]),
        )
        .await
        .unwrap();

    let final_set = app
        .reconciler
        .reconcile_associations(
            content.get(),
            RelationKind::ContentTags,
            &AssociationDelta {
                keep: Some(vec![t1, t2]),
                create: Some(vec!["travel".to_string()]),
                remove: Some(vec![t2]),
            },
        )
        .await
        .unwrap();

    let tags = app.contents.get_content(content).await.unwrap().tags;
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["harbour", "travel"]);
    assert_eq!(final_set.len(), 2);
    assert!(final_set.contains(&t1));
}

#[tokio::test]
async fn test_create_reuses_existing_names() {
    let app = helpers::TestApp::new();
    let content = app.create_text("night market").await;
    let existing = tag(&app, "Travel").await;

    app.contents
        .update_content(
            content,
            ContentUpdate {
                tags: Some(AssociationDelta {
                    create: Some(vec!["travel".to_string(), "TRAVEL ".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let aggregate = app.contents.get_content(content).await.unwrap();
    assert_eq!(aggregate.tags.len(), 1);
    assert_eq!(aggregate.tags[0].id, existing);
    assert_eq!(app.catalog.list_catalog(CatalogKind::Tag).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resubmitting_current_set_writes_nothing() {
    let app = helpers::TestApp::new();
    let content = app.create_text("quiet street").await;
    let delta = AssociationDelta {
        create: Some(vec!["street".to_string(), "mono".to_string()]),
        ..Default::default()
    };
    let current = app
        .reconciler
        .reconcile_associations(content.get(), RelationKind::ContentTags, &delta)
        .await
        .unwrap();
    let writes = app.memory().association_writes();

    app.reconciler
        .reconcile_associations(
            content.get(),
            RelationKind::ContentTags,
            &AssociationDelta::keep(current.iter().copied()),
        )
        .await
        .unwrap();

    assert_eq!(app.memory().association_writes(), writes);
}

#[tokio::test]
async fn test_unknown_keep_id_fails_without_partial_writes() {
    let app = helpers::TestApp::new();
    let content = app.create_text("ferry").await;

    let err = app
        .contents
        .update_content(
            content,
            ContentUpdate {
                title: Some("Ferry to Sado".to_string()),
                tags: Some(AssociationDelta {
                    keep: Some(vec![EntityId::new(404)]),
                    create: Some(vec!["island".to_string()]),
                    remove: None,
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let aggregate = app.contents.get_content(content).await.unwrap();
    assert_eq!(aggregate.content.title.as_deref(), Some("ferry"));
    assert!(app.catalog.list_catalog(CatalogKind::Tag).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_people_and_collection_tags() {
    let app = helpers::TestApp::new();
    let content = app.create_text("portrait").await;
    let collection = app.create_collection("Portraits").await;

    app.contents
        .update_content(
            content,
            ContentUpdate {
                people: Some(AssociationDelta {
                    create: Some(vec!["Aiko".to_string(), "Ren".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.reconciler
        .reconcile_associations(
            collection.get(),
            RelationKind::CollectionTags,
            &AssociationDelta {
                create: Some(vec!["people".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let people = app.contents.get_content(content).await.unwrap().people;
    assert_eq!(people.len(), 2);
    let tags = app.collections.get_collection(collection).await.unwrap().tags;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "people");

    let err = app
        .reconciler
        .reconcile_associations(9_999, RelationKind::CollectionTags, &AssociationDelta::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_membership_delta_moves_content_between_collections() {
    let app = helpers::TestApp::new();
    let (source, source_ids) = app.seed("Contact sheet", 3).await;
    let (target, target_ids) = app.seed("Selects", 2).await;
    let moving = source_ids[1];

    let aggregate = app
        .contents
        .update_content(
            moving,
            ContentUpdate {
                collections: Some(MembershipDelta {
                    keep: None,
                    add: Some(vec![MembershipLink {
                        collection_id: target,
                        visible: Some(true),
                        order_index: Some(0),
                    }]),
                    remove: Some(vec![source]),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(aggregate.memberships.len(), 1);
    assert_eq!(aggregate.memberships[0].collection_id, target);
    assert_eq!(app.order(source).await, vec![source_ids[0], source_ids[2]]);
    assert_eq!(app.indices(source).await, vec![0, 1]);
    assert_eq!(
        app.order(target).await,
        vec![moving, target_ids[0], target_ids[1]]
    );
}

#[tokio::test]
async fn test_deleting_collection_removes_references() {
    let app = helpers::TestApp::new();
    let (home, home_ids) = app.seed("Home", 2).await;
    let featured = app.create_collection("Featured").await;

    let reference = app
        .contents
        .create_content(NewContent {
            title: Some("See also".to_string()),
            description: None,
            preview_url: None,
            body: NewContentBody::CollectionReference {
                collection_id: featured,
            },
        })
        .await
        .unwrap()
        .content
        .id;
    app.collections
        .add_content(home, &[ContentRef::Existing(reference)], Some(1))
        .await
        .unwrap();
    assert_eq!(app.order(home).await, vec![home_ids[0], reference, home_ids[1]]);

    app.collections.delete_collection(featured).await.unwrap();

    assert_eq!(app.order(home).await, home_ids);
    assert_eq!(app.indices(home).await, vec![0, 1]);
    let err = app.contents.get_content(reference).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_collection_cannot_hold_reference_to_itself() {
    let app = helpers::TestApp::new();
    let collection = app.create_collection("Loop").await;
    let reference = app
        .contents
        .create_content(NewContent {
            title: None,
            description: None,
            preview_url: None,
            body: NewContentBody::CollectionReference {
                collection_id: collection,
            },
        })
        .await
        .unwrap()
        .content
        .id;

    let err = app
        .collections
        .add_content(collection, &[ContentRef::Existing(reference)], None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}
