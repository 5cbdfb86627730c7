//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use folio_core::config::EngineConfig;
use folio_core::types::{CollectionId, ContentId};
use folio_database::{ContentStore, MemoryContentStore};
use folio_entity::collection::{CollectionKind, NewCollection};
use folio_entity::content::{NewContent, NewContentBody, TextAttributes};
use folio_entity::update::ContentRef;
use folio_service::{CatalogService, CollectionService, ContentService, RelationshipReconciler};

/// Test application context
pub struct TestApp {
    /// The store every service shares
    pub store: Arc<dyn ContentStore>,
    /// Set when the store is the in-memory one, for write counters
    pub memory: Option<MemoryContentStore>,
    /// Collection operations
    pub collections: CollectionService,
    /// Content operations
    pub contents: ContentService,
    /// Catalog operations
    pub catalog: CatalogService,
    /// Standalone association reconciliation
    pub reconciler: RelationshipReconciler,
}

impl TestApp {
    /// Create a test application over a fresh in-memory store
    pub fn new() -> Self {
        let memory = MemoryContentStore::new();
        let mut app = Self::with_store(Arc::new(memory.clone()));
        app.memory = Some(memory);
        app
    }

    /// Create a test application over any store
    pub fn with_store(store: Arc<dyn ContentStore>) -> Self {
        let config = EngineConfig::default();
        Self {
            collections: CollectionService::new(Arc::clone(&store), config.clone()),
            contents: ContentService::new(Arc::clone(&store), config.clone()),
            catalog: CatalogService::new(Arc::clone(&store)),
            reconciler: RelationshipReconciler::new(Arc::clone(&store), config),
            store,
            memory: None,
        }
    }

    /// The in-memory store; panics for other backends
    pub fn memory(&self) -> &MemoryContentStore {
        self.memory.as_ref().expect("test requires the in-memory store")
    }

    /// Create an empty gallery
    pub async fn create_collection(&self, title: &str) -> CollectionId {
        self.collections
            .create_collection(gallery(title))
            .await
            .expect("Failed to create collection")
            .collection
            .id
    }

    /// Create a standalone text block
    pub async fn create_text(&self, body: &str) -> ContentId {
        self.contents
            .create_content(text(body))
            .await
            .expect("Failed to create content")
            .content
            .id
    }

    /// Create a collection holding `count` text blocks, in order
    pub async fn seed(&self, title: &str, count: usize) -> (CollectionId, Vec<ContentId>) {
        let collection = self.create_collection(title).await;
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            ids.push(self.create_text(&format!("{title} block {i}")).await);
        }
        let refs: Vec<ContentRef> = ids.iter().map(|id| ContentRef::Existing(*id)).collect();
        self.collections
            .add_content(collection, &refs, None)
            .await
            .expect("Failed to add content");
        (collection, ids)
    }

    /// Content ids of a collection in display order
    pub async fn order(&self, collection: CollectionId) -> Vec<ContentId> {
        self.collections
            .ordered_content(collection)
            .await
            .expect("Failed to load collection")
            .content_ids()
    }

    /// Order indices of a collection in display order
    pub async fn indices(&self, collection: CollectionId) -> Vec<i32> {
        self.collections
            .ordered_content(collection)
            .await
            .expect("Failed to load collection")
            .entries
            .iter()
            .map(|e| e.order_index)
            .collect()
    }
}

/// A new gallery payload
pub fn gallery(title: &str) -> NewCollection {
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

/// A new text block payload
pub fn text(body: &str) -> NewContent {
    NewContent {
        title: Some(body.to_string()),
        description: None,
        preview_url: None,
        body: NewContentBody::Text(TextAttributes {
            body: body.to_string(),
            format: Default::default(),
        }),
    }
}
