//! Snapshot transactions over the in-memory store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId, EntityId};
use folio_entity::catalog::{CatalogKind, NamedEntity, RelationKind};
use folio_entity::collection::slug::slugify;
use folio_entity::collection::{Collection, CollectionContent, NewCollection};
use folio_entity::content::{Content, ContentBody, ContentDraft};

use super::Shared;
use super::state::{DirtyKeys, MemoryState, unique_violation};
use crate::store::StoreTransaction;

/// A private copy of the store taken at `begin`.
///
/// Writes go to the copy and are merged back key by key on commit, after
/// the content versions this transaction checked have been re-validated
/// against the shared state.
pub struct MemoryStoreTransaction {
    shared: Arc<Shared>,
    state: MemoryState,
    dirty: DirtyKeys,
    version_checks: BTreeMap<CollectionId, i64>,
    entry_writes: u64,
    association_writes: u64,
}

impl MemoryStoreTransaction {
    pub(super) fn new(shared: Arc<Shared>, state: MemoryState) -> Self {
        Self {
            shared,
            state,
            dirty: DirtyKeys::default(),
            version_checks: BTreeMap::new(),
            entry_writes: 0,
            association_writes: 0,
        }
    }

    fn next_id(&self) -> i64 {
        self.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_content_references(&self, content: &Content) -> AppResult<()> {
        match &content.body {
            ContentBody::CollectionReference(reference) => {
                if !self.state.collections.contains_key(&reference.collection_id) {
                    return Err(AppError::internal(format!(
                        "Referenced collection {} does not exist",
                        reference.collection_id
                    )));
                }
            }
            ContentBody::Image(image) => {
                let refs = [
                    (CatalogKind::Camera, image.camera_id),
                    (CatalogKind::Lens, image.lens_id),
                    (CatalogKind::FilmType, image.film_type_id),
                    (CatalogKind::Location, image.location_id),
                ];
                for (kind, id) in refs {
                    if let Some(id) = id {
                        if !self.state.entity_exists(kind, id) {
                            return Err(AppError::internal(format!(
                                "Referenced {kind} {id} does not exist"
                            )));
                        }
                    }
                }
            }
            ContentBody::Text(_) | ContentBody::Gif(_) => {}
        }
        Ok(())
    }

    fn is_held(&self, content: ContentId) -> bool {
        self.state
            .entries
            .values()
            .any(|rows| rows.contains_key(&content))
    }
}

#[async_trait]
impl StoreTransaction for MemoryStoreTransaction {
    async fn find_collection(&mut self, id: CollectionId) -> AppResult<Option<Collection>> {
        Ok(self.state.collections.get(&id).cloned())
    }

    async fn find_collection_by_slug(&mut self, slug: &str) -> AppResult<Option<Collection>> {
        Ok(self
            .state
            .collections
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_collections(&mut self) -> AppResult<Vec<Collection>> {
        Ok(self.state.collections.values().cloned().collect())
    }

    async fn insert_collection(&mut self, data: &NewCollection) -> AppResult<Collection> {
        let slug = data.slug.clone().unwrap_or_else(|| slugify(&data.title));
        if self.state.collections.values().any(|c| c.slug == slug) {
            return Err(unique_violation(
                &format!("Failed to create collection '{slug}'"),
                "collections_slug_key",
            ));
        }

        let now = Utc::now();
        let collection = Collection {
            id: CollectionId::new(self.next_id()),
            kind: data.kind,
            title: data.title.trim().to_string(),
            slug,
            description: data.description.clone(),
            location_id: None,
            collection_date: data.collection_date,
            visible: data.visible,
            display_mode: data
                .display_mode
                .unwrap_or_else(|| data.kind.default_display_mode()),
            password_hash: data.password_hash.clone(),
            cover_content_id: None,
            content_version: 0,
            created_at: now,
            updated_at: now,
        };

        self.state
            .collections
            .insert(collection.id, collection.clone());
        self.dirty.collections.insert(collection.id);
        Ok(collection)
    }

    async fn update_collection(&mut self, collection: &Collection) -> AppResult<Collection> {
        let Some(stored) = self.state.collections.get(&collection.id) else {
            return Err(AppError::internal(format!(
                "Failed to update collection: {} does not exist",
                collection.id
            )));
        };
        if self
            .state
            .collections
            .values()
            .any(|c| c.id != collection.id && c.slug == collection.slug)
        {
            return Err(unique_violation(
                "Failed to update collection",
                "collections_slug_key",
            ));
        }

        let updated = Collection {
            content_version: stored.content_version,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..collection.clone()
        };
        self.state.collections.insert(updated.id, updated.clone());
        self.dirty.collections.insert(updated.id);
        Ok(updated)
    }

    async fn delete_collection(&mut self, id: CollectionId) -> AppResult<bool> {
        if !self.state.collections.contains_key(&id) {
            return Ok(false);
        }
        if self
            .state
            .contents
            .values()
            .any(|c| c.referenced_collection() == Some(id))
        {
            return Err(AppError::internal(format!(
                "Failed to delete collection: {id} is still referenced by content"
            )));
        }

        self.state.collections.remove(&id);
        self.dirty.collections.insert(id);
        if let Some(rows) = self.state.entries.remove(&id) {
            self.entry_writes += rows.len() as u64;
        }
        self.dirty.entries.insert(id);
        let key = (RelationKind::CollectionTags, id.get());
        self.state.associations.remove(&key);
        self.dirty.associations.entry(key).or_default().record_clear();
        Ok(true)
    }

    async fn bump_content_version(&mut self, id: CollectionId, expected: i64) -> AppResult<i64> {
        let committed = {
            let shared = self.shared.state.lock().await;
            shared.collections.get(&id).map(|c| c.content_version)
        };
        // A second bump within this transaction is checked against the
        // version the first one started from.
        let baseline = self.version_checks.get(&id).copied().unwrap_or(expected);
        let Some(collection) = self.state.collections.get_mut(&id) else {
            return Err(AppError::conflict(format!("Collection {id} no longer exists")));
        };
        let stale = collection.content_version != expected
            || committed.is_some_and(|version| version != baseline);
        if stale {
            warn!(collection_id = %id, expected, "Content version check failed");
            return Err(AppError::conflict(format!(
                "Collection {id} was modified concurrently (expected content version {expected})"
            )));
        }

        collection.content_version += 1;
        collection.updated_at = Utc::now();
        let version = collection.content_version;
        self.version_checks.entry(id).or_insert(expected);
        self.dirty.collections.insert(id);
        debug!(collection_id = %id, version, "Content version advanced");
        Ok(version)
    }

    async fn find_contents(&mut self, ids: &[ContentId]) -> AppResult<Vec<Content>> {
        let wanted: BTreeSet<ContentId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| self.state.contents.get(&id).cloned())
            .collect())
    }

    async fn insert_content(&mut self, draft: &ContentDraft) -> AppResult<Content> {
        let content = draft
            .clone()
            .into_content(ContentId::new(self.next_id()), Utc::now());
        self.check_content_references(&content)?;

        self.state.contents.insert(content.id, content.clone());
        self.dirty.contents.insert(content.id);
        Ok(content)
    }

    async fn update_content(&mut self, content: &Content) -> AppResult<Content> {
        let Some(stored) = self.state.contents.get(&content.id) else {
            return Err(AppError::internal(format!(
                "Failed to update content: {} does not exist",
                content.id
            )));
        };
        let updated = Content {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..content.clone()
        };
        self.check_content_references(&updated)?;

        self.state.contents.insert(updated.id, updated.clone());
        self.dirty.contents.insert(updated.id);
        Ok(updated)
    }

    async fn delete_content(&mut self, id: ContentId) -> AppResult<bool> {
        if !self.state.contents.contains_key(&id) {
            return Ok(false);
        }
        if self.is_held(id) {
            return Err(AppError::internal(format!(
                "Failed to delete content: {id} is still held by a collection"
            )));
        }

        self.state.contents.remove(&id);
        self.dirty.contents.insert(id);
        for relation in [RelationKind::ContentTags, RelationKind::ContentPeople] {
            let key = (relation, id.get());
            self.state.associations.remove(&key);
            self.dirty.associations.entry(key).or_default().record_clear();
        }
        for collection in self.state.collections.values_mut() {
            if collection.cover_content_id == Some(id) {
                collection.cover_content_id = None;
                self.dirty.collections.insert(collection.id);
            }
        }
        Ok(true)
    }

    async fn find_references_to(&mut self, collection: CollectionId) -> AppResult<Vec<ContentId>> {
        Ok(self
            .state
            .contents
            .values()
            .filter(|c| c.referenced_collection() == Some(collection))
            .map(|c| c.id)
            .collect())
    }

    async fn list_entries(&mut self, collection: CollectionId) -> AppResult<Vec<CollectionContent>> {
        let mut rows: Vec<CollectionContent> = self
            .state
            .entries
            .get(&collection)
            .map(|rows| rows.values().copied().collect())
            .unwrap_or_default();
        rows.sort_by_key(|r| (r.order_index, r.content_id));
        Ok(rows)
    }

    async fn list_memberships(&mut self, content: ContentId) -> AppResult<Vec<CollectionContent>> {
        Ok(self
            .state
            .entries
            .values()
            .filter_map(|rows| rows.get(&content).copied())
            .collect())
    }

    async fn insert_entries(&mut self, rows: &[CollectionContent]) -> AppResult<()> {
        for row in rows {
            if !self.state.collections.contains_key(&row.collection_id) {
                return Err(AppError::internal(format!(
                    "Failed to add content: collection {} does not exist",
                    row.collection_id
                )));
            }
            if !self.state.contents.contains_key(&row.content_id) {
                return Err(AppError::internal(format!(
                    "Failed to add content: content {} does not exist",
                    row.content_id
                )));
            }
            if row.order_index < 0 {
                return Err(AppError::internal(format!(
                    "Failed to add content: negative order index {}",
                    row.order_index
                )));
            }

            let table = self.state.entries.entry(row.collection_id).or_default();
            if table.contains_key(&row.content_id) {
                return Err(unique_violation(
                    "Failed to add content to collection",
                    "collection_content_pkey",
                ));
            }
            table.insert(row.content_id, *row);
            self.dirty.entries.insert(row.collection_id);
            self.entry_writes += 1;
        }
        Ok(())
    }

    async fn delete_entries(
        &mut self,
        collection: CollectionId,
        ids: &[ContentId],
    ) -> AppResult<u64> {
        let Some(table) = self.state.entries.get_mut(&collection) else {
            return Ok(0);
        };
        let removed = ids.iter().filter(|&id| table.remove(id).is_some()).count() as u64;
        if removed > 0 {
            self.dirty.entries.insert(collection);
            self.entry_writes += removed;
        }
        Ok(removed)
    }

    async fn apply_positions(
        &mut self,
        collection: CollectionId,
        positions: &[(ContentId, i32)],
    ) -> AppResult<u64> {
        let Some(table) = self.state.entries.get_mut(&collection) else {
            return Ok(0);
        };
        let mut written = 0;
        for &(id, index) in positions {
            if index < 0 {
                return Err(AppError::internal(format!(
                    "Failed to reorder collection content: negative order index {index}"
                )));
            }
            if let Some(row) = table.get_mut(&id) {
                row.order_index = index;
                written += 1;
            }
        }
        if written > 0 {
            self.dirty.entries.insert(collection);
            self.entry_writes += written;
        }
        Ok(written)
    }

    async fn apply_visibility(
        &mut self,
        collection: CollectionId,
        changes: &[(ContentId, bool)],
    ) -> AppResult<u64> {
        let Some(table) = self.state.entries.get_mut(&collection) else {
            return Ok(0);
        };
        let mut written = 0;
        for &(id, visible) in changes {
            if let Some(row) = table.get_mut(&id) {
                row.visible = visible;
                written += 1;
            }
        }
        if written > 0 {
            self.dirty.entries.insert(collection);
            self.entry_writes += written;
        }
        Ok(written)
    }

    async fn find_entities(
        &mut self,
        kind: CatalogKind,
        ids: &[EntityId],
    ) -> AppResult<Vec<NamedEntity>> {
        let Some(table) = self.state.entities.get(&kind) else {
            return Ok(Vec::new());
        };
        let wanted: BTreeSet<EntityId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| table.get(&id).cloned())
            .collect())
    }

    async fn find_entity_by_name(
        &mut self,
        kind: CatalogKind,
        name: &str,
    ) -> AppResult<Option<NamedEntity>> {
        Ok(self
            .state
            .entities
            .get(&kind)
            .and_then(|table| table.values().find(|e| e.matches_name(name)))
            .cloned())
    }

    async fn insert_entity(&mut self, kind: CatalogKind, name: &str) -> AppResult<NamedEntity> {
        if let Some(existing) = self.find_entity_by_name(kind, name).await? {
            return Ok(existing);
        }

        let entity = NamedEntity {
            id: EntityId::new(self.next_id()),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };
        self.state
            .entities
            .entry(kind)
            .or_default()
            .insert(entity.id, entity.clone());
        self.dirty.entities.insert((kind, entity.id));
        Ok(entity)
    }

    async fn list_entities(&mut self, kind: CatalogKind) -> AppResult<Vec<NamedEntity>> {
        let mut entities: Vec<NamedEntity> = self
            .state
            .entities
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default();
        entities.sort_by_key(|e| e.name.to_lowercase());
        Ok(entities)
    }

    async fn list_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
    ) -> AppResult<BTreeSet<EntityId>> {
        Ok(self
            .state
            .associations
            .get(&(relation, parent))
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        if !self.state.parent_exists(relation, parent) {
            return Err(AppError::internal(format!(
                "Failed to insert {relation}: parent {parent} does not exist"
            )));
        }
        let kind = relation.entity_kind();
        if let Some(missing) = ids.iter().find(|&&id| !self.state.entity_exists(kind, id)) {
            return Err(AppError::internal(format!(
                "Failed to insert {relation}: {kind} {missing} does not exist"
            )));
        }

        let key = (relation, parent);
        let set = self.state.associations.entry(key).or_default();
        let inserted: Vec<EntityId> = ids.iter().copied().filter(|&id| set.insert(id)).collect();
        if !inserted.is_empty() {
            let diff = self.dirty.associations.entry(key).or_default();
            for id in &inserted {
                diff.record_insert(*id);
            }
            self.association_writes += inserted.len() as u64;
        }
        Ok(())
    }

    async fn delete_associations(
        &mut self,
        relation: RelationKind,
        parent: i64,
        ids: &[EntityId],
    ) -> AppResult<()> {
        let key = (relation, parent);
        let Some(set) = self.state.associations.get_mut(&key) else {
            return Ok(());
        };
        let removed: Vec<EntityId> = ids.iter().copied().filter(|id| set.remove(id)).collect();
        if set.is_empty() {
            self.state.associations.remove(&key);
        }
        if !removed.is_empty() {
            let diff = self.dirty.associations.entry(key).or_default();
            for id in &removed {
                diff.record_delete(*id);
            }
            self.association_writes += removed.len() as u64;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut shared = self.shared.state.lock().await;

        for (id, expected) in &self.version_checks {
            if let Some(current) = shared.collections.get(id) {
                if current.content_version != *expected {
                    warn!(
                        collection_id = %id,
                        expected,
                        actual = current.content_version,
                        "Concurrent modification detected at commit"
                    );
                    return Err(AppError::conflict(format!(
                        "Collection {id} was modified concurrently \
                         (expected content version {expected})"
                    )));
                }
            }
        }

        let mut merged = shared.clone();
        merged.merge_from(&self.state, &self.dirty);
        merged.check_constraints(&self.dirty)?;
        *shared = merged;

        self.shared
            .entry_writes
            .fetch_add(self.entry_writes, Ordering::SeqCst);
        self.shared
            .association_writes
            .fetch_add(self.association_writes, Ordering::SeqCst);

        debug!(
            collections = self.dirty.collections.len(),
            contents = self.dirty.contents.len(),
            entry_writes = self.entry_writes,
            association_writes = self.association_writes,
            "Memory transaction committed"
        );
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        debug!("Memory transaction rolled back");
        Ok(())
    }
}
