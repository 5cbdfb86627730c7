//! Collection lifecycle and content ordering operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use folio_core::config::EngineConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_database::ContentStore;
use folio_entity::collection::{Collection, NewCollection, OrderedContentList, slug};
use folio_entity::update::{CollectionAggregate, ContentRef, ReorderItem, VisibilityChange};
use validator::Validate;

use super::editor::MembershipEditor;
use super::integrity::IntegrityReport;
use super::read::{load_aggregate, load_ordered, require_collection};
use crate::association::RelationshipReconciler;
use crate::catalog::EntityResolver;
use crate::ordering::{OrderIndexAllocator, PlaceholderMap};

/// Creates, reads, deletes and edits collections and their ordered content.
///
/// Every mutating method runs in a single store transaction and advances the
/// collection's content version, so two writers starting from the same
/// version cannot both commit.
#[derive(Debug, Clone)]
pub struct CollectionService {
    /// Persistence.
    pub(super) store: Arc<dyn ContentStore>,
    /// Tag reconciliation.
    pub(super) reconciler: RelationshipReconciler,
    /// Location and draft references.
    pub(super) resolver: EntityResolver,
    /// Membership edits and reorders.
    pub(super) editor: MembershipEditor,
    /// Request limits.
    pub(super) config: EngineConfig,
}

impl CollectionService {
    /// Creates a new collection service.
    pub fn new(store: Arc<dyn ContentStore>, config: EngineConfig) -> Self {
        Self {
            reconciler: RelationshipReconciler::new(Arc::clone(&store), config.clone()),
            resolver: EntityResolver::new(),
            editor: MembershipEditor::new(config.clone()),
            store,
            config,
        }
    }

    /// Creates an empty collection. The slug is derived from the title when
    /// none is given.
    pub async fn create_collection(&self, data: NewCollection) -> AppResult<CollectionAggregate> {
        data.validate()?;
        if data.title.trim().is_empty() {
            return Err(AppError::invalid_argument("Collection title cannot be blank"));
        }
        match &data.slug {
            Some(s) if !slug::is_valid_slug(s) => {
                return Err(AppError::invalid_argument(format!(
                    "Invalid slug '{s}': use lowercase letters, digits and dashes"
                )));
            }
            None if slug::slugify(&data.title).is_empty() => {
                return Err(AppError::invalid_argument(format!(
                    "Cannot derive a slug from title '{}'; provide one explicitly",
                    data.title
                )));
            }
            _ => {}
        }

        let mut tx = self.store.begin().await?;
        let collection = tx.insert_collection(&data).await?;
        let aggregate = load_aggregate(tx.as_mut(), collection.id).await?;
        tx.commit().await?;

        info!(
            collection_id = %collection.id,
            slug = %collection.slug,
            kind = %collection.kind,
            "Collection created"
        );
        Ok(aggregate)
    }

    /// The collection with its location, tags and ordered content.
    pub async fn get_collection(&self, id: CollectionId) -> AppResult<CollectionAggregate> {
        let mut tx = self.store.begin().await?;
        let aggregate = load_aggregate(tx.as_mut(), id).await?;
        tx.rollback().await?;
        Ok(aggregate)
    }

    /// Looks a collection up by its slug.
    pub async fn get_collection_by_slug(&self, slug: &str) -> AppResult<CollectionAggregate> {
        let mut tx = self.store.begin().await?;
        let collection = tx
            .find_collection_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Collection '{slug}' not found")))?;
        let aggregate = load_aggregate(tx.as_mut(), collection.id).await?;
        tx.rollback().await?;
        Ok(aggregate)
    }

    /// Every collection, without content.
    pub async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        let mut tx = self.store.begin().await?;
        let collections = tx.list_collections().await?;
        tx.rollback().await?;
        Ok(collections)
    }

    /// The collection's content in display order.
    pub async fn ordered_content(&self, id: CollectionId) -> AppResult<OrderedContentList> {
        let mut tx = self.store.begin().await?;
        let list = load_ordered(tx.as_mut(), id).await?;
        tx.rollback().await?;
        Ok(list)
    }

    /// Deletes a collection.
    ///
    /// Content stays in the store. Reference content pointing at the
    /// collection is removed from every collection holding it and deleted,
    /// and those collections are compacted.
    pub async fn delete_collection(&self, id: CollectionId) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        self.editor.lock(tx.as_mut(), id).await?;

        let references = tx.find_references_to(id).await?;
        let mut holders: BTreeMap<CollectionId, Vec<ContentId>> = BTreeMap::new();
        for reference in &references {
            for membership in tx.list_memberships(*reference).await? {
                holders
                    .entry(membership.collection_id)
                    .or_default()
                    .push(*reference);
            }
        }
        for (holder, ids) in &holders {
            self.editor.lock(tx.as_mut(), *holder).await?;
            self.editor.remove(tx.as_mut(), *holder, ids).await?;
            self.editor.clear_cover(tx.as_mut(), *holder, ids).await?;
        }
        for reference in &references {
            tx.delete_content(*reference).await?;
        }

        if !tx.delete_collection(id).await? {
            return Err(AppError::not_found(format!("Collection {id} not found")));
        }
        tx.commit().await?;

        info!(
            collection_id = %id,
            references_removed = references.len(),
            collections_touched = holders.len(),
            "Collection deleted"
        );
        Ok(())
    }

    /// Moves each named item to its target index; every other item keeps
    /// its relative order and fills the remaining positions.
    ///
    /// A batch that leaves the order unchanged writes nothing and does not
    /// advance the content version.
    pub async fn reorder_content(
        &self,
        id: CollectionId,
        items: &[ReorderItem],
    ) -> AppResult<OrderedContentList> {
        let moves = resolve_moves(&PlaceholderMap::empty(), items)?;

        let mut tx = self.store.begin().await?;
        let collection = require_collection(tx.as_mut(), id).await?;
        let rows = tx.list_entries(id).await?;
        let positions = self.editor.coordinator().plan(&rows, &moves)?;

        if positions.is_empty() {
            let list = load_ordered(tx.as_mut(), id).await?;
            tx.rollback().await?;
            info!(collection_id = %id, requested = moves.len(), "Reorder left order unchanged");
            return Ok(list);
        }

        tx.bump_content_version(id, collection.content_version)
            .await?;
        tx.apply_positions(id, &positions).await?;
        let list = load_ordered(tx.as_mut(), id).await?;
        tx.commit().await?;

        info!(
            collection_id = %id,
            requested = moves.len(),
            moved = positions.len(),
            content_version = list.content_version,
            "Collection reordered"
        );
        Ok(list)
    }

    /// Adds existing content, appended in the given order or inserted as a
    /// block at `insert_at`.
    pub async fn add_content(
        &self,
        id: CollectionId,
        content: &[ContentRef],
        insert_at: Option<i32>,
    ) -> AppResult<OrderedContentList> {
        let ids = PlaceholderMap::empty().resolve_all(content)?;

        let mut tx = self.store.begin().await?;
        self.editor.lock(tx.as_mut(), id).await?;
        let items: Vec<(ContentId, bool)> = ids.iter().map(|c| (*c, true)).collect();
        self.editor.insert(tx.as_mut(), id, &items, insert_at).await?;
        let list = load_ordered(tx.as_mut(), id).await?;
        tx.commit().await?;

        info!(collection_id = %id, added = ids.len(), "Content added");
        Ok(list)
    }

    /// Removes content from the collection and closes the gaps. The content
    /// itself is kept.
    pub async fn remove_content(
        &self,
        id: CollectionId,
        content: &[ContentId],
    ) -> AppResult<OrderedContentList> {
        let mut tx = self.store.begin().await?;
        self.editor.lock(tx.as_mut(), id).await?;
        self.editor.remove(tx.as_mut(), id, content).await?;
        self.editor.clear_cover(tx.as_mut(), id, content).await?;
        let list = load_ordered(tx.as_mut(), id).await?;
        tx.commit().await?;

        info!(collection_id = %id, removed = content.len(), "Content removed");
        Ok(list)
    }

    /// Shows or hides content within this collection only.
    pub async fn set_visibility(
        &self,
        id: CollectionId,
        changes: &[VisibilityChange],
    ) -> AppResult<OrderedContentList> {
        let changes = resolve_visibility(&PlaceholderMap::empty(), changes)?;

        let mut tx = self.store.begin().await?;
        self.editor.lock(tx.as_mut(), id).await?;
        let written = self.editor.set_visibility(tx.as_mut(), id, &changes).await?;
        let list = load_ordered(tx.as_mut(), id).await?;
        tx.commit().await?;

        info!(collection_id = %id, written, "Visibility updated");
        Ok(list)
    }

    /// Reports gaps, duplicates and out-of-range order indices.
    pub async fn check_integrity(&self, id: CollectionId) -> AppResult<IntegrityReport> {
        let mut tx = self.store.begin().await?;
        let collection = require_collection(tx.as_mut(), id).await?;
        let rows = tx.list_entries(id).await?;
        tx.rollback().await?;

        let report = IntegrityReport::inspect(id, collection.content_version, &rows);
        if !report.is_consistent() {
            warn!(
                collection_id = %id,
                gaps = ?report.gaps,
                duplicates = ?report.duplicates,
                out_of_range = ?report.out_of_range,
                "Collection order is inconsistent"
            );
        }
        Ok(report)
    }

    /// Renumbers the collection to `0..n`, keeping the current relative
    /// order, and returns the report after the repair.
    pub async fn repair(&self, id: CollectionId) -> AppResult<IntegrityReport> {
        let mut tx = self.store.begin().await?;
        let collection = require_collection(tx.as_mut(), id).await?;
        let rows = tx.list_entries(id).await?;
        if IntegrityReport::inspect(id, collection.content_version, &rows).is_consistent() {
            tx.rollback().await?;
            return self.check_integrity(id).await;
        }

        let version = tx
            .bump_content_version(id, collection.content_version)
            .await?;
        let moved = OrderIndexAllocator::new().compact(tx.as_mut(), id).await?;
        let rows = tx.list_entries(id).await?;
        tx.commit().await?;

        info!(collection_id = %id, moved, "Collection order repaired");
        Ok(IntegrityReport::inspect(id, version, &rows))
    }
}

/// Rewrite reorder items to concrete `(content, target)` pairs.
pub(super) fn resolve_moves(
    placeholders: &PlaceholderMap,
    items: &[ReorderItem],
) -> AppResult<Vec<(ContentId, i32)>> {
    items
        .iter()
        .map(|item| Ok((placeholders.resolve(item.content_id)?, item.new_index)))
        .collect()
}

/// Rewrite visibility changes to concrete `(content, visible)` pairs.
pub(super) fn resolve_visibility(
    placeholders: &PlaceholderMap,
    changes: &[VisibilityChange],
) -> AppResult<Vec<(ContentId, bool)>> {
    changes
        .iter()
        .map(|change| Ok((placeholders.resolve(change.content_id)?, change.visible)))
        .collect()
}
