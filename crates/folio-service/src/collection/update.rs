//! Bundled partial collection updates.

use tracing::{debug, info};

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId};
use folio_entity::catalog::{CatalogKind, RelationKind};
use folio_entity::collection::slug;
use folio_entity::update::{CollectionAggregate, CollectionUpdate};
use validator::Validate;

use super::read::load_aggregate;
use super::service::{CollectionService, resolve_moves, resolve_visibility};
use crate::content::draft::resolve_draft;
use crate::ordering::PlaceholderMap;

impl CollectionService {
    /// Applies a partial update in one transaction.
    ///
    /// Steps run in a fixed order: scalar fields and location, tags,
    /// removals, creation of new content, additions (created content first,
    /// then existing content), visibility, reorder, then the cover check.
    /// Reorder and visibility entries may name content created by this
    /// request through negative placeholders (`-1` is the first new item).
    /// Any failure rolls back the entire request.
    pub async fn update_collection(
        &self,
        id: CollectionId,
        update: CollectionUpdate,
    ) -> AppResult<CollectionAggregate> {
        self.validate_update(&update)?;

        let mut tx = self.store.begin().await?;
        let mut collection = self.editor.lock(tx.as_mut(), id).await?;

        update.fields.apply_to(&mut collection);
        collection.location_id = self
            .resolver
            .apply_ref(
                tx.as_mut(),
                CatalogKind::Location,
                update.location.as_ref(),
                collection.location_id,
            )
            .await?;

        self.reconciler
            .apply_optional(
                tx.as_mut(),
                RelationKind::CollectionTags,
                id.get(),
                update.tags.as_ref(),
            )
            .await?;

        if !update.remove_content.is_empty() {
            self.editor
                .remove(tx.as_mut(), id, &update.remove_content)
                .await?;
            if collection
                .cover_content_id
                .is_some_and(|cover| update.remove_content.contains(&cover))
                && update.fields.cover_content_id.is_none()
            {
                collection.cover_content_id = None;
            }
        }

        let mut created = Vec::with_capacity(update.new_content.len());
        for new in &update.new_content {
            let draft = resolve_draft(tx.as_mut(), &self.resolver, new).await?;
            created.push(tx.insert_content(&draft).await?.id);
        }
        let placeholders = PlaceholderMap::new(created);

        let additions: Vec<(ContentId, bool)> = placeholders
            .created()
            .iter()
            .chain(&update.add_content)
            .map(|content| (*content, true))
            .collect();
        self.editor
            .insert(tx.as_mut(), id, &additions, None)
            .await?;

        let visibility = resolve_visibility(&placeholders, &update.visibility)?;
        self.editor
            .set_visibility(tx.as_mut(), id, &visibility)
            .await?;

        let moves = resolve_moves(&placeholders, &update.reorder)?;
        let moved = if moves.is_empty() {
            Vec::new()
        } else {
            self.editor
                .coordinator()
                .apply(tx.as_mut(), id, &moves)
                .await?
        };

        if let Some(cover) = collection.cover_content_id {
            let rows = tx.list_entries(id).await?;
            if !rows.iter().any(|r| r.content_id == cover) {
                return Err(AppError::invalid_argument(format!(
                    "Cover content {cover} is not in collection {id}"
                )));
            }
        }

        tx.update_collection(&collection).await?;
        let aggregate = load_aggregate(tx.as_mut(), id).await?;
        tx.commit().await?;

        debug!(
            collection_id = %id,
            created = ?placeholders.created(),
            moved = moved.len(),
            "Collection update applied"
        );
        info!(
            collection_id = %id,
            content_version = aggregate.collection.content_version,
            entries = aggregate.content.len(),
            "Collection updated"
        );
        Ok(aggregate)
    }

    fn validate_update(&self, update: &CollectionUpdate) -> AppResult<()> {
        update.fields.validate()?;
        if let Some(title) = &update.fields.title {
            if title.trim().is_empty() {
                return Err(AppError::invalid_argument("Collection title cannot be blank"));
            }
        }
        if let Some(s) = &update.fields.slug {
            if !slug::is_valid_slug(s) {
                return Err(AppError::invalid_argument(format!(
                    "Invalid slug '{s}': use lowercase letters, digits and dashes"
                )));
            }
        }
        if update.new_content.len() > self.config.max_new_content {
            return Err(AppError::invalid_argument(format!(
                "Too many new content items: {} (maximum {})",
                update.new_content.len(),
                self.config.max_new_content
            )));
        }
        self.editor.coordinator().check_batch(update.reorder.len())?;
        Ok(())
    }
}
