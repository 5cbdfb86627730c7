//! Content creation and partial updates.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use folio_core::config::EngineConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::ContentId;
use folio_database::{ContentStore, StoreTransaction};
use folio_entity::catalog::{CatalogKind, RelationKind};
use folio_entity::content::{ContentBody, ContentKind, NewContent};
use folio_entity::update::{ContentAggregate, ContentUpdate};
use validator::Validate;

use super::draft::{non_blank, resolve_draft};
use super::membership::apply_membership;
use crate::association::RelationshipReconciler;
use crate::catalog::EntityResolver;
use crate::collection::editor::MembershipEditor;
use crate::collection::read::{load_associated, require_content};

/// Creates content and applies partial updates to it, including its tags,
/// people and collection memberships.
#[derive(Debug, Clone)]
pub struct ContentService {
    /// Persistence.
    store: Arc<dyn ContentStore>,
    /// Camera, lens, film type and location references.
    resolver: EntityResolver,
    /// Tag and person reconciliation.
    reconciler: RelationshipReconciler,
    /// Membership edits.
    editor: MembershipEditor,
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(store: Arc<dyn ContentStore>, config: EngineConfig) -> Self {
        Self {
            resolver: EntityResolver::new(),
            reconciler: RelationshipReconciler::new(Arc::clone(&store), config.clone()),
            editor: MembershipEditor::new(config),
            store,
        }
    }

    /// Creates a standalone content item that belongs to no collection.
    pub async fn create_content(&self, new: NewContent) -> AppResult<ContentAggregate> {
        let mut tx = self.store.begin().await?;
        let draft = resolve_draft(tx.as_mut(), &self.resolver, &new).await?;
        let content = tx.insert_content(&draft).await?;
        let aggregate = load_content_aggregate(tx.as_mut(), content.id).await?;
        tx.commit().await?;

        info!(content_id = %content.id, kind = %content.kind(), "Content created");
        Ok(aggregate)
    }

    /// The content with its tags, people and memberships.
    pub async fn get_content(&self, id: ContentId) -> AppResult<ContentAggregate> {
        let mut tx = self.store.begin().await?;
        let aggregate = load_content_aggregate(tx.as_mut(), id).await?;
        tx.rollback().await?;
        Ok(aggregate)
    }

    /// Applies a partial update in one transaction. Absent fields are left
    /// untouched; empty strings clear optional text fields.
    pub async fn update_content(
        &self,
        id: ContentId,
        update: ContentUpdate,
    ) -> AppResult<ContentAggregate> {
        update.validate()?;

        let mut tx = self.store.begin().await?;
        let original = require_content(tx.as_mut(), id).await?;
        let kind = original.kind();
        if update.has_image_fields() && kind != ContentKind::Image {
            return Err(AppError::invalid_argument(format!(
                "Image fields cannot be set on {kind} content {id}"
            )));
        }
        if update.text_body.is_some() && kind != ContentKind::Text {
            return Err(AppError::invalid_argument(format!(
                "A text body cannot be set on {kind} content {id}"
            )));
        }

        let mut content = original.clone();
        if let Some(title) = &update.title {
            content.title = non_blank(Some(title));
        }
        if let Some(description) = &update.description {
            content.description = non_blank(Some(description));
        }
        if let Some(preview_url) = &update.preview_url {
            content.preview_url = non_blank(Some(preview_url));
        }
        match &mut content.body {
            ContentBody::Text(text) => {
                if let Some(body) = &update.text_body {
                    if body.trim().is_empty() {
                        return Err(AppError::invalid_argument("Text content body cannot be blank"));
                    }
                    text.body = body.clone();
                }
            }
            ContentBody::Image(image) => {
                if let Some(rating) = update.rating {
                    image.rating = Some(rating);
                }
                if let Some(bw) = update.black_and_white {
                    image.black_and_white = bw;
                }
                if let Some(date) = update.capture_date {
                    image.capture_date = Some(date);
                }
                image.camera_id = self
                    .resolver
                    .apply_ref(tx.as_mut(), CatalogKind::Camera, update.camera.as_ref(), image.camera_id)
                    .await?;
                image.lens_id = self
                    .resolver
                    .apply_ref(tx.as_mut(), CatalogKind::Lens, update.lens.as_ref(), image.lens_id)
                    .await?;
                image.film_type_id = self
                    .resolver
                    .apply_ref(
                        tx.as_mut(),
                        CatalogKind::FilmType,
                        update.film_type.as_ref(),
                        image.film_type_id,
                    )
                    .await?;
                image.location_id = self
                    .resolver
                    .apply_ref(
                        tx.as_mut(),
                        CatalogKind::Location,
                        update.location.as_ref(),
                        image.location_id,
                    )
                    .await?;
            }
            ContentBody::Gif(_) | ContentBody::CollectionReference(_) => {}
        }

        let changed = content != original;
        if changed {
            content.updated_at = Utc::now();
            tx.update_content(&content).await?;
        }

        self.reconciler
            .apply_optional(tx.as_mut(), RelationKind::ContentTags, id.get(), update.tags.as_ref())
            .await?;
        self.reconciler
            .apply_optional(
                tx.as_mut(),
                RelationKind::ContentPeople,
                id.get(),
                update.people.as_ref(),
            )
            .await?;
        if let Some(delta) = &update.collections {
            apply_membership(tx.as_mut(), &self.editor, id, delta).await?;
        }

        let aggregate = load_content_aggregate(tx.as_mut(), id).await?;
        tx.commit().await?;

        info!(
            content_id = %id,
            fields_changed = changed,
            memberships = aggregate.memberships.len(),
            "Content updated"
        );
        Ok(aggregate)
    }
}

async fn load_content_aggregate(
    tx: &mut dyn StoreTransaction,
    id: ContentId,
) -> AppResult<ContentAggregate> {
    let content = require_content(tx, id).await?;
    let tags = load_associated(tx, RelationKind::ContentTags, id.get()).await?;
    let people = load_associated(tx, RelationKind::ContentPeople, id.get()).await?;
    let memberships = tx.list_memberships(id).await?;

    Ok(ContentAggregate {
        content,
        tags,
        people,
        memberships,
    })
}
