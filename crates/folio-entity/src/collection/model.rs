//! Collection entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use folio_core::types::{CollectionId, ContentId, EntityId};

use super::kind::{CollectionKind, DisplayMode};

/// A named, typed container of ordered content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    /// Unique collection identifier.
    pub id: CollectionId,
    /// Blog, gallery, portfolio, ...
    pub kind: CollectionKind,
    /// Display title.
    pub title: String,
    /// Globally unique URL slug.
    pub slug: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Location catalog entity.
    pub location_id: Option<EntityId>,
    /// The date the collection is about (shoot date, post date).
    pub collection_date: Option<NaiveDate>,
    /// Whether the collection is publicly listed.
    pub visible: bool,
    /// How content is presented on read paths.
    pub display_mode: DisplayMode,
    /// Password hash for protected galleries. Verified elsewhere.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Content used as the collection's cover.
    pub cover_content_id: Option<ContentId>,
    /// Optimistic-concurrency counter for the collection's content set.
    pub content_version: i64,
    /// When the collection was created.
    pub created_at: DateTime<Utc>,
    /// When the collection was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Check if the collection is password-protected.
    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Data required to create a new collection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCollection {
    /// Blog, gallery, portfolio, ...
    pub kind: CollectionKind,
    /// Display title.
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// URL slug. Derived from the title when absent.
    #[validate(length(min = 1, max = 150))]
    #[serde(default)]
    pub slug: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// The date the collection is about.
    #[serde(default)]
    pub collection_date: Option<NaiveDate>,
    /// Whether the collection is publicly listed.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Display mode; defaults from the kind.
    #[serde(default)]
    pub display_mode: Option<DisplayMode>,
    /// Pre-computed password hash.
    #[serde(default)]
    pub password_hash: Option<String>,
}

/// Scalar fields of a partial collection update. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CollectionPatch {
    /// New title.
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub title: Option<String>,
    /// New slug.
    #[validate(length(min = 1, max = 150))]
    #[serde(default)]
    pub slug: Option<String>,
    /// New description; an empty string clears it.
    #[serde(default)]
    pub description: Option<String>,
    /// New collection date.
    #[serde(default)]
    pub collection_date: Option<NaiveDate>,
    /// New visibility.
    #[serde(default)]
    pub visible: Option<bool>,
    /// New display mode.
    #[serde(default)]
    pub display_mode: Option<DisplayMode>,
    /// New cover content; must be a member of the collection after the update.
    #[serde(default)]
    pub cover_content_id: Option<ContentId>,
    /// New password hash; an empty string removes protection.
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl CollectionPatch {
    /// Whether the patch carries any scalar change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.collection_date.is_none()
            && self.visible.is_none()
            && self.display_mode.is_none()
            && self.cover_content_id.is_none()
            && self.password_hash.is_none()
    }

    /// Apply the patch to a loaded collection in place.
    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(title) = &self.title {
            collection.title = title.trim().to_string();
        }
        if let Some(slug) = &self.slug {
            collection.slug = slug.clone();
        }
        if let Some(description) = &self.description {
            collection.description = non_empty(description);
        }
        if let Some(date) = self.collection_date {
            collection.collection_date = Some(date);
        }
        if let Some(visible) = self.visible {
            collection.visible = visible;
        }
        if let Some(mode) = self.display_mode {
            collection.display_mode = mode;
        }
        if let Some(cover) = self.cover_content_id {
            collection.cover_content_id = Some(cover);
        }
        if let Some(hash) = &self.password_hash {
            collection.password_hash = non_empty(hash);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn default_visible() -> bool {
    true
}
