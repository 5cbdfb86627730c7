//! Partial content update.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::delta::{AssociationDelta, MembershipDelta};
use super::reference::EntityRef;
use crate::catalog::NamedEntity;
use crate::collection::CollectionContent;
use crate::content::Content;

/// Changes to one content item and its associations. Absent fields are
/// untouched; image-only fields are rejected for other content kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContentUpdate {
    /// New title; empty clears.
    #[serde(default)]
    pub title: Option<String>,
    /// New description; empty clears.
    #[serde(default)]
    pub description: Option<String>,
    /// New preview URL; empty clears.
    #[serde(default)]
    pub preview_url: Option<String>,
    /// New text body (text content only).
    #[serde(default)]
    pub text_body: Option<String>,
    /// New star rating 0..=5 (images only).
    #[serde(default)]
    #[validate(range(min = 0, max = 5))]
    pub rating: Option<i16>,
    /// New monochrome flag (images only).
    #[serde(default)]
    pub black_and_white: Option<bool>,
    /// New capture date (images only).
    #[serde(default)]
    pub capture_date: Option<NaiveDate>,
    /// Camera reference (images only).
    #[serde(default)]
    pub camera: Option<EntityRef>,
    /// Lens reference (images only).
    #[serde(default)]
    pub lens: Option<EntityRef>,
    /// Film stock reference (images only).
    #[serde(default)]
    pub film_type: Option<EntityRef>,
    /// Location reference (images only).
    #[serde(default)]
    pub location: Option<EntityRef>,
    /// Tag association delta.
    #[serde(default)]
    pub tags: Option<AssociationDelta>,
    /// Person association delta.
    #[serde(default)]
    pub people: Option<AssociationDelta>,
    /// Collection membership delta.
    #[serde(default)]
    pub collections: Option<MembershipDelta>,
}

impl ContentUpdate {
    /// Whether any image-only field is set.
    pub fn has_image_fields(&self) -> bool {
        self.rating.is_some()
            || self.black_and_white.is_some()
            || self.capture_date.is_some()
            || self.camera.is_some()
            || self.lens.is_some()
            || self.film_type.is_some()
            || self.location.is_some()
    }
}

/// A content item with its resolved associations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAggregate {
    /// The content row.
    pub content: Content,
    /// Tags, sorted by name.
    pub tags: Vec<NamedEntity>,
    /// People, sorted by name.
    pub people: Vec<NamedEntity>,
    /// Every collection this content belongs to, with its position there.
    pub memberships: Vec<CollectionContent>,
}
