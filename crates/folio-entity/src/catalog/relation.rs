//! Many-to-many association kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::kind::CatalogKind;

/// The parent side of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Content,
    Collection,
}

/// A many-to-many relation between a parent record and a catalog kind.
///
/// The same reconciliation algorithm serves every relation; only the join
/// table and the entity kind vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// content ↔ tag
    ContentTags,
    /// content ↔ person
    ContentPeople,
    /// collection ↔ tag
    CollectionTags,
}

impl RelationKind {
    /// The catalog kind on the entity side.
    pub fn entity_kind(&self) -> CatalogKind {
        match self {
            Self::ContentTags | Self::CollectionTags => CatalogKind::Tag,
            Self::ContentPeople => CatalogKind::Person,
        }
    }

    /// The parent side.
    pub fn parent_kind(&self) -> ParentKind {
        match self {
            Self::ContentTags | Self::ContentPeople => ParentKind::Content,
            Self::CollectionTags => ParentKind::Collection,
        }
    }

    /// Join table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::ContentTags => "content_tags",
            Self::ContentPeople => "content_people",
            Self::CollectionTags => "collection_tags",
        }
    }

    /// Parent key column in the join table.
    pub fn parent_column(&self) -> &'static str {
        match self.parent_kind() {
            ParentKind::Content => "content_id",
            ParentKind::Collection => "collection_id",
        }
    }

    /// Entity key column in the join table.
    pub fn entity_column(&self) -> &'static str {
        match self.entity_kind() {
            CatalogKind::Tag => "tag_id",
            CatalogKind::Person => "person_id",
            CatalogKind::Camera => "camera_id",
            CatalogKind::Lens => "lens_id",
            CatalogKind::Location => "location_id",
            CatalogKind::FilmType => "film_type_id",
        }
    }

    /// Return the relation as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentTags => "content_tags",
            Self::ContentPeople => "content_people",
            Self::CollectionTags => "collection_tags",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
