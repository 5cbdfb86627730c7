//! Keep/create/remove deltas for many-to-many associations.

use serde::{Deserialize, Serialize};

use folio_core::types::{CollectionId, EntityId};

/// A partial change to the set of catalog entities associated with a parent.
///
/// The final set is `keep ∪ resolve(create) − remove`. An absent field is
/// treated as empty, so an empty delta clears the association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDelta {
    /// Existing entity ids to retain or add.
    #[serde(default)]
    pub keep: Option<Vec<EntityId>>,
    /// Names to reuse (case-insensitive match) or create.
    #[serde(default)]
    pub create: Option<Vec<String>>,
    /// Entity ids to drop. Wins over `keep` and `create`.
    #[serde(default)]
    pub remove: Option<Vec<EntityId>>,
}

impl AssociationDelta {
    /// A delta that retains exactly the given ids.
    pub fn keep(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            keep: Some(ids.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Ids listed in `keep`.
    pub fn keep_ids(&self) -> &[EntityId] {
        self.keep.as_deref().unwrap_or_default()
    }

    /// Names listed in `create`.
    pub fn create_names(&self) -> &[String] {
        self.create.as_deref().unwrap_or_default()
    }

    /// Ids listed in `remove`.
    pub fn remove_ids(&self) -> &[EntityId] {
        self.remove.as_deref().unwrap_or_default()
    }
}

/// A new or retained link from a content to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipLink {
    /// The target collection.
    pub collection_id: CollectionId,
    /// Collection-local visibility; defaults to visible for new links.
    #[serde(default)]
    pub visible: Option<bool>,
    /// Explicit position; appended at the end when absent.
    #[serde(default)]
    pub order_index: Option<i32>,
}

impl MembershipLink {
    /// Append to the end of `collection_id`, visible.
    pub fn append(collection_id: CollectionId) -> Self {
        Self {
            collection_id,
            visible: None,
            order_index: None,
        }
    }
}

/// A partial change to the collections a content belongs to.
///
/// The final membership is `keep ∪ add − remove`; current memberships not
/// named in `keep` or `add` are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDelta {
    /// Current memberships to retain.
    #[serde(default)]
    pub keep: Option<Vec<CollectionId>>,
    /// Collections to join.
    #[serde(default)]
    pub add: Option<Vec<MembershipLink>>,
    /// Collections to leave. Wins over `keep` and `add`.
    #[serde(default)]
    pub remove: Option<Vec<CollectionId>>,
}

impl MembershipDelta {
    /// Ids listed in `keep`.
    pub fn keep_ids(&self) -> &[CollectionId] {
        self.keep.as_deref().unwrap_or_default()
    }

    /// Links listed in `add`.
    pub fn add_links(&self) -> &[MembershipLink] {
        self.add.as_deref().unwrap_or_default()
    }

    /// Ids listed in `remove`.
    pub fn remove_ids(&self) -> &[CollectionId] {
        self.remove.as_deref().unwrap_or_default()
    }
}
