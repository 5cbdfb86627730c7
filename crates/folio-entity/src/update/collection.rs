//! Partial collection update and the aggregate returned after it commits.

use serde::{Deserialize, Serialize};

use folio_core::types::ContentId;

use super::delta::AssociationDelta;
use super::reference::EntityRef;
use super::reorder::{ReorderItem, VisibilityChange};
use crate::catalog::NamedEntity;
use crate::collection::{Collection, CollectionPatch, OrderedContentList};
use crate::content::NewContent;

/// Everything a single collection update may bundle. All sub-operations
/// commit or fail together.
///
/// Sub-operations are applied in a fixed order: scalar fields and location,
/// tag delta, content removal, content creation, content addition,
/// visibility changes, and finally the reorder batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionUpdate {
    /// Scalar field changes.
    #[serde(flatten)]
    pub fields: CollectionPatch,
    /// Location reference change.
    #[serde(default)]
    pub location: Option<EntityRef>,
    /// Tag association delta.
    #[serde(default)]
    pub tags: Option<AssociationDelta>,
    /// Content removed from this collection (the content itself survives).
    #[serde(default)]
    pub remove_content: Vec<ContentId>,
    /// Content created and appended by this request. Addressed by
    /// placeholders `-1`, `-2`, ... in `reorder` and `visibility`.
    #[serde(default)]
    pub new_content: Vec<NewContent>,
    /// Existing content appended to this collection.
    #[serde(default)]
    pub add_content: Vec<ContentId>,
    /// Collection-local visibility changes.
    #[serde(default)]
    pub visibility: Vec<VisibilityChange>,
    /// Partial reorder batch.
    #[serde(default)]
    pub reorder: Vec<ReorderItem>,
}

/// A collection with its resolved metadata and ordered content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionAggregate {
    /// The collection row.
    pub collection: Collection,
    /// Resolved location entity.
    pub location: Option<NamedEntity>,
    /// Tags, sorted by name.
    pub tags: Vec<NamedEntity>,
    /// Ordered content.
    pub content: OrderedContentList,
}
