//! Table contents of the in-memory store and the commit-time constraint
//! checks PostgreSQL would otherwise enforce.

use std::collections::{BTreeMap, BTreeSet};

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId, EntityId};
use folio_entity::catalog::{CatalogKind, NamedEntity, ParentKind, RelationKind};
use folio_entity::collection::{Collection, CollectionContent};
use folio_entity::content::Content;

/// Every table of the store.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub collections: BTreeMap<CollectionId, Collection>,
    pub contents: BTreeMap<ContentId, Content>,
    pub entries: BTreeMap<CollectionId, BTreeMap<ContentId, CollectionContent>>,
    pub entities: BTreeMap<CatalogKind, BTreeMap<EntityId, NamedEntity>>,
    pub associations: BTreeMap<(RelationKind, i64), BTreeSet<EntityId>>,
}

/// Keys written by one transaction. Only these are merged on commit, so
/// transactions touching disjoint records never overwrite each other.
#[derive(Debug, Default)]
pub(crate) struct DirtyKeys {
    pub collections: BTreeSet<CollectionId>,
    pub contents: BTreeSet<ContentId>,
    pub entries: BTreeSet<CollectionId>,
    pub entities: BTreeSet<(CatalogKind, EntityId)>,
    pub associations: BTreeMap<(RelationKind, i64), AssociationDiff>,
}

/// Association rows one transaction inserted or deleted under a parent.
///
/// Association rows carry no version, so commit replays the row changes
/// onto the shared set instead of replacing it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct AssociationDiff {
    pub inserted: BTreeSet<EntityId>,
    pub deleted: BTreeSet<EntityId>,
    /// The parent was deleted; every row goes with it.
    pub cleared: bool,
}

impl AssociationDiff {
    /// Record a row that was absent from this transaction's view.
    pub fn record_insert(&mut self, id: EntityId) {
        if !self.deleted.remove(&id) {
            self.inserted.insert(id);
        }
    }

    /// Record a row that was present in this transaction's view.
    pub fn record_delete(&mut self, id: EntityId) {
        if !self.inserted.remove(&id) {
            self.deleted.insert(id);
        }
    }

    /// Record the cascade of a deleted parent.
    pub fn record_clear(&mut self) {
        self.inserted.clear();
        self.deleted.clear();
        self.cleared = true;
    }

    fn apply_to(&self, ids: &mut BTreeSet<EntityId>) {
        if self.cleared {
            ids.clear();
        }
        for id in &self.deleted {
            ids.remove(id);
        }
        ids.extend(self.inserted.iter().copied());
    }
}

impl MemoryState {
    /// Copy every dirty key of `source` into `self`; keys absent from
    /// `source` were deleted. Association rows are replayed from their diff.
    pub fn merge_from(&mut self, source: &MemoryState, dirty: &DirtyKeys) {
        for id in &dirty.collections {
            match source.collections.get(id) {
                Some(row) => self.collections.insert(*id, row.clone()),
                None => self.collections.remove(id),
            };
        }
        for id in &dirty.contents {
            match source.contents.get(id) {
                Some(row) => self.contents.insert(*id, row.clone()),
                None => self.contents.remove(id),
            };
        }
        for id in &dirty.entries {
            match source.entries.get(id) {
                Some(rows) => self.entries.insert(*id, rows.clone()),
                None => self.entries.remove(id),
            };
        }
        for (kind, id) in &dirty.entities {
            match source.entities.get(kind).and_then(|table| table.get(id)) {
                Some(row) => {
                    self.entities.entry(*kind).or_default().insert(*id, row.clone());
                }
                None => {
                    if let Some(table) = self.entities.get_mut(kind) {
                        table.remove(id);
                    }
                }
            }
        }
        for (key, diff) in &dirty.associations {
            let mut ids = self.associations.remove(key).unwrap_or_default();
            diff.apply_to(&mut ids);
            if !ids.is_empty() {
                self.associations.insert(*key, ids);
            }
        }
    }

    /// Unique and foreign-key constraints over the records `dirty` touched.
    pub fn check_constraints(&self, dirty: &DirtyKeys) -> AppResult<()> {
        for id in &dirty.collections {
            if let Some(collection) = self.collections.get(id) {
                let taken = self
                    .collections
                    .values()
                    .any(|other| other.id != *id && other.slug == collection.slug);
                if taken {
                    return Err(unique_violation(
                        &format!("Failed to save collection '{}'", collection.slug),
                        "collections_slug_key",
                    ));
                }
            }
        }

        for id in &dirty.entries {
            let Some(rows) = self.entries.get(id) else {
                continue;
            };
            if !self.collections.contains_key(id) {
                return Err(AppError::internal(format!(
                    "Collection {id} no longer exists but still has content rows"
                )));
            }
            let mut seen = BTreeSet::new();
            for row in rows.values() {
                if !self.contents.contains_key(&row.content_id) {
                    return Err(AppError::internal(format!(
                        "Content {} in collection {id} no longer exists",
                        row.content_id
                    )));
                }
                if !seen.insert(row.order_index) {
                    return Err(unique_violation(
                        &format!("Failed to commit collection {id}"),
                        "collection_content_order_key",
                    ));
                }
            }
        }

        for (kind, id) in &dirty.entities {
            let Some(table) = self.entities.get(kind) else {
                continue;
            };
            if let Some(entity) = table.get(id) {
                let taken = table
                    .values()
                    .any(|other| other.id != *id && other.matches_name(&entity.name));
                if taken {
                    return Err(unique_violation(
                        &format!("Failed to create {kind} '{}'", entity.name),
                        &format!("{}_name_lower_key", kind.table()),
                    ));
                }
            }
        }

        for ((relation, parent), diff) in &dirty.associations {
            if diff.inserted.is_empty() {
                continue;
            }
            if !self.parent_exists(*relation, *parent) {
                return Err(AppError::internal(format!(
                    "Failed to commit {relation}: parent {parent} no longer exists"
                )));
            }
        }

        Ok(())
    }

    /// Whether the parent side of an association exists.
    pub fn parent_exists(&self, relation: RelationKind, parent: i64) -> bool {
        match relation.parent_kind() {
            ParentKind::Content => {
                self.contents.contains_key(&ContentId::new(parent))
            }
            ParentKind::Collection => {
                self.collections.contains_key(&CollectionId::new(parent))
            }
        }
    }

    /// Whether an entity of `kind` exists.
    pub fn entity_exists(&self, kind: CatalogKind, id: EntityId) -> bool {
        self.entities
            .get(&kind)
            .is_some_and(|table| table.contains_key(&id))
    }
}

/// The conflict a unique index would raise.
pub(crate) fn unique_violation(message: &str, constraint: &str) -> AppError {
    AppError::conflict(format!("{message}: constraint '{constraint}' violated"))
}
