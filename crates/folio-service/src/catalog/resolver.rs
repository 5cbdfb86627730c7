//! Existing-or-create resolution of catalog references.

use tracing::debug;

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::EntityId;
use folio_database::StoreTransaction;
use folio_entity::catalog::{CatalogKind, NamedEntity};
use folio_entity::update::EntityRef;

use crate::association::reconcile::MAX_NAME_LEN;

/// Turns ids and names into canonical catalog entities.
///
/// A name resolves to the entity already holding it (ignoring case) or to a
/// newly created one. Resolution happens on the caller's transaction, so an
/// entity created earlier in the same request is found again.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityResolver;

impl EntityResolver {
    /// Creates a new resolver.
    pub fn new() -> Self {
        Self
    }

    /// Reuse the entity named `name` or create it.
    pub async fn resolve_name(
        &self,
        tx: &mut dyn StoreTransaction,
        kind: CatalogKind,
        name: &str,
    ) -> AppResult<NamedEntity> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_argument(format!(
                "A {kind} name cannot be blank"
            )));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::invalid_argument(format!(
                "{kind} name '{name}' exceeds {MAX_NAME_LEN} characters"
            )));
        }

        if let Some(existing) = tx.find_entity_by_name(kind, name).await? {
            debug!(kind = %kind, id = %existing.id, name, "Reusing catalog entity");
            return Ok(existing);
        }

        let created = tx.insert_entity(kind, name).await?;
        debug!(kind = %kind, id = %created.id, name, "Created catalog entity");
        Ok(created)
    }

    /// Resolve several names, in order.
    pub async fn resolve_names(
        &self,
        tx: &mut dyn StoreTransaction,
        kind: CatalogKind,
        names: &[String],
    ) -> AppResult<Vec<EntityId>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(self.resolve_name(tx, kind, name).await?.id);
        }
        Ok(ids)
    }

    /// Load `ids`, failing with `NotFound` if any is unknown for `kind`.
    pub async fn require_existing(
        &self,
        tx: &mut dyn StoreTransaction,
        kind: CatalogKind,
        ids: &[EntityId],
    ) -> AppResult<Vec<NamedEntity>> {
        let found = tx.find_entities(kind, ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|e| e.id == **id)) {
            return Err(AppError::not_found(format!("{kind} {missing} not found")));
        }
        Ok(found)
    }

    /// Resolve a single-valued reference to its new value.
    ///
    /// `Existing` must name a known entity, `Create` reuses or creates by
    /// name, and `Clear` resolves to no entity.
    pub async fn resolve_ref(
        &self,
        tx: &mut dyn StoreTransaction,
        kind: CatalogKind,
        reference: &EntityRef,
    ) -> AppResult<Option<EntityId>> {
        match reference {
            EntityRef::Existing(id) => {
                self.require_existing(tx, kind, &[*id]).await?;
                Ok(Some(*id))
            }
            EntityRef::Create(name) => Ok(Some(self.resolve_name(tx, kind, name).await?.id)),
            EntityRef::Clear => Ok(None),
        }
    }

    /// Resolve an optional reference; absent leaves `current` untouched.
    pub async fn apply_ref(
        &self,
        tx: &mut dyn StoreTransaction,
        kind: CatalogKind,
        reference: Option<&EntityRef>,
        current: Option<EntityId>,
    ) -> AppResult<Option<EntityId>> {
        match reference {
            Some(reference) => self.resolve_ref(tx, kind, reference).await,
            None => Ok(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_core::error::ErrorKind;
    use folio_database::{ContentStore, MemoryContentStore};

    use super::*;

    #[tokio::test]
    async fn test_create_reuses_existing_name() {
        let store = MemoryContentStore::new();
        let resolver = EntityResolver::new();
        let mut tx = store.begin().await.unwrap();

        let camera = resolver
            .resolve_ref(tx.as_mut(), CatalogKind::Camera, &EntityRef::Create("Leica M6".into()))
            .await
            .unwrap();
        let again = resolver
            .resolve_ref(tx.as_mut(), CatalogKind::Camera, &EntityRef::Create("leica m6".into()))
            .await
            .unwrap();

        assert!(camera.is_some());
        assert_eq!(camera, again);
        assert_eq!(tx.list_entities(CatalogKind::Camera).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_existing_is_not_found() {
        let store = MemoryContentStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = EntityResolver::new()
            .resolve_ref(tx.as_mut(), CatalogKind::Lens, &EntityRef::Existing(EntityId::new(42)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_clear_and_absent() {
        let store = MemoryContentStore::new();
        let resolver = EntityResolver::new();
        let mut tx = store.begin().await.unwrap();
        let current = Some(EntityId::new(5));

        let cleared = resolver
            .apply_ref(tx.as_mut(), CatalogKind::Location, Some(&EntityRef::Clear), current)
            .await
            .unwrap();
        let untouched = resolver
            .apply_ref(tx.as_mut(), CatalogKind::Location, None, current)
            .await
            .unwrap();

        assert_eq!(cleared, None);
        assert_eq!(untouched, current);
    }

    #[tokio::test]
    async fn test_blank_name_is_invalid() {
        let store = MemoryContentStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = EntityResolver::new()
            .resolve_name(tx.as_mut(), CatalogKind::Tag, "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
