//! Read and get-or-create access to catalog entities.

use std::sync::Arc;

use tracing::info;

use folio_core::result::AppResult;
use folio_database::ContentStore;
use folio_entity::catalog::{CatalogKind, NamedEntity};

use super::resolver::EntityResolver;

/// Lists and resolves tags, people, cameras, lenses, locations and film
/// types.
#[derive(Debug, Clone)]
pub struct CatalogService {
    /// Persistence.
    store: Arc<dyn ContentStore>,
    /// Name resolution.
    resolver: EntityResolver,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            resolver: EntityResolver::new(),
        }
    }

    /// Every entity of `kind`, sorted by name.
    pub async fn list_catalog(&self, kind: CatalogKind) -> AppResult<Vec<NamedEntity>> {
        let mut tx = self.store.begin().await?;
        let entities = tx.list_entities(kind).await?;
        tx.rollback().await?;
        Ok(entities)
    }

    /// Return the entity named `name`, creating it on first use.
    pub async fn find_or_create(&self, kind: CatalogKind, name: &str) -> AppResult<NamedEntity> {
        let mut tx = self.store.begin().await?;
        let entity = self.resolver.resolve_name(tx.as_mut(), kind, name).await?;
        tx.commit().await?;

        info!(kind = %kind, id = %entity.id, name = %entity.name, "Catalog entity resolved");
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use folio_database::MemoryContentStore;

    use super::*;

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let service = CatalogService::new(Arc::new(MemoryContentStore::new()));
        service.find_or_create(CatalogKind::Person, "zoe").await.unwrap();
        service.find_or_create(CatalogKind::Person, "Adam").await.unwrap();
        service.find_or_create(CatalogKind::Person, "ADAM").await.unwrap();

        let names: Vec<String> = service
            .list_catalog(CatalogKind::Person)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Adam", "zoe"]);
        assert!(service.list_catalog(CatalogKind::Tag).await.unwrap().is_empty());
    }
}
