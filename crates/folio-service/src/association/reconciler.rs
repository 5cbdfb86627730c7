//! Transactional application of association deltas.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use folio_core::config::EngineConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{CollectionId, ContentId, EntityId};
use folio_database::{ContentStore, StoreTransaction};
use folio_entity::catalog::{ParentKind, RelationKind};
use folio_entity::update::AssociationDelta;

use super::reconcile::{normalize_names, reconcile};
use crate::catalog::EntityResolver;

/// Applies `{keep, create, remove}` deltas to tag and person associations.
#[derive(Debug, Clone)]
pub struct RelationshipReconciler {
    /// Persistence.
    store: Arc<dyn ContentStore>,
    /// Resolves the `create` arm.
    resolver: EntityResolver,
    /// Request limits.
    config: EngineConfig,
}

impl RelationshipReconciler {
    /// Creates a new reconciler.
    pub fn new(store: Arc<dyn ContentStore>, config: EngineConfig) -> Self {
        Self {
            store,
            resolver: EntityResolver::new(),
            config,
        }
    }

    /// Reconcile one parent's associations in its own transaction and
    /// return the final set.
    pub async fn reconcile_associations(
        &self,
        parent: i64,
        relation: RelationKind,
        delta: &AssociationDelta,
    ) -> AppResult<BTreeSet<EntityId>> {
        let mut tx = self.store.begin().await?;
        ensure_parent(tx.as_mut(), relation, parent).await?;
        let final_set = self.apply_in(tx.as_mut(), relation, parent, delta).await?;
        tx.commit().await?;

        info!(
            relation = %relation,
            parent,
            associated = final_set.len(),
            "Associations reconciled"
        );
        Ok(final_set)
    }

    /// Apply a delta on the caller's transaction.
    ///
    /// Every `keep` id must exist; `create` names are normalized, then reused
    /// or created; only the difference against the current rows is written.
    pub async fn apply_in(
        &self,
        tx: &mut dyn StoreTransaction,
        relation: RelationKind,
        parent: i64,
        delta: &AssociationDelta,
    ) -> AppResult<BTreeSet<EntityId>> {
        let kind = relation.entity_kind();
        let names = normalize_names(delta.create_names(), self.config.max_create_names)?;
        self.resolver
            .require_existing(tx, kind, delta.keep_ids())
            .await?;
        let created = self.resolver.resolve_names(tx, kind, &names).await?;

        let current = tx.list_associations(relation, parent).await?;
        let plan = reconcile(&current, delta.keep_ids(), &created, delta.remove_ids());
        debug!(
            relation = %relation,
            parent,
            insert = ?plan.insert,
            delete = ?plan.delete,
            "Association plan"
        );

        if !plan.delete.is_empty() {
            tx.delete_associations(relation, parent, &plan.delete).await?;
        }
        if !plan.insert.is_empty() {
            tx.insert_associations(relation, parent, &plan.insert).await?;
        }
        Ok(plan.final_set)
    }

    /// Apply an optional delta; `None` leaves the relation untouched.
    pub async fn apply_optional(
        &self,
        tx: &mut dyn StoreTransaction,
        relation: RelationKind,
        parent: i64,
        delta: Option<&AssociationDelta>,
    ) -> AppResult<()> {
        if let Some(delta) = delta {
            self.apply_in(tx, relation, parent, delta).await?;
        }
        Ok(())
    }
}

async fn ensure_parent(
    tx: &mut dyn StoreTransaction,
    relation: RelationKind,
    parent: i64,
) -> AppResult<()> {
    let exists = match relation.parent_kind() {
        ParentKind::Content => !tx.find_contents(&[ContentId::new(parent)]).await?.is_empty(),
        ParentKind::Collection => tx.find_collection(CollectionId::new(parent)).await?.is_some(),
    };
    if exists {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "{:?} {parent} not found",
            relation.parent_kind()
        )))
    }
}
