//! # folio-service
//!
//! The collection content ordering and relationship reconciliation engine.
//!
//! Every mutating entry point runs inside one store transaction: it reads
//! the current state, validates the whole request, writes only the rows
//! that change, advances the affected collections' content versions and
//! commits. Services follow constructor injection; the store is shared as
//! an `Arc<dyn ContentStore>`.

pub mod association;
pub mod catalog;
pub mod collection;
pub mod content;
pub mod ordering;

pub use association::{AssociationPlan, RelationshipReconciler, reconcile};
pub use catalog::{CatalogService, EntityResolver};
pub use collection::{CollectionService, IntegrityReport};
pub use content::ContentService;
pub use ordering::{OrderIndexAllocator, PlaceholderMap, ReorderCoordinator};
