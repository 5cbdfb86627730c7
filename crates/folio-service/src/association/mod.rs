//! Many-to-many association reconciliation.

pub mod reconcile;
pub mod reconciler;

pub use reconcile::{AssociationPlan, normalize_names, reconcile};
pub use reconciler::RelationshipReconciler;
