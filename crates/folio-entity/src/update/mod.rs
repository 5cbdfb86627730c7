//! Partial-update payloads consumed by the ordering and reconciliation
//! engine.
//!
//! None of these types ever carries full collection state: callers send
//! `keep/create/remove` deltas, partial reorder batches, and references to
//! content created earlier in the same request.

pub mod collection;
pub mod content;
pub mod delta;
pub mod reference;
pub mod reorder;

pub use collection::{CollectionAggregate, CollectionUpdate};
pub use content::{ContentAggregate, ContentUpdate};
pub use delta::{AssociationDelta, MembershipDelta, MembershipLink};
pub use reference::{ContentRef, EntityRef};
pub use reorder::{ReorderItem, VisibilityChange};
