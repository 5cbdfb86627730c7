//! Catalog entities: simple named rows (tags, people, cameras, lenses,
//! locations, film types) referenced from content and collections.

pub mod kind;
pub mod model;
pub mod relation;

pub use kind::CatalogKind;
pub use model::NamedEntity;
pub use relation::{ParentKind, RelationKind};
