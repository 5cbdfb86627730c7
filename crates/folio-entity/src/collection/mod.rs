//! Collection domain entities.

pub mod kind;
pub mod membership;
pub mod model;
pub mod slug;

pub use kind::{CollectionKind, DisplayMode};
pub use membership::{CollectionContent, OrderedContentList, OrderedEntry};
pub use model::{Collection, CollectionPatch, NewCollection};
