//! Content domain entities.
//!
//! Content is collection-independent: the same row can belong to zero, one,
//! or many collections, with a different position and visibility in each.

pub mod draft;
pub mod kind;
pub mod model;
pub mod row;

pub use draft::{ContentDraft, NewContent, NewContentBody, NewImage};
pub use kind::{ContentKind, TextFormat};
pub use model::{
    CollectionReference, Content, ContentBody, GifAttributes, ImageAttributes, TextAttributes,
};
pub use row::ContentRow;
