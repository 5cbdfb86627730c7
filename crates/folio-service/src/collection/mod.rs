//! Collection operations: creation, reads, content membership, reordering,
//! bundled partial updates and order integrity checks.

pub(crate) mod editor;
pub mod integrity;
pub(crate) mod read;
pub mod service;
mod update;

pub use integrity::IntegrityReport;
pub use service::CollectionService;
