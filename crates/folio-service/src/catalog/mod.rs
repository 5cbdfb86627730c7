//! Catalog entity resolution and listing.

pub mod resolver;
pub mod service;

pub use resolver::EntityResolver;
pub use service::CatalogService;
