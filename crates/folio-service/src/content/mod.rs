//! Content creation, partial updates and membership reconciliation.

pub(crate) mod draft;
pub(crate) mod membership;
pub mod service;

pub use service::ContentService;
