//! # folio-database
//!
//! Persistence for the collection ordering engine: the PostgreSQL pool and
//! migration runner, the [`ContentStore`] / [`StoreTransaction`] contract the
//! engine is written against, and its two implementations.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
#[cfg(feature = "memory")]
pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;
pub use store::{ContentStore, StoreTransaction};
