//! SQL repositories for every Folio table.
//!
//! Repositories are stateless: each function runs on the connection of the
//! caller's transaction so that one engine operation is one transaction.

pub mod association;
pub mod catalog;
pub mod collection;
pub mod content;
pub mod membership;

pub use association::AssociationRepository;
pub use catalog::CatalogRepository;
pub use collection::CollectionRepository;
pub use content::ContentRepository;
pub use membership::MembershipRepository;

use folio_core::error::{AppError, ErrorKind};

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Map a sqlx error to the engine's error taxonomy.
///
/// Unique violations and serialization failures surface as conflicts the
/// caller may retry; everything else is an internal storage failure.
pub(crate) fn db_error(message: &str, err: sqlx::Error) -> AppError {
    let conflict = match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => Some(format!(
                "{message}: constraint '{}' violated",
                db.constraint().unwrap_or("unique")
            )),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => {
                Some(format!("{message}: concurrent modification"))
            }
            _ => None,
        },
        _ => None,
    };

    match conflict {
        Some(msg) => AppError::with_source(ErrorKind::Conflict, msg, err),
        None => AppError::with_source(ErrorKind::Internal, message.to_string(), err),
    }
}

/// Raw ids for binding as a `bigint[]`.
pub(crate) fn raw_ids<T: Copy + Into<i64>>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|&id| id.into()).collect()
}
