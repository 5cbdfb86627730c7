//! Resolution of placeholder content references.

use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::ContentId;
use folio_entity::update::ContentRef;

/// Maps placeholders of one request to the content it created.
///
/// Built after every new content row exists; every reference in the request
/// is rewritten through it before any ordering or visibility change is
/// applied.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    created: Vec<ContentId>,
}

impl PlaceholderMap {
    /// A map where placeholder `n` is `created[n - 1]`.
    pub fn new(created: Vec<ContentId>) -> Self {
        Self { created }
    }

    /// A map for requests that create nothing; every placeholder is unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Content created by the request, in creation order.
    pub fn created(&self) -> &[ContentId] {
        &self.created
    }

    /// Rewrite one reference.
    pub fn resolve(&self, reference: ContentRef) -> AppResult<ContentId> {
        match reference {
            ContentRef::Existing(id) => Ok(id),
            ContentRef::Placeholder(_) => reference
                .placeholder_slot()
                .and_then(|slot| self.created.get(slot).copied())
                .ok_or_else(|| {
                    AppError::invalid_argument(format!(
                        "Unknown placeholder {}: the request created {} content item(s)",
                        i64::from(reference),
                        self.created.len()
                    ))
                }),
        }
    }

    /// Rewrite several references.
    pub fn resolve_all(&self, references: &[ContentRef]) -> AppResult<Vec<ContentId>> {
        references.iter().map(|r| self.resolve(*r)).collect()
    }
}
