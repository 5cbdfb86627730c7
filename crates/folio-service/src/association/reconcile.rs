//! Pure keep/create/remove reconciliation.

use std::collections::BTreeSet;

use serde::Serialize;

use folio_core::error::AppError;
use folio_core::result::AppResult;

/// Longest catalog name the schema accepts.
pub const MAX_NAME_LEN: usize = 100;

/// The outcome of reconciling a delta against the current association set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationPlan<T: Ord> {
    /// The association set after the delta.
    pub final_set: BTreeSet<T>,
    /// Rows to insert: in `final_set` but not current.
    pub insert: Vec<T>,
    /// Rows to delete: current but not in `final_set`.
    pub delete: Vec<T>,
}

impl<T: Ord> AssociationPlan<T> {
    /// Whether applying the plan writes nothing.
    pub fn is_noop(&self) -> bool {
        self.insert.is_empty() && self.delete.is_empty()
    }
}

/// Compute `keep ∪ created − remove` and its diff against `current`.
///
/// `created` holds the ids the `create` names resolved to. `remove` wins
/// over both `keep` and `created`. Rows present in both `current` and the
/// final set appear in neither `insert` nor `delete`.
pub fn reconcile<T: Ord + Copy>(
    current: &BTreeSet<T>,
    keep: &[T],
    created: &[T],
    remove: &[T],
) -> AssociationPlan<T> {
    let removed: BTreeSet<T> = remove.iter().copied().collect();
    let final_set: BTreeSet<T> = keep
        .iter()
        .chain(created)
        .copied()
        .filter(|id| !removed.contains(id))
        .collect();

    AssociationPlan {
        insert: final_set.difference(current).copied().collect(),
        delete: current.difference(&final_set).copied().collect(),
        final_set,
    }
}

/// Trim the `create` names, reject blanks and over-long names, and drop
/// case-insensitive duplicates. The first spelling of each name wins.
pub fn normalize_names(names: &[String], max_names: usize) -> AppResult<Vec<String>> {
    if names.len() > max_names {
        return Err(AppError::invalid_argument(format!(
            "Too many names to create: {} (maximum {max_names})",
            names.len()
        )));
    }

    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_argument("Names to create cannot be blank"));
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(AppError::invalid_argument(format!(
                "Name '{trimmed}' exceeds {MAX_NAME_LEN} characters"
            )));
        }
        if seen.insert(trimmed.to_lowercase()) {
            normalized.push(trimmed.to_string());
        }
    }
    Ok(normalized)
}
