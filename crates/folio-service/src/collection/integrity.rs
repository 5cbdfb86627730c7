//! Order-index consistency reports.

use std::collections::BTreeMap;

use serde::Serialize;

use folio_core::types::CollectionId;
use folio_entity::collection::CollectionContent;

/// The state of one collection's order indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// The inspected collection.
    pub collection_id: CollectionId,
    /// Content version at inspection time.
    pub content_version: i64,
    /// Number of rows in the collection.
    pub entries: usize,
    /// Positions in `0..n` no row occupies.
    pub gaps: Vec<i32>,
    /// Positions held by more than one row.
    pub duplicates: Vec<i32>,
    /// Indices outside `0..n`.
    pub out_of_range: Vec<i32>,
}

impl IntegrityReport {
    /// Inspect `rows`, the full relation of one collection.
    pub fn inspect(
        collection_id: CollectionId,
        content_version: i64,
        rows: &[CollectionContent],
    ) -> Self {
        let len = i32::try_from(rows.len()).unwrap_or(i32::MAX);
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for row in rows {
            *counts.entry(row.order_index).or_default() += 1;
        }

        Self {
            collection_id,
            content_version,
            entries: rows.len(),
            gaps: (0..len).filter(|i| !counts.contains_key(i)).collect(),
            duplicates: counts
                .iter()
                .filter(|(_, count)| **count > 1)
                .map(|(index, _)| *index)
                .collect(),
            out_of_range: counts
                .keys()
                .copied()
                .filter(|index| !(0..len).contains(index))
                .collect(),
        }
    }

    /// Whether the indices are exactly `0..n`.
    pub fn is_consistent(&self) -> bool {
        self.gaps.is_empty() && self.duplicates.is_empty() && self.out_of_range.is_empty()
    }
}
