//! Dense order-index maintenance for collection content.
//!
//! For every collection the order indices of its rows are exactly `0..n`.
//! Appends take `next_index`, removals are followed by a compaction, and
//! reorders are planned as a full permutation before anything is written.

pub mod allocator;
pub mod placeholder;
pub mod reorder;

pub use allocator::{OrderIndexAllocator, compact_positions, is_dense, next_index};
pub use placeholder::PlaceholderMap;
pub use reorder::{ReorderCoordinator, changed_positions, plan_reorder};
