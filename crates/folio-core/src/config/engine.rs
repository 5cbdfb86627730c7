//! Engine request limits.

use serde::{Deserialize, Serialize};

/// Bounds on the size of a single reconciliation or reorder request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of `(content, new_index)` pairs in one reorder batch.
    #[serde(default = "default_max_reorder_batch")]
    pub max_reorder_batch: usize,
    /// Maximum number of names in one `create` arm of an association delta.
    #[serde(default = "default_max_create_names")]
    pub max_create_names: usize,
    /// Maximum number of content items created within one collection update.
    #[serde(default = "default_max_new_content")]
    pub max_new_content: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_reorder_batch: default_max_reorder_batch(),
            max_create_names: default_max_create_names(),
            max_new_content: default_max_new_content(),
        }
    }
}

fn default_max_reorder_batch() -> usize {
    1000
}

fn default_max_create_names() -> usize {
    100
}

fn default_max_new_content() -> usize {
    200
}
