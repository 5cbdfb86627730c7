//! Named catalog entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use folio_core::types::EntityId;

/// A tag, person, camera, lens, location, or film type.
///
/// Names are stored with the casing of their first use and matched
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NamedEntity {
    /// Unique identifier within its catalog kind.
    pub id: EntityId,
    /// Canonical name.
    pub name: String,
    /// When the entity was first referenced.
    pub created_at: DateTime<Utc>,
}

impl NamedEntity {
    /// Case-insensitive name comparison used for reuse-or-create.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}
