//! References that may point at records which do not exist yet.

use std::fmt;

use serde::{Deserialize, Serialize};

use folio_core::AppError;
use folio_core::types::{ContentId, EntityId};

/// A single-valued reference to a catalog entity (camera, lens, film type,
/// location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    /// Point at an existing entity.
    Existing(EntityId),
    /// Reuse the entity with this name (case-insensitive) or create it.
    Create(String),
    /// Remove the reference.
    Clear,
}

/// A reference to a content item inside a single request.
///
/// On the wire a placeholder is written as a negative integer: `-1` is the
/// first content created by the same request, `-2` the second, and so on.
/// Internally the two cases are distinct variants and are resolved through
/// an explicit placeholder map before anything is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ContentRef {
    /// A content row that already exists.
    Existing(ContentId),
    /// The n-th (1-based) content created earlier in the same request.
    Placeholder(u32),
}

impl ContentRef {
    /// Zero-based position of a placeholder in the request's creation list.
    pub fn placeholder_slot(&self) -> Option<usize> {
        match self {
            Self::Placeholder(n) => (*n as usize).checked_sub(1),
            Self::Existing(_) => None,
        }
    }
}

impl From<ContentId> for ContentRef {
    fn from(id: ContentId) -> Self {
        Self::Existing(id)
    }
}

impl TryFrom<i64> for ContentRef {
    type Error = AppError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Err(AppError::invalid_argument("Content reference 0 is not valid")),
            n if n > 0 => Ok(Self::Existing(ContentId::new(n))),
            n => u32::try_from(n.unsigned_abs())
                .map(Self::Placeholder)
                .map_err(|_| {
                    AppError::invalid_argument(format!("Placeholder reference {n} is out of range"))
                }),
        }
    }
}

impl From<ContentRef> for i64 {
    fn from(r: ContentRef) -> i64 {
        match r {
            ContentRef::Existing(id) => id.get(),
            ContentRef::Placeholder(n) => -i64::from(n),
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(id) => write!(f, "{id}"),
            Self::Placeholder(n) => write!(f, "new#{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_wire_values_become_placeholders() {
        let refs: Vec<ContentRef> = serde_json::from_str("[12, -1, -2]").expect("deserialize");
        assert_eq!(
            refs,
            vec![
                ContentRef::Existing(ContentId::new(12)),
                ContentRef::Placeholder(1),
                ContentRef::Placeholder(2),
            ]
        );
        assert_eq!(refs[2].placeholder_slot(), Some(1));
        assert_eq!(refs[0].placeholder_slot(), None);
    }

    #[test]
    fn test_zero_is_rejected() {
        assert!(serde_json::from_str::<ContentRef>("0").is_err());
    }

    #[test]
    fn test_entity_ref_wire_shape() {
        let r: EntityRef = serde_json::from_str(r#"{"create":"Leica M6"}"#).expect("deserialize");
        assert_eq!(r, EntityRef::Create("Leica M6".to_string()));
        let r: EntityRef = serde_json::from_str(r#""clear""#).expect("deserialize");
        assert_eq!(r, EntityRef::Clear);
    }
}
