//! Catalog kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use folio_core::AppError;

/// The kinds of named catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Tag,
    Person,
    Camera,
    Lens,
    Location,
    FilmType,
}

impl CatalogKind {
    /// All kinds, in display order.
    pub const ALL: [CatalogKind; 6] = [
        Self::Tag,
        Self::Person,
        Self::Camera,
        Self::Lens,
        Self::Location,
        Self::FilmType,
    ];

    /// The table holding entities of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Person => "people",
            Self::Camera => "cameras",
            Self::Lens => "lenses",
            Self::Location => "locations",
            Self::FilmType => "film_types",
        }
    }

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Person => "person",
            Self::Camera => "camera",
            Self::Lens => "lens",
            Self::Location => "location",
            Self::FilmType => "film_type",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "tag" | "tags" => Ok(Self::Tag),
            "person" | "people" => Ok(Self::Person),
            "camera" | "cameras" => Ok(Self::Camera),
            "lens" | "lenses" => Ok(Self::Lens),
            "location" | "locations" => Ok(Self::Location),
            "film_type" | "film_types" => Ok(Self::FilmType),
            _ => Err(AppError::invalid_argument(format!(
                "Invalid catalog kind: '{s}'. Expected one of: tag, person, camera, lens, \
                 location, film_type"
            ))),
        }
    }
}
