//! Collection type and display mode enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use folio_core::AppError;

/// The kind of container a collection represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "collection_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// A dated blog post mixing text and images.
    Blog,
    /// A public image gallery.
    Gallery,
    /// A curated portfolio.
    Portfolio,
    /// An art gallery exhibit.
    ArtGallery,
    /// A gallery delivered to a client (usually password-protected).
    ClientGallery,
    /// The site's home page collection.
    Home,
}

impl CollectionKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Gallery => "gallery",
            Self::Portfolio => "portfolio",
            Self::ArtGallery => "art_gallery",
            Self::ClientGallery => "client_gallery",
            Self::Home => "home",
        }
    }

    /// The display mode a new collection of this kind starts with.
    ///
    /// Blogs read top-down by date; everything else is hand-ordered.
    pub fn default_display_mode(&self) -> DisplayMode {
        match self {
            Self::Blog => DisplayMode::Chronological,
            _ => DisplayMode::Ordered,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "blog" => Ok(Self::Blog),
            "gallery" => Ok(Self::Gallery),
            "portfolio" => Ok(Self::Portfolio),
            "art_gallery" => Ok(Self::ArtGallery),
            "client_gallery" => Ok(Self::ClientGallery),
            "home" => Ok(Self::Home),
            _ => Err(AppError::invalid_argument(format!(
                "Invalid collection kind: '{s}'. Expected one of: blog, gallery, portfolio, \
                 art_gallery, client_gallery, home"
            ))),
        }
    }
}

/// How the content of a collection is presented on read paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "display_mode", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Sorted by capture or creation date.
    Chronological,
    /// Sorted by the collection-local order index.
    Ordered,
}

impl DisplayMode {
    /// Return the mode as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chronological => "chronological",
            Self::Ordered => "ordered",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_accepts_dashes() {
        assert_eq!(
            "client-gallery".parse::<CollectionKind>().unwrap(),
            CollectionKind::ClientGallery
        );
        assert_eq!("BLOG".parse::<CollectionKind>().unwrap(), CollectionKind::Blog);
        assert!("album".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn test_default_display_mode() {
        assert_eq!(
            CollectionKind::Blog.default_display_mode(),
            DisplayMode::Chronological
        );
        assert_eq!(
            CollectionKind::Portfolio.default_display_mode(),
            DisplayMode::Ordered
        );
    }
}
