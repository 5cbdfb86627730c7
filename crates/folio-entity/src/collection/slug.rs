//! URL slug helpers.

/// Maximum slug length accepted by the schema.
pub const MAX_SLUG_LEN: usize = 150;

/// Derive a URL-safe slug from a title.
///
/// Lower-cases ASCII letters, keeps digits, and collapses every other run
/// of characters into a single `-`. Leading and trailing dashes are dropped
/// and the result is truncated to [`MAX_SLUG_LEN`].
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

/// Check that a slug only contains `[a-z0-9-]`, does not start or end with
/// a dash, and fits the length bound.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
