//! Slug derivation for category names.

/// Turn a name into a URL slug: lowercase ASCII alphanumerics kept,
/// apostrophes dropped (Uzbek Latin spellings like "o'yinchoqlar"
/// collapse cleanly), every other run of characters becomes a single
/// hyphen. Leading and trailing hyphens are trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '\'' || c == '\u{2019}' {
            // dropped, not a separator
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
