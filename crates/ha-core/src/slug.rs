//! Slug generation for object ids

/// Turn free text into an object id: lowercase ascii alphanumerics joined by
/// single underscores.
///
/// Every other character, non-ascii letters included, separates words. There
/// is no transliteration, so "Salon Télé" becomes `salon_t_l` where a
/// transliterating slugify would give `salon_tele`. Returns `"unknown"` when
/// nothing usable is left, matching the host's behavior for names made only
/// of punctuation.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}
