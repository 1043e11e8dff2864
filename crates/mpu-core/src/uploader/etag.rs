//! ETag normalization.

/// Trims whitespace and strips exactly one surrounding pair of double quotes.
/// Returns `None` if nothing is left.
pub fn normalize_etag(raw: &str) -> Option<String> {
    let s = raw.trim();
    let s = if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    };
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
