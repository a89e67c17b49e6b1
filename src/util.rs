//! Shared utility functions

/// Truncate a string to a maximum number of characters for display.
/// Always cuts on a char boundary; no ellipsis is appended.
pub fn truncate_display(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Escape a string for interpolation into HTML element or attribute context.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
