//! HTML utility functions.
//!
//! - `escape()` - HTML entity escaping for text and attribute values
//! - `escape_script_json()` - JSON safe to embed inside `<script>`

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape("<script>"), "&lt;script&gt;");
/// assert_eq!(escape("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Make serialized JSON safe inside an inline `<script>` element.
///
/// Only `</` can terminate the element early; it becomes `<\/`, which JSON
/// and JavaScript both read back as `</`.
pub fn escape_script_json(json: &str) -> Cow<'_, str> {
    if json.contains("</") {
        Cow::Owned(json.replace("</", "<\\/"))
    } else {
        Cow::Borrowed(json)
    }
}
