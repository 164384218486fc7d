#![forbid(unsafe_code)]

//! Minimal HTML-style entity escaping for text nodes.

/// Escape `text` for insertion into markup output.
///
/// Only the five characters with entity meaning are rewritten; everything
/// else passes through. Returns the input unchanged (no allocation beyond
/// the copy) when nothing needs escaping.
#[must_use]
pub fn escape_text(text: &str) -> String {
    if !text
        .bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
    {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
