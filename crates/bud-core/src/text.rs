//! Char-boundary-safe text helpers.

/// Return at most `max_chars` characters of `s`.
///
/// Counts `char`s, not bytes, so multi-byte text (Japanese, emoji) is never
/// split mid-codepoint.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Short preview of a transcript for log fields.
pub fn preview(s: &str) -> String {
    const PREVIEW_CHARS: usize = 50;
    let cut = truncate_chars(s, PREVIEW_CHARS);
    if cut.len() < s.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}
