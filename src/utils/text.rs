//! Character-safe text truncation.
//!
//! Limits in this crate count `char`s so that cutting never splits a UTF-8
//! sequence (curriculum text contains en dashes, Yoruba diacritics, etc.).

use std::borrow::Cow;

/// Returns the first `max_chars` characters of `text`, borrowing when no cut
/// is needed.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(text[..byte_idx].to_string()),
        None => Cow::Borrowed(text),
    }
}

/// Truncates `text` to `max_chars` characters and appends `marker` if
/// anything was cut.
pub fn truncate_with_marker(text: &str, max_chars: usize, marker: &str) -> String {
    match truncate_chars(text, max_chars) {
        Cow::Borrowed(whole) => whole.to_string(),
        Cow::Owned(mut cut) => {
            cut.push_str(marker);
            cut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_borrows_short_text() {
        assert!(matches!(truncate_chars("short", 10), Cow::Borrowed("short")));
        assert!(matches!(truncate_chars("exact", 5), Cow::Borrowed("exact")));
    }

    #[test]
    fn test_truncate_chars_counts_chars_not_bytes() {
        let text = "Ẹ̀kọ́ Primary 1–3";
        let cut = truncate_chars(text, 4);
        assert_eq!(cut.chars().count(), 4);
    }

    #[test]
    fn test_truncate_with_marker() {
        assert_eq!(truncate_with_marker("abcdef", 3, "..."), "abc...");
        assert_eq!(truncate_with_marker("abc", 3, "..."), "abc");
    }
}
