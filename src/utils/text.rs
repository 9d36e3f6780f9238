// src/utils/text.rs

//! Text cleanup helpers for markup-bearing thread bodies.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Replace markup tags with spaces and collapse whitespace runs.
pub fn strip_tags(markup: &str) -> String {
    normalize_whitespace(&TAG_RE.replace_all(markup, " "))
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the five predefined XML entities.
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Byte offset `n` characters before `idx`, clipped to the start.
pub fn chars_before(s: &str, idx: usize, n: usize) -> usize {
    if n == 0 {
        return idx;
    }
    s[..idx].char_indices().rev().nth(n - 1).map_or(0, |(i, _)| i)
}

/// Byte offset `n` characters after `idx`, clipped to the end.
pub fn chars_after(s: &str, idx: usize, n: usize) -> usize {
    s[idx..]
        .char_indices()
        .nth(n)
        .map_or(s.len(), |(i, _)| idx + i)
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    &s[..chars_after(s, 0, max)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Hello\n\n<b>world</b></p>  <br/>again"),
            "Hello world again"
        );
    }

    #[test]
    fn test_unescape_xml() {
        assert_eq!(unescape_xml("R&amp;D &lt;v2&gt;.pdf"), "R&D <v2>.pdf");
        assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_char_windows_respect_boundaries() {
        let s = "가나다abc";
        // "가" "나" "다" are 3 bytes each
        assert_eq!(chars_before(s, 9, 2), 3);
        assert_eq!(chars_before(s, 9, 10), 0);
        assert_eq!(chars_before(s, 9, 0), 9);
        assert_eq!(chars_after(s, 3, 2), 9);
        assert_eq!(chars_after(s, 9, 10), s.len());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
