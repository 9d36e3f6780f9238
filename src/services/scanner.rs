// src/services/scanner.rs

//! Inline attachment markup scanner.
//!
//! Ed bodies embed files as `<file url="..." filename="..."/>`.

use regex::Regex;

use crate::models::AttachmentReference;
use crate::utils::text::{chars_after, chars_before, strip_tags, unescape_xml};

const FILE_PATTERN: &str = r#"<file\s+url="([^"]+)"\s+filename="([^"]+)"\s*/>"#;

/// Characters of surrounding text kept on each side of a match.
pub const CONTEXT_CHARS: usize = 200;

/// Finds attachment markup in thread bodies.
#[derive(Debug, Clone)]
pub struct AttachmentScanner {
    pattern: Regex,
    context_chars: usize,
}

impl Default for AttachmentScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(FILE_PATTERN).expect("file pattern is valid"),
            context_chars: CONTEXT_CHARS,
        }
    }

    /// Return every attachment reference in document order.
    pub fn scan(&self, content: &str) -> Vec<AttachmentReference> {
        self.pattern
            .captures_iter(content)
            .map(|caps| {
                let whole = caps.get(0).expect("group 0 always matches");
                let start = chars_before(content, whole.start(), self.context_chars);
                let end = chars_after(content, whole.end(), self.context_chars);

                AttachmentReference {
                    url: unescape_xml(&caps[1]),
                    filename: unescape_xml(&caps[2]),
                    position: whole.start(),
                    context: strip_tags(&content[start..end]),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_no_matches() {
        let scanner = AttachmentScanner::new();
        assert!(scanner.scan("<document><paragraph>hi</paragraph></document>").is_empty());
        assert!(scanner.scan("").is_empty());
    }

    #[test]
    fn test_scan_document_order_and_offsets() {
        let content = concat!(
            "<document><paragraph>See my writeup</paragraph>",
            r#"<file url="https://static.us.edusercontent.com/files/a1" filename="HW3 writeup.pdf"/>"#,
            "<paragraph>and the chat log</paragraph>",
            r#"<file url="https://static.us.edusercontent.com/files/b2" filename="log.png" />"#,
            "</document>"
        );
        let refs = AttachmentScanner::new().scan(content);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].filename, "HW3 writeup.pdf");
        assert_eq!(refs[0].url, "https://static.us.edusercontent.com/files/a1");
        assert_eq!(refs[1].filename, "log.png");
        assert!(refs[0].position < refs[1].position);
        assert!(content[refs[0].position..].starts_with("<file "));
        assert!(content[refs[1].position..].starts_with("<file "));
    }

    #[test]
    fn test_context_is_bounded_and_tag_free() {
        let before = "x".repeat(300);
        let after = "y".repeat(300);
        let content = format!(
            r#"<p>{before}</p><file url="u" filename="f.pdf"/><p>{after}</p>"#
        );
        let refs = AttachmentScanner::new().scan(&content);
        let context = &refs[0].context;

        assert!(!context.contains('<'));
        // 200 chars before: "</p>" (4) + 196 x's; after: "<p>" (3) + 197 y's
        assert_eq!(context, &format!("{} {}", "x".repeat(196), "y".repeat(197)));
    }

    #[test]
    fn test_context_clipped_to_document_bounds() {
        let content = r#"Intro <file url="u" filename="f.pdf"/> outro"#;
        let refs = AttachmentScanner::new().scan(content);
        assert_eq!(refs[0].context, "Intro outro");
        assert_eq!(refs[0].position, 6);
    }

    #[test]
    fn test_multibyte_context_window() {
        let content = format!(r#"{}<file url="u" filename="과제.pdf"/>"#, "한".repeat(250));
        let refs = AttachmentScanner::new().scan(&content);
        assert_eq!(refs[0].context.chars().count(), 200);
        assert_eq!(refs[0].filename, "과제.pdf");
        assert_eq!(refs[0].position, 750);
    }

    #[test]
    fn test_attribute_entities_decoded() {
        let content = r#"<file url="https://x/y?a=1&amp;b=2" filename="Q&amp;A.pdf"/>"#;
        let refs = AttachmentScanner::new().scan(content);
        assert_eq!(refs[0].url, "https://x/y?a=1&b=2");
        assert_eq!(refs[0].filename, "Q&A.pdf");
    }
}
