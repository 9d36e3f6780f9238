// src/utils/fs.rs

//! Filesystem naming helpers.

use std::collections::HashSet;

/// Characters that are unsafe in file names on common platforms.
const UNSAFE_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Name used when sanitizing leaves nothing behind.
const FALLBACK_NAME: &str = "attachment";

/// Map an arbitrary attachment name to a filesystem-safe name.
///
/// Unsafe characters become `_`, then leading/trailing whitespace and dots
/// are stripped. Idempotent.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pick a name not yet in `taken`, appending `_2`, `_3`, ... before the
/// extension on collision. The chosen name is added to `taken`.
pub fn claim_unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = split_extension(name);
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Replace the extension of a file name (or append one if it has none).
pub fn with_extension(name: &str, ext: &str) -> String {
    let (stem, _) = split_extension(name);
    format!("{stem}.{ext}")
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j.pdf"#), "a_b_c_d_e_f_g_h_i_j.pdf");
    }

    #[test]
    fn test_sanitize_strips_dots_and_whitespace() {
        assert_eq!(sanitize_filename("  ..report.pdf. "), "report.pdf");
        assert_eq!(sanitize_filename(" ... "), "attachment");
    }

    #[test]
    fn test_sanitize_is_idempotent_and_safe() {
        let inputs = [
            "normal.pdf",
            " .hidden ",
            "a/b/../c.txt",
            "??.?",
            "weird *name*: v2 .pdf.",
            "발표 자료.pdf",
            "",
        ];
        for input in inputs {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once, "input {input:?}");
            assert!(!once.contains(UNSAFE_CHARS), "input {input:?}");
        }
    }

    #[test]
    fn test_claim_unique_name_suffixes_collisions() {
        let mut taken = HashSet::new();
        assert_eq!(claim_unique_name("a.pdf", &mut taken), "a.pdf");
        assert_eq!(claim_unique_name("a.pdf", &mut taken), "a_2.pdf");
        assert_eq!(claim_unique_name("a.pdf", &mut taken), "a_3.pdf");
        assert_eq!(claim_unique_name("notes", &mut taken), "notes");
        assert_eq!(claim_unique_name("notes", &mut taken), "notes_2");
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("hw3.final.pdf", "txt"), "hw3.final.txt");
        assert_eq!(with_extension("README", "txt"), "README.txt");
    }
}
