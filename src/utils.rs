// src/utils.rs
use std::path::{Path, PathBuf};

/// Truncate on a character boundary; prompt payloads are bounded in chars.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Normalize a free-form name for file system usage.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build a unique output file stem for a generated document.
pub fn output_stem(company: &str, role: &str) -> String {
    format!(
        "{}_{}_{}",
        slugify(company),
        slugify(role),
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    )
}

/// Build an output file path under the given directory.
pub fn output_file_path(base: &Path, stem: &str, extension: &str) -> PathBuf {
    base.join(format!("{}.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        // multi-byte characters must not be split
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Corp"), "acme_corp");
        assert_eq!(slugify("dev-ops_1"), "dev-ops_1");
        assert_eq!(slugify("C++ Engineer"), "c___engineer");
    }

    #[test]
    fn test_output_stem_contains_both_parts() {
        let stem = output_stem("Acme Corp", "Rust Engineer");
        assert!(stem.starts_with("acme_corp_rust_engineer_"));
    }
}
