//! Lexical rules for heading-like and non-heading-like text.
//!
//! All patterns are compiled once and shared read-only.

use regex::Regex;
use std::sync::LazyLock;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("built-in heading pattern must compile"))
        .collect()
}

/// Structures that usually mark a heading.
pub static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        // All caps
        r"^[A-Z][A-Z\s&-]+$",
        // Numbered section
        r"^\d+\.\s+[A-Z]",
        // Title case, optional trailing colon
        r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]*)*:?$",
        // Roman numeral section
        r"^[IVX]+\.\s+",
        r"^Chapter\s+\d+",
        r"^Section\s+\d+",
    ])
});

/// Text that is never a heading: page numbers, URLs, emails, asides.
pub static EXCLUSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^\d+$",
        r"(?i)^page\s+\d+$",
        r"(?i)^www\.",
        r"@",
        r"^\([^)]+\)$",
    ])
});

static OCR_ALL_CAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z\s]+$").expect("valid all-caps pattern"));

static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("valid numbered-prefix pattern"));

/// Whether any heading pattern matches.
pub fn matches_heading_pattern(text: &str) -> bool {
    HEADING_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Whether any exclusion pattern matches.
pub fn matches_exclusion_pattern(text: &str) -> bool {
    EXCLUSION_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Letters, spaces and nothing else, starting with a capital; or every cased
/// character is uppercase.
pub fn is_all_caps(text: &str) -> bool {
    if OCR_ALL_CAPS.is_match(text) {
        return true;
    }
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Starts with a section number such as `3.` or `12.`.
pub fn has_numbered_prefix(text: &str) -> bool {
    NUMBERED_PREFIX.is_match(text)
}
