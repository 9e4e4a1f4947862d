//! Per-span "is this a heading" decision.

use super::patterns::{matches_exclusion_pattern, matches_heading_pattern};

/// Longer text is treated as a paragraph.
const MAX_HEADING_CHARS: usize = 200;
const MAX_HEADING_WORDS: usize = 20;

/// A span larger than the body by this ratio counts as a heading.
const FONT_HEADING_RATIO: f32 = 1.1;

/// Colon-terminated labels up to this many words count as headings.
const MAX_LABEL_WORDS: usize = 5;

/// Short capitalized lines up to this many words count as headings.
const MAX_SHORT_LINE_WORDS: usize = 8;

/// Font sizes available on the native path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeContext {
    /// Dominant size of the span
    pub font_size: f32,
    /// Body size of the document
    pub body_size: f32,
}

impl SizeContext {
    pub fn new(font_size: f32, body_size: f32) -> Self {
        Self {
            font_size,
            body_size,
        }
    }
}

/// Decide whether a piece of text looks like a heading.
///
/// Rules are applied in order and the first one that decides wins: minimum
/// length, exclusions, maximum length, heading patterns, font size, colon
/// labels, short capitalized lines.
pub fn is_potential_heading(text: &str, sizes: Option<SizeContext>) -> bool {
    let text = text.trim();
    let char_count = text.chars().count();
    if char_count < 2 {
        return false;
    }

    if matches_exclusion_pattern(text) {
        return false;
    }

    let word_count = text.split_whitespace().count();
    if char_count > MAX_HEADING_CHARS || word_count > MAX_HEADING_WORDS {
        return false;
    }

    if matches_heading_pattern(text) {
        return true;
    }

    if let Some(ctx) = sizes {
        if ctx.font_size > 0.0
            && ctx.body_size > 0.0
            && ctx.font_size > ctx.body_size * FONT_HEADING_RATIO
        {
            return true;
        }
    }

    if text.ends_with(':') && word_count <= MAX_LABEL_WORDS {
        return true;
    }

    word_count <= MAX_SHORT_LINE_WORDS && text.chars().next().is_some_and(char::is_uppercase)
}
