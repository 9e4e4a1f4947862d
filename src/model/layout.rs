//! Positioned text produced by the native layout engine.

use std::fmt;

/// A font size rounded to one decimal place, stored in tenths of a point.
///
/// Used as the bucket key for font statistics so that sizes compare exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontSizeKey(i32);

impl FontSizeKey {
    /// Round a raw size to the nearest tenth of a point, ties to even.
    ///
    /// The product is taken in `f64`, where it is exact for every `f32` input,
    /// so ties are only those the stored size really has.
    pub fn from_size(size: f32) -> Self {
        Self((f64::from(size) * 10.0).round_ties_even() as i32)
    }

    /// The rounded size in points.
    pub fn size(self) -> f32 {
        self.0 as f32 / 10.0
    }
}

impl fmt::Display for FontSizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.size())
    }
}

/// A single glyph with its font metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutChar {
    /// The character
    pub ch: char,
    /// Effective font size in points
    pub size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Baseline Y position in page space
    pub y: f32,
}

impl LayoutChar {
    /// Create a new layout character.
    pub fn new(ch: char, size: f32, font_name: impl Into<String>, y: f32) -> Self {
        Self {
            ch,
            size,
            font_name: font_name.into(),
            y,
        }
    }

    /// Whether the font name suggests a bold face.
    pub fn is_bold(&self) -> bool {
        let name = self.font_name.to_lowercase();
        name.contains("bold") || name.contains("black") || name.contains("heavy")
    }
}

/// A text block (a run of lines the layout engine grouped together).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    /// The block text, lines joined by a single space
    pub text: String,
    /// Bottom edge of the block in page space (larger is higher on the page)
    pub y0: f32,
    /// Character-level font data
    pub chars: Vec<LayoutChar>,
}

impl LayoutBlock {
    /// Create a new block.
    pub fn new(text: impl Into<String>, y0: f32, chars: Vec<LayoutChar>) -> Self {
        Self {
            text: text.into(),
            y0,
            chars,
        }
    }

    /// Build a block whose characters all share one font, one char per non-space glyph.
    pub fn uniform(text: impl Into<String>, y0: f32, size: f32, font_name: &str) -> Self {
        let text = text.into();
        let chars = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| LayoutChar::new(c, size, font_name, y0))
            .collect();
        Self { text, y0, chars }
    }

    /// The block text with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// The most frequent rounded character size.
    ///
    /// Ties go to the size encountered first. `None` when the block has no characters.
    pub fn dominant_size(&self) -> Option<FontSizeKey> {
        let mut counts: Vec<(FontSizeKey, usize)> = Vec::new();
        for ch in &self.chars {
            let key = FontSizeKey::from_size(ch.size);
            match counts.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += 1,
                None => counts.push((key, 1)),
            }
        }

        let mut best: Option<(FontSizeKey, usize)> = None;
        for (key, n) in counts {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((key, n));
            }
        }
        best.map(|(key, _)| key)
    }

    /// Mean of the unrounded character sizes.
    pub fn mean_size(&self) -> Option<f32> {
        if self.chars.is_empty() {
            return None;
        }
        Some(self.chars.iter().map(|c| c.size).sum::<f32>() / self.chars.len() as f32)
    }

    /// Whether more than half of the characters are set in a bold face.
    pub fn is_bold(&self) -> bool {
        let bold = self.chars.iter().filter(|c| c.is_bold()).count();
        !self.chars.is_empty() && bold * 2 > self.chars.len()
    }

    /// Roll the block up into a positioned span. `None` for blocks without text or glyphs.
    pub fn to_span(&self, page: u32) -> Option<PositionedSpan> {
        let text = self.trimmed_text();
        if text.is_empty() {
            return None;
        }
        let size = self.dominant_size()?;
        Some(PositionedSpan {
            text: text.to_string(),
            font_size: size.size(),
            is_bold: self.is_bold(),
            y_position: self.y0,
            page,
        })
    }
}

/// One page of layout output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    /// Page number (1-indexed)
    pub number: u32,
    /// Text blocks in reading order
    pub blocks: Vec<LayoutBlock>,
}

impl LayoutPage {
    /// Create a page.
    pub fn new(number: u32, blocks: Vec<LayoutBlock>) -> Self {
        Self { number, blocks }
    }
}

/// A unit of text with its layout metadata, rolled up from one block.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedSpan {
    /// Trimmed text
    pub text: String,
    /// Dominant font size (rounded to one decimal)
    pub font_size: f32,
    /// Whether the span is predominantly bold
    pub is_bold: bool,
    /// Vertical position in page space
    pub y_position: f32,
    /// Page number (1-indexed)
    pub page: u32,
}
