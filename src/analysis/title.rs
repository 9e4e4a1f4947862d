//! Title selection from first-page text.

use crate::model::LayoutBlock;
use crate::ocr::OcrBlock;

use super::index_of_max;

const FONT_WEIGHT: f32 = 40.0;
const POSITION_WEIGHT: f32 = 30.0;
const LENGTH_WEIGHT: f32 = 20.0;
const IDEAL_WORDS: f32 = 6.0;
const LONG_TITLE_WORDS: usize = 15;
const LONG_TITLE_PENALTY: f32 = 20.0;

/// Number of topmost OCR blocks considered for the title.
const OCR_TITLE_WINDOW: usize = 3;

/// A first-page block considered for the title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCandidate {
    pub text: String,
    /// Mean character size
    pub font_size: f32,
    /// Bottom edge of the block in page space
    pub y_position: f32,
    pub word_count: usize,
    pub char_count: usize,
}

impl TitleCandidate {
    /// Build a candidate from a block; `None` without text or glyphs.
    pub fn from_block(block: &LayoutBlock) -> Option<Self> {
        let text = block.trimmed_text();
        if text.is_empty() {
            return None;
        }
        let font_size = block.mean_size()?;
        Some(Self {
            text: text.to_string(),
            font_size,
            y_position: block.y0,
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        })
    }
}

/// Score every candidate relative to the largest font and highest position among them.
pub fn score_candidates(candidates: &[TitleCandidate]) -> Vec<f32> {
    let max_font = candidates
        .iter()
        .map(|c| c.font_size)
        .fold(f32::MIN, f32::max);
    let max_y = candidates
        .iter()
        .map(|c| c.y_position)
        .fold(f32::MIN, f32::max);

    candidates
        .iter()
        .map(|c| {
            let mut score = FONT_WEIGHT * relative(c.font_size, max_font)
                + POSITION_WEIGHT * relative(c.y_position, max_y);
            let length_score =
                LENGTH_WEIGHT - 2.0 * (c.word_count as f32 - IDEAL_WORDS).abs();
            score += length_score.max(0.0);
            if c.word_count > LONG_TITLE_WORDS {
                score -= LONG_TITLE_PENALTY;
            }
            score
        })
        .collect()
}

fn relative(value: f32, max: f32) -> f32 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

/// Pick the best-scoring candidate's text. Ties go to the earliest candidate.
pub fn select_title(candidates: &[TitleCandidate]) -> String {
    let scores = score_candidates(candidates);
    index_of_max(scores.iter().copied())
        .map(|i| candidates[i].text.clone())
        .unwrap_or_default()
}

/// Score the first page's blocks and return the title text, empty if none qualify.
pub fn select_title_from_blocks(blocks: &[LayoutBlock]) -> String {
    let candidates: Vec<TitleCandidate> =
        blocks.iter().filter_map(TitleCandidate::from_block).collect();
    select_title(&candidates)
}

/// Among the topmost OCR blocks, the one with the largest area.
///
/// `blocks` must already be ordered top of page first.
pub fn select_ocr_title(blocks: &[OcrBlock]) -> Option<String> {
    let window = &blocks[..blocks.len().min(OCR_TITLE_WINDOW)];
    index_of_max(window.iter().map(|b| b.area)).map(|i| window[i].text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, font_size: f32, y: f32) -> TitleCandidate {
        TitleCandidate {
            text: text.to_string(),
            font_size,
            y_position: y,
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }

    #[test]
    fn test_large_top_block_wins() {
        let candidates = vec![
            candidate("Quarterly Results for the Northern Region", 24.0, 720.0),
            candidate("Prepared by the finance team", 12.0, 680.0),
            candidate("Revenue grew strongly across all product lines this quarter", 10.0, 600.0),
        ];
        assert_eq!(
            select_title(&candidates),
            "Quarterly Results for the Northern Region"
        );
    }

    #[test]
    fn test_score_formula() {
        let candidates = vec![candidate("one two three four five six", 20.0, 700.0)];
        let scores = score_candidates(&candidates);
        assert!((scores[0] - 90.0).abs() < 1e-4);

        let long = "w ".repeat(16);
        let candidates = vec![
            candidate("one two three four five six", 20.0, 700.0),
            candidate(&long, 10.0, 350.0),
        ];
        let scores = score_candidates(&candidates);
        // 20 + 15 + 0 - 20
        assert!((scores[1] - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let candidates = vec![
            candidate("Alpha Report", 18.0, 700.0),
            candidate("Beta Report", 18.0, 700.0),
        ];
        assert_eq!(select_title(&candidates), "Alpha Report");
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(select_title(&[]), "");
        assert_eq!(select_title_from_blocks(&[LayoutBlock::new("  ", 0.0, vec![])]), "");
    }

    #[test]
    fn test_zero_position_does_not_divide_by_zero() {
        let candidates = vec![candidate("Only Block", 12.0, 0.0)];
        assert_eq!(select_title(&candidates), "Only Block");
    }

    #[test]
    fn test_ocr_title_largest_of_top_three() {
        let blocks = vec![
            OcrBlock::for_test("Header", 900.0, 100.0, 10.0),
            OcrBlock::for_test("Big Title", 850.0, 400.0, 40.0),
            OcrBlock::for_test("Subtitle", 800.0, 300.0, 20.0),
            OcrBlock::for_test("Huge Figure Caption", 100.0, 1000.0, 90.0),
        ];
        assert_eq!(select_ocr_title(&blocks), Some("Big Title".to_string()));
        assert_eq!(select_ocr_title(&[]), None);
    }
}
