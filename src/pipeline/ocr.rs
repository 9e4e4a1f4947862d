//! Heading inference over OCR detections.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::analysis::patterns::{has_numbered_prefix, is_all_caps};
use crate::analysis::{is_potential_heading, select_ocr_title};
use crate::model::{DocumentRecord, HeadingLevel, OutlineEntry};
use crate::ocr::{OcrBlock, OcrPage};

/// Recognition output for one page, tagged with its page number.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedPage {
    /// Page number (1-indexed)
    pub number: u32,
    pub ocr: OcrPage,
}

/// Confident, non-empty blocks of a page, top of the page first.
pub fn page_blocks(page: &OcrPage, min_confidence: f32) -> Vec<OcrBlock> {
    let mut blocks: Vec<OcrBlock> = page
        .detections
        .iter()
        .filter(|d| d.confidence > min_confidence)
        .map(|d| OcrBlock::from_detection(d, page.height))
        .filter(|b| !b.text.is_empty())
        .collect();
    blocks.sort_by(|a, b| b.y_center.partial_cmp(&a.y_center).unwrap_or(Ordering::Equal));
    blocks
}

/// Level from the shape of the text alone.
pub fn ocr_heading_level(text: &str) -> HeadingLevel {
    if is_all_caps(text) {
        HeadingLevel::H1
    } else if has_numbered_prefix(text) || text.ends_with(':') {
        HeadingLevel::H2
    } else {
        HeadingLevel::H3
    }
}

/// Build a record from recognized pages. The title comes from the first page.
pub fn run_ocr(pages: &[RecognizedPage], min_confidence: f32) -> DocumentRecord {
    let mut title = String::new();
    let mut outline = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, page) in pages.iter().enumerate() {
        let blocks = page_blocks(&page.ocr, min_confidence);

        if index == 0 && title.is_empty() {
            title = select_ocr_title(&blocks).unwrap_or_default();
        }

        for block in blocks {
            if block.text == title || seen.contains(&block.text) {
                continue;
            }
            if !is_potential_heading(&block.text, None) {
                continue;
            }
            let level = ocr_heading_level(&block.text);
            seen.insert(block.text.clone());
            outline.push(OutlineEntry::new(level, block.text, page.number));
        }
    }

    DocumentRecord::new(title, outline)
}
