//! Heading inference over native text layout.

use std::collections::HashSet;

use crate::analysis::{
    classify_heading_levels, is_potential_heading, level_from_size_ratio,
    select_title_from_blocks, Classification, FontStatistics, SizeContext,
};
use crate::model::{
    DocumentRecord, FontSizeKey, HeadingLevel, LayoutPage, OutlineEntry, PositionedSpan,
};

/// Document-level facts the native path derives before walking the blocks.
#[derive(Debug, Clone)]
pub struct LayoutAnalysis {
    pub statistics: FontStatistics,
    pub classification: Classification,
    /// Title chosen from the first page
    pub title: String,
    pub page_count: usize,
}

/// Aggregate font statistics, classify heading sizes and pick the title.
///
/// Returns `None` for a document without pages.
pub fn analyze_layout(pages: &[LayoutPage]) -> Option<LayoutAnalysis> {
    let first_page = pages.first()?;
    let statistics = FontStatistics::from_pages(pages);
    let classification = classify_heading_levels(&statistics);
    Some(LayoutAnalysis {
        statistics,
        classification,
        title: select_title_from_blocks(&first_page.blocks),
        page_count: pages.len(),
    })
}

/// Build a record from every page's layout blocks.
///
/// Returns `None` for a document without pages.
pub fn run_native(pages: &[LayoutPage]) -> Option<DocumentRecord> {
    let LayoutAnalysis {
        classification,
        title,
        ..
    } = analyze_layout(pages)?;
    let body_size = classification.body_size.map(|k| k.size());

    let mut outline = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for page in pages {
        for span in page.blocks.iter().filter_map(|b| b.to_span(page.number)) {
            if seen.contains(&span.text) || span.text == title {
                continue;
            }
            let level = classification
                .levels
                .level_for(FontSizeKey::from_size(span.font_size))
                .or_else(|| fallback_level(&span, body_size));

            if let Some(level) = level {
                seen.insert(span.text.clone());
                outline.push(OutlineEntry::new(level, span.text, span.page));
            }
        }
    }

    Some(DocumentRecord::new(title, outline))
}

/// Level for a span whose size is not in the level map.
fn fallback_level(span: &PositionedSpan, body_size: Option<f32>) -> Option<HeadingLevel> {
    let sizes = body_size.map(|body| SizeContext::new(span.font_size, body));
    if !is_potential_heading(&span.text, sizes) {
        return None;
    }
    let ratio = match body_size {
        Some(body) if body > 0.0 => span.font_size / body,
        _ => 1.0,
    };
    level_from_size_ratio(ratio)
}
