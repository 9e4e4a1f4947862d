//! Heading and title inference.
//!
//! Given positioned text, decides which block is the title and which blocks
//! are headings at what level:
//!
//! - [`patterns`]: static lexical rules
//! - [`font_stats`]: font size distribution per document
//! - [`classifier`]: font size to heading level mapping
//! - [`predicate`]: per-span heading decision
//! - [`title`]: first-page title scoring

pub mod classifier;
pub mod font_stats;
pub mod patterns;
pub mod predicate;
pub mod title;

pub use classifier::{
    classify_heading_levels, level_from_size_ratio, Classification, HeadingLevelMap,
};
pub use font_stats::{FontBucket, FontStatistics};
pub use predicate::{is_potential_heading, SizeContext};
pub use title::{select_ocr_title, select_title, select_title_from_blocks, TitleCandidate};

use std::cmp::Ordering;

/// Index of the first maximum. Later equal values never replace an earlier one.
pub(crate) fn index_of_max<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f32>,
{
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v.partial_cmp(&b) != Some(Ordering::Greater) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
