//! Font size to heading level classification.

use super::font_stats::FontStatistics;
use crate::model::{FontSizeKey, HeadingLevel};

/// A heading size must exceed the body size by this ratio.
pub const HEADING_SIZE_RATIO: f32 = 1.15;

/// A heading size must carry fewer words than this share of the body bucket.
pub const HEADING_RARITY: f32 = 0.3;

/// Heading levels by font size, largest size first. At most three entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadingLevelMap {
    entries: Vec<(FontSizeKey, HeadingLevel)>,
}

impl HeadingLevelMap {
    /// Level assigned to a size, if any.
    pub fn level_for(&self, size: FontSizeKey) -> Option<HeadingLevel> {
        self.entries
            .iter()
            .find(|(k, _)| *k == size)
            .map(|(_, level)| *level)
    }

    /// Entries in descending size order.
    pub fn entries(&self) -> &[(FontSizeKey, HeadingLevel)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of [`classify_heading_levels`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Admitted heading sizes
    pub levels: HeadingLevelMap,
    /// Body font size; `None` when there were no statistics
    pub body_size: Option<FontSizeKey>,
}

/// Derive heading levels from the font distribution.
///
/// Sizes larger than the body are walked in descending order and admitted
/// while they are both larger by [`HEADING_SIZE_RATIO`] and rarer than
/// [`HEADING_RARITY`] of the body words. The walk stops at the first size
/// that fails or after the third admission.
pub fn classify_heading_levels(stats: &FontStatistics) -> Classification {
    let Some((body, body_bucket)) = stats.body_size() else {
        return Classification::default();
    };

    let mut classification = Classification {
        levels: HeadingLevelMap::default(),
        body_size: Some(body),
    };
    if body.size() <= 0.0 {
        return classification;
    }

    let mut candidates: Vec<(FontSizeKey, usize)> = stats
        .iter()
        .filter(|(k, _)| *k != body)
        .map(|(k, bucket)| (k, bucket.word_count))
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    let max_words = body_bucket.word_count as f32 * HEADING_RARITY;
    for (size, words) in candidates {
        let ratio = size.size() / body.size();
        if ratio <= HEADING_SIZE_RATIO || words as f32 >= max_words {
            break;
        }
        let rank = classification.levels.entries.len() + 1;
        let Some(level) = HeadingLevel::from_rank(rank) else {
            break;
        };
        classification.levels.entries.push((size, level));
    }

    log::debug!(
        "Body size {} ({} words), heading sizes: {:?}",
        body,
        body_bucket.word_count,
        classification
            .levels
            .entries
            .iter()
            .map(|(k, l)| format!("{}={}", k, l))
            .collect::<Vec<_>>()
    );

    classification
}

/// Level for a size that is missing from the level map, from its ratio to the body size.
pub fn level_from_size_ratio(ratio: f32) -> Option<HeadingLevel> {
    if ratio > 1.5 {
        Some(HeadingLevel::H1)
    } else if ratio > 1.25 {
        Some(HeadingLevel::H2)
    } else if ratio > 1.1 {
        Some(HeadingLevel::H3)
    } else {
        None
    }
}
