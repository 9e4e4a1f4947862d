//! Document-wide font size distribution.

use crate::model::{FontSizeKey, LayoutBlock, LayoutPage};

/// Maximum characters kept per sample context.
const SAMPLE_CONTEXT_CHARS: usize = 50;

/// Usage of one rounded font size across a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontBucket {
    /// Words in blocks whose dominant size is this bucket's size
    pub word_count: usize,
    /// Page number of every contributing block, in document order
    pub page_occurrences: Vec<u32>,
    /// Leading text of every contributing block
    pub sample_contexts: Vec<String>,
}

/// Font statistics keyed by dominant block size.
///
/// Buckets are kept in order of first appearance, which is the tie-break
/// order when two sizes carry the same number of words.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    buckets: Vec<(FontSizeKey, FontBucket)>,
}

impl FontStatistics {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate every block of every page.
    pub fn from_pages(pages: &[LayoutPage]) -> Self {
        let mut stats = Self::new();
        for page in pages {
            for block in &page.blocks {
                stats.add_block(page.number, block);
            }
        }
        stats
    }

    /// Add one block. Blocks without text or glyphs contribute nothing.
    pub fn add_block(&mut self, page: u32, block: &LayoutBlock) {
        let text = block.trimmed_text();
        if text.is_empty() {
            return;
        }
        let Some(size) = block.dominant_size() else {
            return;
        };

        let bucket = self.bucket_mut(size);
        bucket.word_count += text.split_whitespace().count();
        bucket.page_occurrences.push(page);
        bucket
            .sample_contexts
            .push(text.chars().take(SAMPLE_CONTEXT_CHARS).collect());
    }

    /// Add words directly to a bucket.
    pub fn add_words(&mut self, size: FontSizeKey, words: usize) {
        self.bucket_mut(size).word_count += words;
    }

    fn bucket_mut(&mut self, size: FontSizeKey) -> &mut FontBucket {
        let idx = match self.buckets.iter().position(|(k, _)| *k == size) {
            Some(idx) => idx,
            None => {
                self.buckets.push((size, FontBucket::default()));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[idx].1
    }

    /// Look up a bucket.
    pub fn get(&self, size: FontSizeKey) -> Option<&FontBucket> {
        self.buckets
            .iter()
            .find(|(k, _)| *k == size)
            .map(|(_, bucket)| bucket)
    }

    /// Iterate buckets in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (FontSizeKey, &FontBucket)> {
        self.buckets.iter().map(|(k, bucket)| (*k, bucket))
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no block contributed.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total words across all buckets.
    pub fn total_words(&self) -> usize {
        self.buckets.iter().map(|(_, b)| b.word_count).sum()
    }

    /// The size carrying the most words; ties go to the size seen first.
    pub fn body_size(&self) -> Option<(FontSizeKey, &FontBucket)> {
        let mut best: Option<(FontSizeKey, &FontBucket)> = None;
        for (key, bucket) in self.iter() {
            if best.map_or(true, |(_, b)| bucket.word_count > b.word_count) {
                best = Some((key, bucket));
            }
        }
        best
    }
}
