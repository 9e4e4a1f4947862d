//! Layout source abstraction.
//!
//! The native path only needs positioned text per page. [`LayoutSource`]
//! isolates the concrete PDF library (lopdf) from heading inference so the
//! pipeline can be driven by any producer of [`LayoutPage`]s.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::check_pdf_header;
use crate::error::{Error, Result};
use crate::model::LayoutPage;

use super::layout::LayoutAnalyzer;

/// Produces positioned text blocks for every page of a document.
pub trait LayoutSource: Send + Sync {
    /// Extract all pages in page order. Page numbers are 1-indexed.
    fn extract_pages(&self, path: &Path) -> Result<Vec<LayoutPage>>;
}

/// [`LayoutSource`] backed by `lopdf` and the content stream analyzer.
#[derive(Debug, Clone, Default)]
pub struct LopdfLayout {
    /// Abort the whole document when a single page fails to decode.
    strict: bool,
}

impl LopdfLayout {
    /// Create a lenient layout source: undecodable pages are left empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the document on the first page that cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Load a document, checking the header first so non-PDF input fails fast.
    pub fn load(path: &Path) -> Result<LopdfDocument> {
        check_pdf_header(path)?;
        let doc = LopdfDocument::load(path)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(doc)
    }

    /// Extract pages from an already loaded document.
    pub fn pages_of(&self, doc: &LopdfDocument) -> Result<Vec<LayoutPage>> {
        let analyzer = LayoutAnalyzer::new(doc);
        let mut pages = Vec::new();

        for (number, page_id) in doc.get_pages() {
            let blocks = match analyzer.extract_page_blocks(page_id) {
                Ok(blocks) => blocks,
                Err(e) if !self.strict => {
                    log::warn!("Skipping page {}: {}", number, e);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            pages.push(LayoutPage::new(number, blocks));
        }

        Ok(pages)
    }
}

impl LayoutSource for LopdfLayout {
    fn extract_pages(&self, path: &Path) -> Result<Vec<LayoutPage>> {
        let doc = Self::load(path)?;
        let pages = self.pages_of(&doc)?;
        log::debug!(
            "Extracted layout for {} pages of {}",
            pages.len(),
            path.display()
        );
        Ok(pages)
    }
}
