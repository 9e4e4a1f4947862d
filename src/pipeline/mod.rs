//! Dual-path outline extraction.
//!
//! The native path reads positioned text straight from the PDF. When it fails,
//! or succeeds without finding a title or any heading, the OCR path renders
//! the pages and recognizes their text instead. The two results are merged and
//! a document that yields nothing at all is named after its file.

mod native;
mod ocr;
mod options;

pub use native::{analyze_layout, run_native, LayoutAnalysis};
pub use ocr::{ocr_heading_level, page_blocks, run_ocr, RecognizedPage};
pub use options::{Deadline, ExtractOptions, DEFAULT_MIN_OCR_CONFIDENCE};

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{dedupe_outline, DocumentRecord};
use crate::ocr::{OcrEngine, PdftoppmRasterizer, Rasterizer, TesseractConfig, TesseractEngine};
use crate::parser::{LayoutSource, LopdfLayout};

/// Result of one extraction path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// The path produced a record (possibly empty)
    Success(DocumentRecord),
    /// The path raised an error or ran out of time
    Failed,
}

impl PathOutcome {
    /// Convert a path result, logging the failure.
    fn from_result(path_name: &str, file: &Path, result: Result<DocumentRecord>) -> Self {
        match result {
            Ok(record) => PathOutcome::Success(record),
            Err(e) => {
                log::warn!("{} extraction failed for {}: {}", path_name, file.display(), e);
                PathOutcome::Failed
            }
        }
    }

    /// Whether the path succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, PathOutcome::Success(_))
    }

    /// The record, if the path succeeded.
    pub fn record(&self) -> Option<&DocumentRecord> {
        match self {
            PathOutcome::Success(record) => Some(record),
            PathOutcome::Failed => None,
        }
    }

    fn into_record(self) -> Option<DocumentRecord> {
        match self {
            PathOutcome::Success(record) => Some(record),
            PathOutcome::Failed => None,
        }
    }
}

/// Combine the native outcome with the OCR outcome.
///
/// `None` when neither path produced a record.
pub fn merge_outcomes(native: PathOutcome, ocr: PathOutcome) -> Option<DocumentRecord> {
    match (native, ocr) {
        (PathOutcome::Success(native), PathOutcome::Success(ocr)) => {
            let title = if native.title.is_empty() {
                ocr.title
            } else {
                native.title
            };
            let mut outline = native.outline;
            outline.extend(ocr.outline);
            Some(DocumentRecord::new(title, dedupe_outline(outline)))
        }
        (native, ocr) => native.into_record().or_else(|| ocr.into_record()),
    }
}

/// OCR collaborators, built once and shared across documents.
pub struct OcrBackend {
    rasterizer: Box<dyn Rasterizer>,
    engine: Arc<dyn OcrEngine>,
}

impl OcrBackend {
    pub fn new(rasterizer: Box<dyn Rasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        Self { rasterizer, engine }
    }

    /// `pdftoppm` and `tesseract`, failing if either program is missing.
    pub fn tesseract(config: &TesseractConfig) -> Result<Self> {
        let rasterizer = PdftoppmRasterizer::new(config)?;
        let engine = TesseractEngine::new(config)?;
        Ok(Self::new(Box::new(rasterizer), Arc::new(engine)))
    }

    /// The OCR engine.
    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }
}

/// Extracts a title and heading outline from PDF files.
pub struct OutlineExtractor {
    layout: Box<dyn LayoutSource>,
    ocr: Option<OcrBackend>,
    options: ExtractOptions,
}

impl OutlineExtractor {
    /// Native extraction through the given layout source, no OCR.
    pub fn new(layout: Box<dyn LayoutSource>) -> Self {
        Self {
            layout,
            ocr: None,
            options: ExtractOptions::default(),
        }
    }

    /// Native extraction with `lopdf` only.
    pub fn native_only() -> Self {
        Self::new(Box::new(LopdfLayout::new()))
    }

    /// `lopdf` layout with the Tesseract fallback.
    pub fn with_defaults(config: &TesseractConfig) -> Result<Self> {
        Ok(Self::native_only().with_ocr(OcrBackend::tesseract(config)?))
    }

    /// Attach OCR collaborators.
    pub fn with_ocr(mut self, backend: OcrBackend) -> Self {
        self.ocr = Some(backend);
        self
    }

    /// Set extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// The active options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Whether OCR collaborators are attached.
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Run the native path alone.
    pub fn native(&self, path: &Path) -> PathOutcome {
        let deadline = Deadline::start(self.options.deadline);
        self.native_path(path, &deadline)
    }

    /// Run the OCR path alone. Fails when no OCR collaborators are attached.
    pub fn ocr(&self, path: &Path) -> PathOutcome {
        let deadline = Deadline::start(self.options.deadline);
        self.ocr_path(path, &deadline)
    }

    /// Extract the record for one document. Never fails.
    pub fn extract(&self, path: &Path) -> DocumentRecord {
        let deadline = Deadline::start(self.options.deadline);
        let native = self.native_path(path, &deadline);

        let needs_ocr = native.record().map_or(true, DocumentRecord::is_empty);
        let record = if needs_ocr && self.options.ocr_fallback && self.ocr.is_some() {
            log::info!("Falling back to OCR for {}", path.display());
            let ocr = self.ocr_path(path, &deadline);
            merge_outcomes(native, ocr)
        } else {
            native.into_record()
        };

        match record {
            Some(record) if !record.is_empty() => {
                log::debug!(
                    "Extracted {} headings from {} in {:.2?}",
                    record.outline.len(),
                    path.display(),
                    deadline.elapsed()
                );
                record
            }
            _ => {
                log::info!("No title or headings found in {}, using file name", path.display());
                DocumentRecord::from_file_name(path)
            }
        }
    }

    fn native_path(&self, path: &Path, deadline: &Deadline) -> PathOutcome {
        log::debug!("Native extraction: {}", path.display());
        let result = self.layout.extract_pages(path).and_then(|pages| {
            deadline.check()?;
            run_native(&pages).ok_or_else(|| Error::PdfParse("document has no pages".to_string()))
        });
        PathOutcome::from_result("Native", path, result)
    }

    fn ocr_path(&self, path: &Path, deadline: &Deadline) -> PathOutcome {
        let Some(backend) = &self.ocr else {
            log::warn!("OCR requested for {} but no engine is configured", path.display());
            return PathOutcome::Failed;
        };
        log::debug!("OCR extraction ({}): {}", backend.engine.name(), path.display());

        let result = self.recognize_document(backend, path, deadline);
        PathOutcome::from_result("OCR", path, result)
    }

    fn recognize_document(
        &self,
        backend: &OcrBackend,
        path: &Path,
        deadline: &Deadline,
    ) -> Result<DocumentRecord> {
        let images = backend.rasterizer.rasterize(path)?;
        let mut pages = Vec::with_capacity(images.pages().len());
        for image in images.pages() {
            deadline.check()?;
            pages.push(RecognizedPage {
                number: image.page,
                ocr: backend.engine.recognize(image)?,
            });
        }
        Ok(run_ocr(&pages, self.options.min_ocr_confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};

    fn record(title: &str, headings: &[&str]) -> DocumentRecord {
        DocumentRecord::new(
            title,
            headings
                .iter()
                .map(|h| OutlineEntry::new(HeadingLevel::H2, *h, 1))
                .collect(),
        )
    }

    #[test]
    fn test_merge_both_succeeded() {
        let merged = merge_outcomes(
            PathOutcome::Success(record("", &["Scope", "Terms"])),
            PathOutcome::Success(record("Scanned Title", &["Terms", "Annex"])),
        )
        .unwrap();
        assert_eq!(merged.title, "Scanned Title");
        let texts: Vec<&str> = merged.outline.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Scope", "Terms", "Annex"]);
    }

    #[test]
    fn test_merge_prefers_native_title() {
        let merged = merge_outcomes(
            PathOutcome::Success(record("Native", &[])),
            PathOutcome::Success(record("Scanned", &[])),
        )
        .unwrap();
        assert_eq!(merged.title, "Native");
    }

    #[test]
    fn test_merge_single_success() {
        let ocr = record("Scanned", &["Annex"]);
        assert_eq!(
            merge_outcomes(PathOutcome::Failed, PathOutcome::Success(ocr.clone())),
            Some(ocr)
        );
        let native = record("", &[]);
        assert_eq!(
            merge_outcomes(PathOutcome::Success(native.clone()), PathOutcome::Failed),
            Some(native)
        );
        assert_eq!(merge_outcomes(PathOutcome::Failed, PathOutcome::Failed), None);
    }

    #[test]
    fn test_ocr_without_backend_fails() {
        let extractor = OutlineExtractor::native_only();
        assert_eq!(extractor.ocr(Path::new("any.pdf")), PathOutcome::Failed);
    }

    #[test]
    fn test_unreadable_file_falls_back_to_file_name() {
        let extractor = OutlineExtractor::native_only();
        let record = extractor.extract(Path::new("/nonexistent/dir/Budget 2024.pdf"));
        assert_eq!(record, DocumentRecord::new("Budget 2024", vec![]));
    }
}
