//! # pdfoutline
//!
//! Title and heading outline extraction for PDF documents.
//!
//! For every document the library produces a small JSON record: a title and
//! a list of H1/H2/H3 headings with their page numbers. Headings are inferred
//! from the font size distribution of the document's native text; scanned
//! documents fall back to OCR through external `pdftoppm` and `tesseract`
//! programs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline, to_json, JsonFormat};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let record = extract_outline("document.pdf");
//!     println!("{}", to_json(&record, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Font statistics**: body size by word count, heading sizes by rarity
//! - **Heuristics**: numbered sections, all-caps lines, chapter markers
//! - **OCR fallback**: merged with native results when native text is empty
//! - **Batch mode**: one JSON file per PDF in a directory

pub mod analysis;
pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use batch::{run_batch, BatchConfig, BatchSummary, DocumentReport};
pub use detect::{check_pdf_header, has_pdf_extension};
pub use error::{Error, Result};
pub use model::{
    DocumentRecord, FontSizeKey, HeadingLevel, LayoutBlock, LayoutChar, LayoutPage, OutlineEntry,
    PositionedSpan,
};
pub use ocr::{OcrEngine, Rasterizer, TesseractConfig};
pub use parser::{LayoutSource, LopdfLayout};
pub use pipeline::{
    ExtractOptions, LayoutAnalysis, OcrBackend, OutlineExtractor, PathOutcome,
};
pub use render::{to_json, validate_value, JsonFormat};

use std::path::Path;

/// Extract the title and outline of a PDF file from its native text.
///
/// Never fails; a document that yields nothing is titled after its file name.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline;
///
/// let record = extract_outline("report.pdf");
/// for entry in &record.outline {
///     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
/// }
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> DocumentRecord {
    OutlineExtractor::native_only().extract(path.as_ref())
}

/// Extract with the Tesseract OCR fallback.
///
/// Fails only if `pdftoppm` or `tesseract` cannot be started.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{extract_outline_with_ocr, TesseractConfig};
///
/// let config = TesseractConfig::new().with_language("eng+deu");
/// let record = extract_outline_with_ocr("scan.pdf", &config)?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
pub fn extract_outline_with_ocr<P: AsRef<Path>>(
    path: P,
    config: &TesseractConfig,
) -> Result<DocumentRecord> {
    let extractor = OutlineExtractor::with_defaults(config)?;
    Ok(extractor.extract(path.as_ref()))
}

/// Font statistics, heading sizes and title candidate for a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::inspect_file;
///
/// let analysis = inspect_file("report.pdf")?;
/// for (size, level) in analysis.classification.levels.entries() {
///     println!("{} pt -> {}", size, level);
/// }
/// # Ok::<(), pdfoutline::Error>(())
/// ```
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<LayoutAnalysis> {
    let pages = LopdfLayout::new().extract_pages(path.as_ref())?;
    pipeline::analyze_layout(&pages)
        .ok_or_else(|| Error::PdfParse("document has no pages".to_string()))
}
