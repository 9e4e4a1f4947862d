//! Integration tests for the dual-path extractor with mock collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pdfoutline::error::{Error, Result};
use pdfoutline::model::{DocumentRecord, HeadingLevel, LayoutBlock, LayoutPage, OutlineEntry};
use pdfoutline::ocr::{OcrDetection, OcrEngine, OcrPage, PageImage, RasterizedDocument, Rasterizer};
use pdfoutline::parser::LayoutSource;
use pdfoutline::pipeline::{ExtractOptions, OcrBackend, OutlineExtractor, PathOutcome};

const BODY: &str = "field teams collected samples at each site and logged the weather along with the water level";

/// Layout source returning fixed pages, or an error.
struct MockLayout {
    pages: Option<Vec<LayoutPage>>,
}

impl MockLayout {
    fn pages(pages: Vec<LayoutPage>) -> Box<Self> {
        Box::new(Self { pages: Some(pages) })
    }

    fn failing() -> Box<Self> {
        Box::new(Self { pages: None })
    }
}

impl LayoutSource for MockLayout {
    fn extract_pages(&self, _path: &Path) -> Result<Vec<LayoutPage>> {
        self.pages
            .clone()
            .ok_or_else(|| Error::PdfParse("mock layout failure".to_string()))
    }
}

/// Rasterizer producing one placeholder image per page.
struct MockRasterizer {
    pages: u32,
    fail: bool,
}

impl Rasterizer for MockRasterizer {
    fn rasterize(&self, _path: &Path) -> Result<RasterizedDocument> {
        if self.fail {
            return Err(Error::Rasterize("mock rasterizer failure".to_string()));
        }
        Ok(RasterizedDocument::new(
            (1..=self.pages)
                .map(|page| PageImage {
                    page,
                    path: PathBuf::from(format!("page-{}.png", page)),
                })
                .collect(),
        ))
    }
}

/// OCR engine answering from a page-number table and counting calls.
struct MockOcr {
    pages: HashMap<u32, OcrPage>,
    calls: AtomicUsize,
}

impl MockOcr {
    fn new(pages: Vec<(u32, Vec<OcrDetection>)>) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .into_iter()
                .map(|(n, detections)| {
                    (
                        n,
                        OcrPage {
                            width: 1000.0,
                            height: 1400.0,
                            detections,
                        },
                    )
                })
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

impl OcrEngine for MockOcr {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, image: &PageImage) -> Result<OcrPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.get(&image.page).cloned().unwrap_or_default())
    }
}

fn backend(pages: u32, engine: Arc<MockOcr>) -> OcrBackend {
    OcrBackend::new(Box::new(MockRasterizer { pages, fail: false }), engine)
}

fn det(text: &str, top: f32, width: f32, height: f32) -> OcrDetection {
    OcrDetection::from_rect(text, 80.0, top, width, height, 0.95)
}

fn heading_document() -> Vec<LayoutPage> {
    vec![LayoutPage::new(
        1,
        vec![
            LayoutBlock::uniform("Survey Notes From The Northern Lakes", 760.0, 12.0, "Times-Roman"),
            LayoutBlock::uniform("Introduction", 500.0, 18.0, "Times-Bold"),
            LayoutBlock::uniform(BODY, 460.0, 12.0, "Times-Roman"),
            LayoutBlock::uniform(BODY, 420.0, 12.0, "Times-Roman"),
        ],
    )]
}

#[test]
fn test_single_native_heading() {
    let extractor = OutlineExtractor::new(MockLayout::pages(heading_document()));
    let record = extractor.extract(Path::new("survey.pdf"));

    assert_eq!(
        record.outline,
        vec![OutlineEntry::new(HeadingLevel::H1, "Introduction", 1)]
    );
    assert_eq!(record.title, "Survey Notes From The Northern Lakes");
}

#[test]
fn test_native_success_skips_ocr() {
    let engine = MockOcr::new(vec![]);
    let extractor = OutlineExtractor::new(MockLayout::pages(heading_document()))
        .with_ocr(backend(2, engine.clone()));

    extractor.extract(Path::new("survey.pdf"));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_native_failure_and_empty_ocr_uses_file_stem() {
    let engine = MockOcr::new(vec![]);
    let extractor =
        OutlineExtractor::new(MockLayout::failing()).with_ocr(backend(1, engine.clone()));

    let record = extractor.extract(Path::new("/data/in/Site Report 7.pdf"));
    assert_eq!(record, DocumentRecord::new("Site Report 7", vec![]));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_native_failure_uses_ocr_record() {
    let engine = MockOcr::new(vec![
        (
            1,
            vec![
                det("Scanned Field Manual", 60.0, 700.0, 60.0),
                det("SAFETY", 300.0, 150.0, 30.0),
            ],
        ),
        (2, vec![det("2. Equipment", 80.0, 250.0, 30.0)]),
    ]);
    let extractor = OutlineExtractor::new(MockLayout::failing()).with_ocr(backend(2, engine));

    let record = extractor.extract(Path::new("manual.pdf"));
    assert_eq!(record.title, "Scanned Field Manual");
    assert_eq!(
        record.outline,
        vec![
            OutlineEntry::new(HeadingLevel::H1, "SAFETY", 1),
            OutlineEntry::new(HeadingLevel::H2, "2. Equipment", 2),
        ]
    );
}

#[test]
fn test_empty_native_merges_with_ocr() {
    // No usable native text: no title candidates and no headings.
    let native_pages = vec![LayoutPage::new(1, vec![LayoutBlock::new("", 700.0, vec![])])];
    let engine = MockOcr::new(vec![(
        1,
        vec![
            det("Scanned Title", 60.0, 700.0, 60.0),
            det("Overview:", 300.0, 150.0, 30.0),
        ],
    )]);
    let extractor =
        OutlineExtractor::new(MockLayout::pages(native_pages)).with_ocr(backend(1, engine));

    let record = extractor.extract(Path::new("scan.pdf"));
    assert_eq!(record.title, "Scanned Title");
    assert_eq!(
        record.outline,
        vec![OutlineEntry::new(HeadingLevel::H2, "Overview:", 1)]
    );
}

#[test]
fn test_no_pages_is_a_failed_path() {
    let extractor = OutlineExtractor::new(MockLayout::pages(vec![]));
    assert_eq!(extractor.native(Path::new("empty.pdf")), PathOutcome::Failed);
    assert_eq!(
        extractor.extract(Path::new("empty.pdf")),
        DocumentRecord::new("empty", vec![])
    );
}

#[test]
fn test_rasterizer_failure_falls_back_to_file_name() {
    let engine = MockOcr::new(vec![]);
    let extractor = OutlineExtractor::new(MockLayout::failing()).with_ocr(OcrBackend::new(
        Box::new(MockRasterizer {
            pages: 1,
            fail: true,
        }),
        engine.clone(),
    ));

    assert_eq!(extractor.ocr(Path::new("x.pdf")), PathOutcome::Failed);
    assert_eq!(
        extractor.extract(Path::new("broken.pdf")),
        DocumentRecord::new("broken", vec![])
    );
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ocr_fallback_can_be_disabled() {
    let engine = MockOcr::new(vec![(1, vec![det("Scanned", 60.0, 700.0, 60.0)])]);
    let extractor = OutlineExtractor::new(MockLayout::failing())
        .with_ocr(backend(1, engine.clone()))
        .with_options(ExtractOptions::new().native_only());

    let record = extractor.extract(Path::new("scan.pdf"));
    assert_eq!(record.title, "scan");
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_expired_deadline_fails_both_paths() {
    let engine = MockOcr::new(vec![(1, vec![det("Scanned", 60.0, 700.0, 60.0)])]);
    let extractor = OutlineExtractor::new(MockLayout::pages(heading_document()))
        .with_ocr(backend(3, engine.clone()))
        .with_options(ExtractOptions::new().with_deadline(Duration::ZERO));

    assert_eq!(extractor.native(Path::new("slow.pdf")), PathOutcome::Failed);
    assert_eq!(
        extractor.extract(Path::new("slow.pdf")),
        DocumentRecord::new("slow", vec![])
    );
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_outline_text_is_unique() {
    let mut pages = heading_document();
    pages.push(LayoutPage::new(
        2,
        vec![
            LayoutBlock::uniform("Introduction", 700.0, 18.0, "Times-Bold"),
            LayoutBlock::uniform(BODY, 660.0, 12.0, "Times-Roman"),
        ],
    ));
    let extractor = OutlineExtractor::new(MockLayout::pages(pages));
    let record = extractor.extract(Path::new("survey.pdf"));

    assert_eq!(record.outline.len(), 1);
    assert_eq!(record.outline[0].page, 1);
}
