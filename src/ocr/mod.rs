//! Rasterization and OCR collaborators.
//!
//! The OCR path never looks inside a page image: a [`Rasterizer`] turns a PDF
//! into page images and an [`OcrEngine`] turns each image into text
//! detections with boxes and confidences.
//!
//! Engines are built once per process and shared read-only. Both traits
//! require `Send + Sync`; implementations that wrap a non-reentrant runtime
//! must serialize calls internally.

mod tesseract;

pub use tesseract::{parse_tsv, PdftoppmRasterizer, TesseractConfig, TesseractEngine};

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

/// One rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Image file on disk
    pub path: PathBuf,
}

/// Page images for one document.
///
/// When the images live in a scratch directory, the directory is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct RasterizedDocument {
    pages: Vec<PageImage>,
    _scratch: Option<TempDir>,
}

impl RasterizedDocument {
    /// Images owned by the caller.
    pub fn new(pages: Vec<PageImage>) -> Self {
        Self {
            pages,
            _scratch: None,
        }
    }

    /// Images stored in a scratch directory that lives as long as this value.
    pub fn in_scratch_dir(pages: Vec<PageImage>, dir: TempDir) -> Self {
        Self {
            pages,
            _scratch: Some(dir),
        }
    }

    /// Page images in page order.
    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }
}

/// Renders document pages to images.
pub trait Rasterizer: Send + Sync {
    /// Render every page of the document.
    fn rasterize(&self, path: &Path) -> Result<RasterizedDocument>;
}

/// Recognizes text regions in a page image.
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Run recognition on one page image.
    fn recognize(&self, image: &PageImage) -> Result<OcrPage>;
}

/// A detected text region.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrDetection {
    /// Corner points in image coordinates (origin top-left, y grows downward)
    pub quad: [(f32, f32); 4],
    /// Recognized text
    pub text: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

impl OcrDetection {
    /// Detection with an axis-aligned box.
    pub fn from_rect(
        text: impl Into<String>,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        confidence: f32,
    ) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            quad: [(left, top), (right, top), (right, bottom), (left, bottom)],
            text: text.into(),
            confidence,
        }
    }
}

/// Recognition output for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrPage {
    /// Image width in pixels
    pub width: f32,
    /// Image height in pixels
    pub height: f32,
    /// Detected regions
    pub detections: Vec<OcrDetection>,
}

/// A detection reduced to the geometry the OCR path reasons about.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrBlock {
    /// Trimmed text
    pub text: String,
    pub confidence: f32,
    pub x_center: f32,
    /// Vertical center measured upward from the bottom of the page
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
    pub area: f32,
}

impl OcrBlock {
    /// Derive center, extent and area from a detection's corner points.
    pub fn from_detection(detection: &OcrDetection, page_height: f32) -> Self {
        let xs = detection.quad.map(|(x, _)| x);
        let ys = detection.quad.map(|(_, y)| y);
        let (min_x, max_x) = min_max(&xs);
        let (min_y, max_y) = min_max(&ys);
        let width = max_x - min_x;
        let height = max_y - min_y;
        let mean_y = ys.iter().sum::<f32>() / ys.len() as f32;

        Self {
            text: detection.text.trim().to_string(),
            confidence: detection.confidence,
            x_center: xs.iter().sum::<f32>() / xs.len() as f32,
            y_center: page_height - mean_y,
            width,
            height,
            area: width * height,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_test(text: &str, y_center: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence: 1.0,
            x_center: 0.0,
            y_center,
            width,
            height,
            area: width * height,
        }
    }
}

fn min_max(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}
