//! Poppler `pdftoppm` rasterizer and Tesseract OCR engine.
//!
//! Both shell out to the installed programs. Each call runs in its own
//! process, so one instance can be shared freely.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};

use super::{OcrDetection, OcrEngine, OcrPage, PageImage, RasterizedDocument, Rasterizer};

/// Configuration shared by the rasterizer and the OCR engine.
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`
    pub language: String,
    /// Rendering resolution in dots per inch
    pub dpi: u32,
    /// Tesseract page segmentation mode, if overriding the default
    pub page_segmentation_mode: Option<u8>,
    /// Path or name of the `pdftoppm` executable
    pub pdftoppm_program: PathBuf,
    /// Path or name of the `tesseract` executable
    pub tesseract_program: PathBuf,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 200,
            page_segmentation_mode: None,
            pdftoppm_program: PathBuf::from("pdftoppm"),
            tesseract_program: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the OCR language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Override the page segmentation mode.
    pub fn with_page_segmentation_mode(mut self, psm: u8) -> Self {
        self.page_segmentation_mode = Some(psm);
        self
    }

    /// Use a specific `pdftoppm` executable.
    pub fn with_pdftoppm(mut self, program: impl Into<PathBuf>) -> Self {
        self.pdftoppm_program = program.into();
        self
    }

    /// Use a specific `tesseract` executable.
    pub fn with_tesseract(mut self, program: impl Into<PathBuf>) -> Self {
        self.tesseract_program = program.into();
        self
    }
}

fn ensure_available(program: &Path, version_flag: &str) -> Result<()> {
    Command::new(program)
        .arg(version_flag)
        .output()
        .map(|_| ())
        .map_err(|_| Error::ToolMissing(program.display().to_string()))
}

/// Renders pages to PNG files with `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// Create a rasterizer, failing if `pdftoppm` cannot be started.
    pub fn new(config: &TesseractConfig) -> Result<Self> {
        ensure_available(&config.pdftoppm_program, "-v")?;
        Ok(Self {
            program: config.pdftoppm_program.clone(),
            dpi: config.dpi,
        })
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, path: &Path) -> Result<RasterizedDocument> {
        let scratch = tempfile::Builder::new()
            .prefix("pdfoutline_raster_")
            .tempdir()?;
        let prefix = scratch.path().join("page");

        let output = Command::new(&self.program)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(path)
            .arg(&prefix)
            .output()
            .map_err(|e| Error::Rasterize(format!("failed to run pdftoppm: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Rasterize(format!(
                "pdftoppm exited with {} for {}: {}",
                output.status,
                path.display(),
                stderr.trim()
            )));
        }

        let mut pages = Vec::new();
        for entry in fs::read_dir(scratch.path())? {
            let image_path = entry?.path();
            if let Some(page) = rendered_page_number(&image_path) {
                pages.push(PageImage {
                    page,
                    path: image_path,
                });
            }
        }
        pages.sort_by_key(|p| p.page);

        log::debug!("Rasterized {} pages of {}", pages.len(), path.display());
        Ok(RasterizedDocument::in_scratch_dir(pages, scratch))
    }
}

/// Page number from a `pdftoppm` output name such as `page-07.png`.
fn rendered_page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}

/// OCR engine backed by the `tesseract` command line.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
    language: String,
    psm: Option<u8>,
}

impl TesseractEngine {
    /// Create an engine, failing if `tesseract` cannot be started.
    pub fn new(config: &TesseractConfig) -> Result<Self> {
        ensure_available(&config.tesseract_program, "--version")?;
        Ok(Self {
            program: config.tesseract_program.clone(),
            language: config.language.clone(),
            psm: config.page_segmentation_mode,
        })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &PageImage) -> Result<OcrPage> {
        let mut command = Command::new(&self.program);
        command
            .arg(&image.path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);
        if let Some(psm) = self.psm {
            command.arg("--psm").arg(psm.to_string());
        }
        command.arg("tsv");

        let output = command
            .output()
            .map_err(|e| Error::Ocr(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract exited with {} on page {}: {}",
                output.status,
                image.page,
                stderr.trim()
            )));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// One row of Tesseract's TSV output. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct TsvRow {
    level: u32,
    block_num: u32,
    par_num: u32,
    line_num: u32,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    conf: f32,
    #[serde(default)]
    text: String,
}

/// Words of one text line accumulated from TSV rows.
#[derive(Debug)]
struct LineAccumulator {
    words: Vec<String>,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    confidence_sum: f32,
}

impl LineAccumulator {
    fn new(word: &str, row: &TsvRow) -> Self {
        let (left, top) = (row.left as f32, row.top as f32);
        Self {
            words: vec![word.to_string()],
            left,
            top,
            right: left + row.width as f32,
            bottom: top + row.height as f32,
            confidence_sum: row.conf,
        }
    }

    fn push(&mut self, word: &str, row: &TsvRow) {
        let (left, top) = (row.left as f32, row.top as f32);
        self.words.push(word.to_string());
        self.left = self.left.min(left);
        self.top = self.top.min(top);
        self.right = self.right.max(left + row.width as f32);
        self.bottom = self.bottom.max(top + row.height as f32);
        self.confidence_sum += row.conf;
    }

    fn into_detection(self) -> OcrDetection {
        let confidence = self.confidence_sum / self.words.len() as f32 / 100.0;
        OcrDetection::from_rect(
            self.words.join(" "),
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
            confidence.clamp(0.0, 1.0),
        )
    }
}

/// Parse Tesseract TSV output into line-level detections.
///
/// Word rows (level 5) are grouped by block, paragraph and line; each line
/// becomes one detection whose box is the union of its words and whose
/// confidence is the mean word confidence scaled to [0, 1].
pub fn parse_tsv(tsv: &str) -> Result<OcrPage> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(tsv.as_bytes());

    let mut page = OcrPage::default();
    let mut lines: Vec<LineAccumulator> = Vec::new();
    let mut line_index: HashMap<(u32, u32, u32), usize> = HashMap::new();

    for result in reader.deserialize::<TsvRow>() {
        let row = result.map_err(|e| Error::Ocr(format!("Failed to read TSV row: {}", e)))?;

        if row.level == 1 {
            page.width = row.width as f32;
            page.height = row.height as f32;
            continue;
        }
        let word = row.text.trim();
        if row.level != 5 || row.conf < 0.0 || word.is_empty() {
            continue;
        }

        let key = (row.block_num, row.par_num, row.line_num);
        match line_index.get(&key) {
            Some(&idx) => lines[idx].push(word, &row),
            None => {
                line_index.insert(key, lines.len());
                lines.push(LineAccumulator::new(word, &row));
            }
        }
    }

    page.detections = lines
        .into_iter()
        .map(LineAccumulator::into_detection)
        .collect();

    Ok(page)
}
