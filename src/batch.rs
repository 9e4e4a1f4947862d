//! Directory batch processing.
//!
//! Every `.pdf` file in the input directory is processed in name order and
//! written to `<stem>.json` in the output directory. The last record is
//! written again to a summary file.

use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::detect::has_pdf_extension;
use crate::error::Result;
use crate::model::DocumentRecord;
use crate::pipeline::OutlineExtractor;
use crate::render::{validate_record, write_json, JsonFormat};

/// Default summary file name.
pub const SUMMARY_FILE: &str = "output.json";

/// Batch run configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for PDF files
    pub input_dir: PathBuf,
    /// Directory receiving one JSON file per input
    pub output_dir: PathBuf,
    /// Name of the file holding a copy of the last record
    pub summary_file: String,
    /// JSON output format
    pub format: JsonFormat,
}

impl BatchConfig {
    /// Create a configuration for the given directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            summary_file: SUMMARY_FILE.to_string(),
            format: JsonFormat::Pretty,
        }
    }

    /// Set the summary file name.
    pub fn with_summary_file(mut self, name: impl Into<String>) -> Self {
        self.summary_file = name.into();
        self
    }

    /// Set the JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new("sample_dataset/pdfs", "sample_dataset/output")
    }
}

/// Outcome of processing one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Input file
    pub input: PathBuf,
    /// JSON file written
    pub output: PathBuf,
    /// The record written to disk
    pub record: DocumentRecord,
    /// Wall-clock processing time
    pub elapsed: Duration,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// One report per processed document, in processing order
    pub documents: Vec<DocumentReport>,
    /// Wall-clock time for the whole batch
    pub total_time: Duration,
    /// Summary file, if one was written
    pub summary_path: Option<PathBuf>,
}

impl BatchSummary {
    /// Number of processed documents.
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Mean time per document.
    pub fn average_time(&self) -> Duration {
        match u32::try_from(self.documents.len()) {
            Ok(n) if n > 0 => self.total_time / n,
            _ => Duration::ZERO,
        }
    }
}

/// PDF files in a directory, sorted by file name. Not recursive.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// JSON output path for an input file.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output_dir.join(format!("{}.json", stem))
}

/// Extract, validate and write one document.
///
/// Never fails: if extraction panics or the record cannot be written, the
/// empty record is written in its place.
pub fn process_document(
    extractor: &OutlineExtractor,
    input: &Path,
    output: &Path,
    format: JsonFormat,
) -> DocumentReport {
    let started = Instant::now();
    log::info!("Processing {}", input.display());

    let extracted = catch_unwind(AssertUnwindSafe(|| extractor.extract(input)));
    let record = match extracted {
        Ok(record) => validate_record(&record),
        Err(_) => {
            log::error!("Extraction panicked for {}", input.display());
            DocumentRecord::empty()
        }
    };

    let record = match write_json(output, &record, format) {
        Ok(()) => record,
        Err(e) => {
            log::error!("Error writing {}: {}", output.display(), e);
            let empty = DocumentRecord::empty();
            if let Err(e) = write_json(output, &empty, format) {
                log::error!("Could not write empty record to {}: {}", output.display(), e);
            }
            empty
        }
    };

    let elapsed = started.elapsed();
    log::info!(
        "Processed {} in {:.2}s: title '{}', {} outline items",
        input.display(),
        elapsed.as_secs_f64(),
        record.title,
        record.outline.len()
    );

    DocumentReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        record,
        elapsed,
    }
}

/// Process every PDF in the input directory.
pub fn run_batch(extractor: &OutlineExtractor, config: &BatchConfig) -> Result<BatchSummary> {
    run_batch_with_progress(extractor, config, |_, _, _| {})
}

/// Like [`run_batch`], calling `on_document(done, total, report)` after each document.
pub fn run_batch_with_progress<F>(
    extractor: &OutlineExtractor,
    config: &BatchConfig,
    mut on_document: F,
) -> Result<BatchSummary>
where
    F: FnMut(usize, usize, &DocumentReport),
{
    fs::create_dir_all(&config.output_dir)?;

    if !config.input_dir.is_dir() {
        log::error!("Input directory not found: {}", config.input_dir.display());
        return Ok(BatchSummary::default());
    }

    let files = discover_pdfs(&config.input_dir)?;
    if files.is_empty() {
        log::warn!("No PDF files found in {}", config.input_dir.display());
        return Ok(BatchSummary::default());
    }
    log::info!("Found {} PDF files to process", files.len());

    let started = Instant::now();
    let mut summary = BatchSummary::default();

    for input in &files {
        let output = output_path_for(input, &config.output_dir);
        let report = process_document(extractor, input, &output, config.format);
        let done = summary.count() + 1;
        log::info!("Progress: {}/{} files processed", done, files.len());
        on_document(done, files.len(), &report);
        summary.documents.push(report);
    }

    if let Some(last) = summary.documents.last() {
        let path = config.output_dir.join(&config.summary_file);
        match write_json(&path, &last.record, config.format) {
            Ok(()) => {
                log::info!("Summary output saved to {}", path.display());
                summary.summary_path = Some(path);
            }
            Err(e) => log::error!("Could not write summary {}: {}", path.display(), e),
        }
    }

    summary.total_time = started.elapsed();
    log::info!(
        "Processed {} files in {:.2}s ({:.2}s per file)",
        summary.count(),
        summary.total_time.as_secs_f64(),
        summary.average_time().as_secs_f64()
    );

    Ok(summary)
}
