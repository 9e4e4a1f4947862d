//! Integration tests for directory batch processing.

use std::fs;
use std::path::Path;

use serde_json::Value;

use pdfoutline::batch::{run_batch, run_batch_with_progress, BatchConfig};
use pdfoutline::error::{Error, Result};
use pdfoutline::model::{LayoutBlock, LayoutPage};
use pdfoutline::parser::LayoutSource;
use pdfoutline::pipeline::OutlineExtractor;
use pdfoutline::render::JsonFormat;

/// Layout source deciding from the file name: names containing "bad" fail,
/// names containing "panic" panic, everything else gets one heading.
struct NamedLayout;

impl LayoutSource for NamedLayout {
    fn extract_pages(&self, path: &Path) -> Result<Vec<LayoutPage>> {
        let name = path.file_stem().unwrap().to_string_lossy().to_string();
        if name.contains("bad") {
            return Err(Error::PdfParse("corrupt xref".to_string()));
        }
        if name.contains("panic") {
            panic!("layout engine bug");
        }
        let body = "readings were taken twice a day at every station in the network during the season";
        Ok(vec![LayoutPage::new(
            1,
            vec![
                LayoutBlock::uniform(format!("Report {}", name), 760.0, 20.0, "Helvetica-Bold"),
                LayoutBlock::uniform(body, 700.0, 12.0, "Helvetica"),
                LayoutBlock::uniform("1. Background", 660.0, 14.0, "Helvetica-Bold"),
                LayoutBlock::uniform(body, 620.0, 12.0, "Helvetica"),
            ],
        )])
    }
}

fn setup(names: &[&str]) -> (tempfile::TempDir, BatchConfig) {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("pdfs");
    fs::create_dir(&input).unwrap();
    for name in names {
        fs::write(input.join(name), b"%PDF-1.4\n").unwrap();
    }
    let config = BatchConfig::new(&input, root.path().join("output"));
    (root, config)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_batch_writes_one_file_per_pdf_and_summary() {
    let (_root, config) = setup(&["beta.pdf", "alpha.PDF", "readme.txt"]);
    let extractor = OutlineExtractor::new(Box::new(NamedLayout));

    let summary = run_batch(&extractor, &config).unwrap();
    assert_eq!(summary.count(), 2);

    let processed: Vec<String> = summary
        .documents
        .iter()
        .map(|d| d.input.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(processed, vec!["alpha.PDF", "beta.pdf"]);

    let alpha = read_json(&config.output_dir.join("alpha.json"));
    assert_eq!(alpha["title"], "Report alpha");
    assert_eq!(alpha["outline"][0]["text"], "1. Background");
    assert_eq!(alpha["outline"][0]["page"], 1);

    let summary_file = read_json(&config.output_dir.join("output.json"));
    assert_eq!(summary_file["title"], "Report beta");
    assert!(!config.output_dir.join("readme.json").exists());
}

#[test]
fn test_failed_document_gets_file_name_title() {
    let (_root, config) = setup(&["bad-scan.pdf"]);
    let extractor = OutlineExtractor::new(Box::new(NamedLayout));

    run_batch(&extractor, &config).unwrap();
    let value = read_json(&config.output_dir.join("bad-scan.json"));
    assert_eq!(value["title"], "bad-scan");
    assert_eq!(value["outline"], Value::Array(vec![]));
}

#[test]
fn test_panicking_document_gets_empty_schema() {
    let (_root, config) = setup(&["a-panic.pdf", "b-fine.pdf"]);
    let extractor = OutlineExtractor::new(Box::new(NamedLayout));

    let summary = run_batch(&extractor, &config).unwrap();
    assert_eq!(summary.count(), 2);

    let raw = fs::read_to_string(config.output_dir.join("a-panic.json")).unwrap();
    assert_eq!(read_json(&config.output_dir.join("a-panic.json")), serde_json::json!({"title": "", "outline": []}));
    assert!(raw.contains("\n  \"outline\""));
    assert_eq!(
        read_json(&config.output_dir.join("b-fine.json"))["title"],
        "Report b-fine"
    );
}

#[test]
fn test_empty_input_dir() {
    let (_root, config) = setup(&[]);
    let extractor = OutlineExtractor::new(Box::new(NamedLayout));

    let summary = run_batch(&extractor, &config).unwrap();
    assert_eq!(summary.count(), 0);
    assert!(summary.summary_path.is_none());
    assert!(config.output_dir.is_dir());
}

#[test]
fn test_progress_and_compact_output() {
    let (_root, config) = setup(&["one.pdf", "two.pdf", "three.pdf"]);
    let config = config
        .with_format(JsonFormat::Compact)
        .with_summary_file("last.json");
    let extractor = OutlineExtractor::new(Box::new(NamedLayout));

    let mut seen = Vec::new();
    let summary = run_batch_with_progress(&extractor, &config, |done, total, report| {
        seen.push((done, total, report.record.title.clone()));
    })
    .unwrap();

    assert_eq!(
        seen,
        vec![
            (1, 3, "Report one".to_string()),
            (2, 3, "Report three".to_string()),
            (3, 3, "Report two".to_string()),
        ]
    );
    assert_eq!(summary.summary_path, Some(config.output_dir.join("last.json")));
    let raw = fs::read_to_string(config.output_dir.join("last.json")).unwrap();
    assert!(!raw.contains('\n'));
}
