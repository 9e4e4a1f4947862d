//! pdfoutline CLI - PDF title and heading outline extraction

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::run_batch_with_progress;
use pdfoutline::pipeline::OcrBackend;
use pdfoutline::render::validate_record;
use pdfoutline::{
    inspect_file, to_json, BatchConfig, ExtractOptions, JsonFormat, LopdfLayout,
    OutlineExtractor, TesseractConfig,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Extract titles and heading outlines from PDF files", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Batch settings used when no subcommand is given
    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory (default)
    Batch(BatchArgs),

    /// Extract the outline of a single PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Show font statistics and heading sizes of a PDF
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory containing PDF files
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "PDFOUTLINE_INPUT_DIR",
        default_value = "sample_dataset/pdfs"
    )]
    input: PathBuf,

    /// Directory receiving the JSON files
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "PDFOUTLINE_OUTPUT_DIR",
        default_value = "sample_dataset/output"
    )]
    output: PathBuf,

    /// Name of the summary file holding the last record
    #[arg(long, value_name = "NAME", default_value = pdfoutline::batch::SUMMARY_FILE)]
    summary_file: String,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    #[command(flatten)]
    extract: ExtractArgs,
}

#[derive(Args)]
struct ExtractArgs {
    /// Disable the OCR fallback
    #[arg(long, env = "PDFOUTLINE_NO_OCR")]
    no_ocr: bool,

    /// Fail a document when any of its pages cannot be decoded
    #[arg(long, env = "PDFOUTLINE_STRICT")]
    strict: bool,

    /// Tesseract language code(s)
    #[arg(long, value_name = "LANG", env = "PDFOUTLINE_OCR_LANG")]
    lang: Option<String>,

    /// Rendering resolution for OCR
    #[arg(long, value_name = "DPI", env = "PDFOUTLINE_OCR_DPI")]
    dpi: Option<u32>,

    /// Per-document time budget in seconds
    #[arg(long, value_name = "SECS", env = "PDFOUTLINE_TIMEOUT")]
    timeout: Option<u64>,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new().with_ocr_fallback(!self.no_ocr);
        if let Some(secs) = self.timeout {
            options = options.with_deadline(Duration::from_secs(secs));
        }
        options
    }

    fn tesseract_config(&self) -> TesseractConfig {
        let mut config = TesseractConfig::new();
        if let Some(lang) = &self.lang {
            config = config.with_language(lang.clone());
        }
        if let Some(dpi) = self.dpi {
            config = config.with_dpi(dpi);
        }
        config
    }

    fn layout(&self) -> LopdfLayout {
        if self.strict {
            LopdfLayout::new().strict()
        } else {
            LopdfLayout::new()
        }
    }

    /// Build the extractor once; OCR engines are only started when enabled.
    fn build_extractor(&self) -> pdfoutline::Result<OutlineExtractor> {
        let mut extractor = OutlineExtractor::new(Box::new(self.layout()));
        if !self.no_ocr {
            extractor = extractor.with_ocr(OcrBackend::tesseract(&self.tesseract_config())?);
        }
        Ok(extractor.with_options(self.options()))
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch(args)) => cmd_batch(&args),
        Some(Commands::Extract {
            input,
            output,
            compact,
            extract,
        }) => cmd_extract(&input, output.as_deref(), compact, &extract),
        Some(Commands::Inspect { input }) => cmd_inspect(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(&cli.batch),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_batch(args: &BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Initializing extractor...");
    let extractor = match args.extract.build_extractor() {
        Ok(extractor) => extractor,
        Err(e) => {
            log::error!("Failed to initialize extractor: {}", e);
            eprintln!(
                "{} {}",
                "Hint:".yellow(),
                "install poppler-utils and tesseract, or pass --no-ocr"
            );
            return Ok(());
        }
    };

    let config = BatchConfig::new(&args.input, &args.output)
        .with_summary_file(args.summary_file.clone())
        .with_format(json_format(args.compact));

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = run_batch_with_progress(&extractor, &config, |done, total, report| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
        let name = report
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name);
    })?;
    pb.finish_and_clear();

    if summary.count() == 0 {
        println!("{}", "No documents processed.".yellow());
        return Ok(());
    }

    println!("\n{}", "Processing complete".green().bold());
    println!("{}", "─".repeat(40).dimmed());
    for report in &summary.documents {
        let name = report
            .output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!(
            "  {} {} {}",
            "├─".dimmed(),
            name,
            format!(
                "({} headings, {:.2}s)",
                report.record.outline.len(),
                report.elapsed.as_secs_f64()
            )
            .dimmed()
        );
    }
    println!("{}: {}", "Files".bold(), summary.count());
    println!(
        "{}: {:.2}s",
        "Total time".bold(),
        summary.total_time.as_secs_f64()
    );
    println!(
        "{}: {:.2}s",
        "Average".bold(),
        summary.average_time().as_secs_f64()
    );
    if let Some(path) = &summary.summary_path {
        println!("{}: {}", "Summary".bold(), path.display());
    }

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    args: &ExtractArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = args.build_extractor()?;
    let record = validate_record(&extractor.extract(input));
    let json = to_json(&record, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let version = pdfoutline::check_pdf_header(input)?;
    let analysis = inspect_file(input)?;

    println!("{}", "Document Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), version);
    println!("{}: {}", "Pages".bold(), analysis.page_count);
    println!("{}: {}", "Title".bold(), analysis.title);

    println!();
    println!("{}", "Font Sizes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let body = analysis.classification.body_size;
    for (size, bucket) in analysis.statistics.iter() {
        let role = match analysis.classification.levels.level_for(size) {
            Some(level) => level.to_string().green().bold(),
            None if Some(size) == body => "body".normal(),
            None => "".normal(),
        };
        let sample = bucket.sample_contexts.first().map(String::as_str).unwrap_or("");
        println!(
            "{:>6} pt  {:>6} words  {:>4} blocks  {:<4} {}",
            size.to_string(),
            bucket.word_count,
            bucket.page_occurrences.len(),
            role,
            sample.dimmed()
        );
    }

    if analysis.classification.levels.is_empty() {
        println!("\n{}", "No heading sizes found.".yellow());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and heading outline extraction");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_mode_takes_batch_flags() {
        let cli = Cli::try_parse_from([
            "pdfoutline",
            "-i",
            "scans",
            "-o",
            "json",
            "--no-ocr",
            "--strict",
            "--timeout",
            "30",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.batch.input, PathBuf::from("scans"));
        assert_eq!(cli.batch.output, PathBuf::from("json"));
        assert!(cli.batch.extract.no_ocr);
        assert!(cli.batch.extract.strict);
        assert_eq!(
            cli.batch.extract.options().deadline,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_default_mode_reads_environment() {
        std::env::set_var("PDFOUTLINE_OCR_DPI", "300");
        let cli = Cli::try_parse_from(["pdfoutline"]);
        std::env::remove_var("PDFOUTLINE_OCR_DPI");

        let cli = cli.unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.batch.extract.dpi, Some(300));
        assert_eq!(cli.batch.extract.tesseract_config().dpi, 300);
    }

    #[test]
    fn test_subcommand_rejects_parent_flags() {
        assert!(Cli::try_parse_from(["pdfoutline", "--compact", "inspect", "a.pdf"]).is_err());

        let cli = Cli::try_parse_from(["pdfoutline", "batch", "--compact"]).unwrap();
        match cli.command {
            Some(Commands::Batch(args)) => assert!(args.compact),
            _ => panic!("expected batch subcommand"),
        }
    }
}
