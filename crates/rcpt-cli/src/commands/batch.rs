//! Batch processing command for multiple receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use rcpt_core::models::receipt::{Outcome, ReceiptRecord};

use super::config::load_config;
use super::process::{extract, Input, IMAGE_EXTENSIONS};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (images and .txt OCR dumps)
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file JSON results (default: stdout, one per line)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Extract line items with the AI model instead of the rules
    #[arg(long)]
    ai: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Outcome,
    total_matches: bool,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            ext == "txt" || IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Each file is independent; nothing carries over between them.
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let input = Input::detect(&path, false)?;
        let result = extract(&input, args.ai, &config).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        let total_matches = result.as_ref().is_ok_and(|r| r.total_matches);

        if let Err(e) = &result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", path.display(), e);
            } else {
                error!("Failed to process {}: {}", path.display(), e);
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        }

        let outcome = Outcome::from(result.map(|r| r.record));
        write_outcome(&path, &outcome, args.output_dir.as_deref())?;

        results.push(FileResult {
            path,
            outcome,
            total_matches,
            processing_time_ms,
        });

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_error()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            if let Outcome::Error(err) = &result.outcome {
                eprintln!("  - {}: {}", result.path.display(), err.error);
            }
        }
    }

    Ok(())
}

fn write_outcome(path: &Path, outcome: &Outcome, output_dir: Option<&Path>) -> anyhow::Result<()> {
    let content = serde_json::to_string(outcome)?;

    match output_dir {
        Some(dir) => {
            let output_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("receipt");
            let output_path = dir.join(format!("{}.json", output_name));
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "store",
        "date",
        "item_count",
        "total",
        "currency",
        "total_matches",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcome {
            Outcome::Record(record) => {
                wtr.write_record(summary_row(filename, record, result))?;
            }
            Outcome::Error(err) => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    result.processing_time_ms.to_string().as_str(),
                    err.error.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn summary_row(filename: &str, record: &ReceiptRecord, result: &FileResult) -> [String; 10] {
    [
        filename.to_string(),
        "success".to_string(),
        record.store.clone(),
        record.date.clone(),
        record.items.len().to_string(),
        record.total.to_string(),
        record.currency.clone(),
        result.total_matches.to_string(),
        result.processing_time_ms.to_string(),
        String::new(),
    ]
}
