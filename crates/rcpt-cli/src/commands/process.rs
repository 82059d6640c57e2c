//! Process command - extract data from a single receipt.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rcpt_core::models::config::{ItemStrategy, RcptConfig};
use rcpt_core::models::receipt::{Outcome, ReceiptRecord};
use rcpt_core::ocr::{OcrBackend, PureOcrBackend};
use rcpt_core::receipt::{ExtractionResult, ReceiptProcessor};
use rcpt_core::{OpenAiItemModel, RcptError};

use super::config::load_config;

/// Image formats sent through OCR.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "tiff", "tif", "bmp", "webp"];

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image or OCR text), or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Treat the input as OCR text regardless of its extension
    #[arg(long)]
    text: bool,

    /// Extract line items with the AI model instead of the rules
    #[arg(long)]
    ai: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// API key for the AI model endpoint
    #[arg(long, env = "RCPT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Report whether items, tax, tip and discount add up to the total
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Where receipt text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Text(PathBuf),
    Image(PathBuf),
}

impl Input {
    /// Classify an input path by extension. `-` is stdin.
    pub fn detect(path: &Path, force_text: bool) -> anyhow::Result<Self> {
        if path == Path::new("-") {
            return Ok(Input::Stdin);
        }

        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        if force_text {
            return Ok(Input::Text(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" => Ok(Input::Text(path.to_path_buf())),
            ext if IMAGE_EXTENSIONS.contains(&ext) => Ok(Input::Image(path.to_path_buf())),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }
    if args.api_key.is_some() {
        config.ai.api_key = args.api_key.clone();
    }

    let input = Input::detect(&args.input, args.text)?;
    info!("Processing input: {:?}", input);

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Extracting receipt data...");
    pb.set_position(30);

    let result = extract(&input, args.ai, &config).await;

    pb.finish_and_clear();

    if args.validate {
        if let Ok(result) = &result {
            report_validation(result);
        }
    }

    let outcome = Outcome::from(result.map(|r| r.record));
    let output = format_outcome(&outcome, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if outcome.is_error() {
        std::process::exit(1);
    }

    Ok(())
}

/// Read receipt text from `input` and run the pipeline on it.
///
/// Items come from the AI model when `use_ai` is set or the configured item
/// strategy is `model`.
pub async fn extract(
    input: &Input,
    use_ai: bool,
    config: &RcptConfig,
) -> Result<ExtractionResult, RcptError> {
    let text = match input {
        Input::Stdin => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
        Input::Text(path) => fs::read_to_string(path)?,
        Input::Image(path) => run_ocr(path, config)?,
    };

    let processor = ReceiptProcessor::from_config(config.extraction.clone());

    if use_ai || config.extraction.item_strategy == ItemStrategy::Model {
        let model = OpenAiItemModel::new(&config.ai)?;
        processor.process_with_model(&text, &model).await
    } else {
        processor.process_text(&text)
    }
}

fn run_ocr(path: &Path, config: &RcptConfig) -> Result<String, RcptError> {
    let image = image::open(path)?;
    let backend = PureOcrBackend::from_config(&config.ocr)?;
    let text = backend.recognize(&image)?;
    debug!("OCR produced {} lines", text.lines().count());
    Ok(text)
}

fn report_validation(result: &ExtractionResult) {
    if result.total_matches {
        eprintln!("{} Items add up to the total", style("✓").green());
    } else {
        eprintln!("{}", style("Validation issues:").yellow());
    }
    for warning in &result.warnings {
        eprintln!("  - {}", warning);
    }
}

/// Render an outcome. Errors are always the JSON error object.
pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> anyhow::Result<String> {
    match (outcome, format) {
        (Outcome::Record(record), OutputFormat::Csv) => format_csv(record),
        (Outcome::Record(record), OutputFormat::Text) => Ok(format_text(record)),
        _ => Ok(serde_json::to_string(outcome)?),
    }
}

fn format_csv(record: &ReceiptRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "store",
        "date",
        "item_count",
        "items_sum",
        "tax",
        "tip",
        "discount",
        "total",
        "currency",
    ])?;

    wtr.write_record([
        &record.store,
        &record.date,
        &record.items.len().to_string(),
        &record.items_sum().to_string(),
        &record.tax.to_string(),
        &record.tip.to_string(),
        &record.discount.to_string(),
        &record.total.to_string(),
        &record.currency,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ReceiptRecord) -> String {
    let currency = &record.currency;
    let mut output = String::new();

    output.push_str(&format!("Store: {}\n", record.store));
    if !record.date.is_empty() {
        output.push_str(&format!("Date: {}\n", record.date));
    }
    output.push('\n');

    output.push_str("Items:\n");
    for item in &record.items {
        output.push_str(&format!("  {:<30} {}{}\n", item.name, currency, item.price));
    }
    output.push('\n');

    output.push_str(&format!("  Tax:      {}{}\n", currency, record.tax));
    if !record.tip.is_zero() {
        output.push_str(&format!("  Tip:      {}{}\n", currency, record.tip));
    }
    if !record.discount.is_zero() {
        output.push_str(&format!("  Discount: {}{}\n", currency, record.discount));
    }
    output.push_str(&format!("  Total:    {}{}\n", currency, record.total));

    output
}
