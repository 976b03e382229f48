//! Batch processing command for multiple OCR text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use mobinv_core::{InvoiceProcessingResult, InvoiceProcessor};

use super::process::{format_result, OutputFormat};
use super::{is_supported_input, load_config, load_lexicon, read_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (.txt or OCR output .json)
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    result: Option<InvoiceProcessingResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl FileResult {
    fn status(&self) -> String {
        let Some(result) = &self.result else {
            return "read_error".to_string();
        };
        match result.error_kind() {
            None => "success".to_string(),
            Some(kind) => serde_json::to_value(kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "error".to_string()),
        }
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let lexicon = load_lexicon(&config)?;
    let processor = InvoiceProcessor::new(config, &lexicon);

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported_input(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = read_document(&path).map(|document| processor.process_document(&document));
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => results.push(FileResult {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if !args.continue_on_error {
                    error!("Failed to read {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
                warn!("Failed to read {}: {}", path.display(), error_msg);
                results.push(FileResult {
                    path,
                    result: None,
                    error: Some(error_msg),
                    processing_time_ms,
                });
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for file in &results {
            let Some(result) = &file.result else {
                continue;
            };
            let output_name = file.path.file_stem().and_then(|s| s.to_str()).unwrap_or("invoice");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_result(result, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

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

    let successful = results
        .iter()
        .filter(|r| r.result.as_ref().is_some_and(|r| r.is_success()))
        .count();
    let failed = results.len() - successful;

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed).red()
    );

    for file in results.iter().filter(|r| !r.result.as_ref().is_some_and(|r| r.is_success())) {
        let reason = match (&file.result, &file.error) {
            (Some(InvoiceProcessingResult::Error { message, .. }), _) => message.clone(),
            (_, Some(error)) => error.clone(),
            _ => "unknown error".to_string(),
        };
        println!("  - {}: {}", file.path.display(), reason);
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "vendor_name",
        "customer_name",
        "total_amount",
        "products",
        "imeis",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for file in results {
        let filename = file.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let status = file.status();
        let time = file.processing_time_ms.to_string();

        match &file.result {
            Some(InvoiceProcessingResult::Success {
                invoice,
                products,
                imeis,
            }) => {
                wtr.write_record([
                    filename,
                    &status,
                    invoice.invoice_number.as_deref().unwrap_or(""),
                    invoice.date.as_deref().unwrap_or(""),
                    invoice.vendor_name.as_deref().unwrap_or(""),
                    invoice.customer_name.as_deref().unwrap_or(""),
                    &invoice.total_amount.map(|a| a.to_string()).unwrap_or_default(),
                    &products.len().to_string(),
                    &imeis.join(";"),
                    &format!("{:.2}", invoice.confidence),
                    &time,
                    "",
                ])?;
            }
            other => {
                let error = match other {
                    Some(InvoiceProcessingResult::Error { message, .. }) => message.as_str(),
                    _ => file.error.as_deref().unwrap_or(""),
                };
                wtr.write_record([filename, &status, "", "", "", "", "", "", "", "", &time, error])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
