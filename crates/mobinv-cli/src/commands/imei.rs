//! IMEI command - rank IMEI candidates found in OCR text.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use mobinv_core::{format_imei, ImeiCandidate, ImeiDetector, ImeiFieldSuggestion, NormalizedText};

use super::{load_config, read_document};

/// Arguments for the imei command.
#[derive(Args)]
pub struct ImeiArgs {
    /// Input file (OCR text, or OCR output JSON)
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Inline OCR text instead of a file
    #[arg(short, long)]
    text: Option<String>,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show scoring signals per candidate
    #[arg(long)]
    signals: bool,
}

#[derive(Serialize)]
struct ImeiReport<'a> {
    candidates: &'a [ImeiCandidate],
    suggestion: ImeiFieldSuggestion,
    field_count: usize,
}

pub fn run(args: ImeiArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let threshold = config.detection.suggestion_threshold;
    let detector = ImeiDetector::new(config.detection);

    let raw = match (&args.text, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_document(path)?.reading_text().into_owned(),
        (None, None) => anyhow::bail!("Provide an input file or --text"),
    };

    let text = NormalizedText::new(&raw);
    let candidates = detector.detect_normalized(&text);
    let high_confidence = candidates.iter().filter(|c| c.is_confident(threshold)).count();
    let suggestion = ImeiFieldSuggestion::from_count(high_confidence);

    if args.json {
        let report = ImeiReport {
            candidates: &candidates,
            suggestion,
            field_count: suggestion.field_count(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("{} No IMEI candidates found", style("ℹ").blue());
    }

    for (rank, candidate) in candidates.iter().enumerate() {
        let checksum = if candidate.is_checksum_valid() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        let confidence = format!("{:.2}", candidate.confidence);
        let confidence = if candidate.is_confident(threshold) {
            style(confidence).green()
        } else {
            style(confidence).yellow()
        };

        println!(
            "{:>2}. {}  {}  confidence {}",
            rank + 1,
            format_imei(&candidate.clean_digits),
            checksum,
            confidence
        );
        if args.signals && !candidate.signals.is_empty() {
            println!("      {}", style(candidate.signals.join(", ")).dim());
        }
    }

    println!();
    println!(
        "Suggested IMEI fields: {:?} ({})",
        suggestion,
        suggestion.field_count()
    );

    Ok(())
}
