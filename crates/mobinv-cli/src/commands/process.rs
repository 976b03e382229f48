//! Process command - extract data from a single OCR text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use mobinv_core::invoice::rules::format_amount;
use mobinv_core::{InvoiceProcessingResult, InvoiceProcessor};

use super::{load_config, load_lexicon, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR text, or OCR output JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print validation warnings (missing fields, total mismatch)
    #[arg(long)]
    warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per product
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let lexicon = load_lexicon(&config)?;
    let processor = InvoiceProcessor::new(config, &lexicon);

    info!("Processing file: {}", args.input.display());
    let document = read_document(&args.input)?;
    let result = processor.process_document(&document);

    if args.warnings {
        let warnings = result.warnings();
        if !warnings.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for warning in &warnings {
                eprintln!("  - {}", warning);
            }
        }
    }

    let output = format_result(&result, args.format)?;

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

    if let InvoiceProcessingResult::Error { message, kind } = &result {
        anyhow::bail!("{} ({})", message, kind);
    }

    Ok(())
}

pub fn format_result(result: &InvoiceProcessingResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &InvoiceProcessingResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let (invoice, products, imeis) = match result {
        InvoiceProcessingResult::Success {
            invoice,
            products,
            imeis,
        } => (invoice, products, imeis),
        InvoiceProcessingResult::Error { message, kind } => {
            wtr.write_record(["status", "kind", "message"])?;
            wtr.write_record(["error", &kind.to_string(), message])?;
            return Ok(String::from_utf8(wtr.into_inner()?)?);
        }
    };

    wtr.write_record([
        "invoice_number",
        "date",
        "vendor_name",
        "customer_name",
        "total_amount",
        "brand",
        "model",
        "variant",
        "quantity",
        "unit",
        "rate",
        "amount",
        "imeis",
    ])?;

    let header = [
        invoice.invoice_number.clone().unwrap_or_default(),
        invoice.date.clone().unwrap_or_default(),
        invoice.vendor_name.clone().unwrap_or_default(),
        invoice.customer_name.clone().unwrap_or_default(),
        invoice.total_amount.map(|a| a.to_string()).unwrap_or_default(),
    ];
    let imeis = imeis.join(";");

    if products.is_empty() {
        let mut record: Vec<String> = header.to_vec();
        record.extend(std::iter::repeat_n(String::new(), 7));
        record.push(imeis.clone());
        wtr.write_record(&record)?;
    }

    for product in products {
        let mut record: Vec<String> = header.to_vec();
        record.extend([
            product.brand.clone().unwrap_or_default(),
            product.model.clone().unwrap_or_default(),
            product.variant.clone().unwrap_or_default(),
            product.quantity.map(|q| q.to_string()).unwrap_or_default(),
            product.unit.clone().unwrap_or_default(),
            product.rate.map(|r| r.to_string()).unwrap_or_default(),
            product.amount.map(|a| a.to_string()).unwrap_or_default(),
            imeis.clone(),
        ]);
        wtr.write_record(&record)?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub fn format_text(result: &InvoiceProcessingResult) -> String {
    let (invoice, products, imeis) = match result {
        InvoiceProcessingResult::Success {
            invoice,
            products,
            imeis,
        } => (invoice, products, imeis),
        InvoiceProcessingResult::Error { message, kind } => {
            return format!("Error ({}): {}\n", kind, message);
        }
    };

    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", field(&invoice.invoice_number)));
    output.push_str(&format!("Date: {}\n", field(&invoice.date)));
    output.push_str(&format!("Vendor: {}\n", field(&invoice.vendor_name)));
    if let Some(gstin) = &invoice.vendor_gstin {
        output.push_str(&format!("  GSTIN: {}\n", gstin));
    }
    output.push_str(&format!("Customer: {}\n", field(&invoice.customer_name)));
    if let Some(phone) = &invoice.customer_phone {
        output.push_str(&format!("  Phone: {}\n", phone));
    }
    output.push('\n');

    output.push_str("Products:\n");
    for product in products {
        let name = product.display_name();
        output.push_str(&format!(
            "  {}{}\n",
            if name.is_empty() { "?" } else { name.as_str() },
            product.variant.as_deref().map(|v| format!(" ({})", v)).unwrap_or_default()
        ));
        if let Some(amount) = product.amount {
            output.push_str(&format!(
                "    qty {}  rate {}  amount {}\n",
                product.quantity.map(|q| q.to_string()).unwrap_or_else(|| "-".to_string()),
                product.rate.map(format_amount).unwrap_or_else(|| "-".to_string()),
                format_amount(amount)
            ));
        }
    }
    output.push('\n');

    if !imeis.is_empty() {
        output.push_str("IMEIs:\n");
        for imei in imeis {
            output.push_str(&format!("  {}\n", imei));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Total: {}\n",
        invoice.total_amount.map(format_amount).unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!("Confidence: {:.0}%\n", invoice.confidence * 100.0));

    output
}
