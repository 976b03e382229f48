//! Whole-invoice processing: header fields, product rows and IMEIs in one
//! pass over the same normalized text.

use std::time::Instant;

use tracing::{debug, info};

use super::extractor::InvoiceFieldExtractor;
use super::InvoiceExtractor;
use crate::error::ProcessingErrorKind;
use crate::imei::ImeiDetector;
use crate::models::config::MobinvConfig;
use crate::models::invoice::InvoiceProcessingResult;
use crate::models::lexicon::BrandLexicon;
use crate::ocr::OcrDocument;
use crate::text::NormalizedText;

/// Top-level invoice processor.
///
/// Holds no per-invoice state; one instance can process any number of
/// invoices, from any number of threads.
pub struct InvoiceProcessor<'a> {
    config: MobinvConfig,
    extractor: InvoiceFieldExtractor<'a>,
    detector: ImeiDetector,
}

impl<'a> InvoiceProcessor<'a> {
    pub fn new(config: MobinvConfig, lexicon: &'a BrandLexicon) -> Self {
        Self {
            extractor: InvoiceFieldExtractor::new(lexicon).with_config(config.extraction.clone()),
            detector: ImeiDetector::new(config.detection.clone()),
            config,
        }
    }

    pub fn config(&self) -> &MobinvConfig {
        &self.config
    }

    /// Process raw OCR text into exactly one result variant.
    pub fn process_invoice(&self, text: &str) -> InvoiceProcessingResult {
        let start = Instant::now();
        let text = NormalizedText::new(text);

        let length = text.as_str().chars().count();
        if length < self.config.processing.min_text_length {
            debug!("Rejecting input: {} characters", length);
            return InvoiceProcessingResult::error(
                ProcessingErrorKind::InsufficientText,
                format!(
                    "OCR text has {} characters, at least {} required",
                    length, self.config.processing.min_text_length
                ),
            );
        }

        let invoice = self.extractor.extract_invoice_fields(text.as_str());
        let products = self.extractor.extract_product_lines(text.as_str());

        if invoice.matched_field_count() == 0 && products.is_empty() {
            debug!("No header fields or product lines recognized");
            return InvoiceProcessingResult::error(
                ProcessingErrorKind::UnrecognizedFormat,
                "No invoice fields or product lines recognized",
            );
        }

        // Detection output is unique by digits; order by first appearance.
        let mut accepted: Vec<_> = self
            .detector
            .detect_normalized(&text)
            .into_iter()
            .filter(|c| c.is_confident(self.config.processing.imei_threshold))
            .collect();
        accepted.sort_by_key(|c| c.start);
        let imeis: Vec<String> = accepted.into_iter().map(|c| c.clean_digits).collect();

        info!(
            "Processed invoice: {} header fields, {} products, {} IMEIs in {:?}",
            invoice.matched_field_count(),
            products.len(),
            imeis.len(),
            start.elapsed()
        );

        InvoiceProcessingResult::Success {
            invoice,
            products,
            imeis,
        }
    }

    /// Process OCR engine output. Boxes only contribute through the
    /// reading-order text.
    pub fn process_document(&self, document: &OcrDocument) -> InvoiceProcessingResult {
        self.process_invoice(&document.reading_text())
    }
}

/// Process raw OCR text with default settings and the embedded lexicon.
pub fn process_invoice(text: &str) -> InvoiceProcessingResult {
    InvoiceProcessor::new(MobinvConfig::default(), BrandLexicon::embedded()).process_invoice(text)
}
