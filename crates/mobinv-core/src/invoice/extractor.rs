//! Header and product-line extraction over normalized OCR text.

use tracing::debug;

use super::rules::{
    dates::extract_invoice_date,
    amounts::extract_total,
    gstin::extract_gstin,
    parties::{extract_customer_name, extract_customer_phone, extract_vendor_name},
    patterns::INVOICE_NUMBER,
    products::ProductLineParser,
};
use super::InvoiceExtractor;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{InvoiceData, ProductItem};
use crate::models::lexicon::BrandLexicon;
use crate::text::NormalizedText;

/// Rule-based field extractor backed by a shared brand lexicon.
pub struct InvoiceFieldExtractor<'a> {
    lexicon: &'a BrandLexicon,
    config: ExtractionConfig,
}

impl<'a> InvoiceFieldExtractor<'a> {
    /// Create an extractor with default settings.
    pub fn new(lexicon: &'a BrandLexicon) -> Self {
        Self {
            lexicon,
            config: ExtractionConfig::default(),
        }
    }

    /// Set extraction settings.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// First labelled invoice number that contains a digit.
    fn extract_invoice_number(&self, text: &str) -> Option<String> {
        INVOICE_NUMBER
            .captures_iter(text)
            .map(|caps| caps[1].trim_end_matches(['-', '/', '.']).to_string())
            .find(|number| number.chars().any(|c| c.is_ascii_digit()))
    }
}

impl InvoiceExtractor for InvoiceFieldExtractor<'_> {
    fn extract_invoice_fields(&self, text: &str) -> InvoiceData {
        let mut invoice = InvoiceData {
            invoice_number: self.extract_invoice_number(text),
            vendor_name: extract_vendor_name(text),
            vendor_gstin: extract_gstin(text),
            customer_name: extract_customer_name(text),
            customer_phone: extract_customer_phone(text),
            total_amount: extract_total(text).map(|m| m.value),
            ..Default::default()
        };

        if let Some(date) = extract_invoice_date(text) {
            invoice.date = Some(date.raw);
            invoice.parsed_date = date.parsed;
        }

        invoice.update_confidence();
        debug!(
            "Extracted {} header fields (confidence {:.2})",
            invoice.matched_field_count(),
            invoice.confidence
        );
        invoice
    }

    fn extract_product_lines(&self, text: &str) -> Vec<ProductItem> {
        ProductLineParser::new(self.lexicon)
            .with_limits(self.config.max_model_tokens, self.config.max_quantity)
            .parse_lines(text)
    }
}

/// Extract header fields from raw OCR text using the embedded lexicon.
pub fn extract_invoice_fields(text: &str) -> InvoiceData {
    let text = NormalizedText::new(text);
    InvoiceFieldExtractor::new(BrandLexicon::embedded()).extract_invoice_fields(text.as_str())
}

/// Extract product rows from raw OCR text using the embedded lexicon.
pub fn extract_product_lines(text: &str) -> Vec<ProductItem> {
    let text = NormalizedText::new(text);
    InvoiceFieldExtractor::new(BrandLexicon::embedded()).extract_product_lines(text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SHOP_INVOICE: &str = "\
Sri Balaji Mobiles
GSTIN: 29AAGCB7383J1Z4
TAX INVOICE
Invoice No: RM/24-25/0153
Date: 15-Jan-2025
Bill To: Rahul Sharma
Ph: 98765 43210
Redmi Note 14 5g Crimson Art 8gb 256gb   1.00 PCS  17,759.00  15,050.00
IMEI1: 490154203237518
Grand Total 15,050.00";

    #[test]
    fn test_extract_invoice_fields() {
        let invoice = extract_invoice_fields(SHOP_INVOICE);

        assert_eq!(invoice.invoice_number.as_deref(), Some("RM/24-25/0153"));
        assert_eq!(invoice.date.as_deref(), Some("15-Jan-2025"));
        assert_eq!(invoice.parsed_date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(invoice.vendor_name.as_deref(), Some("Sri Balaji Mobiles"));
        assert_eq!(invoice.vendor_gstin.as_deref(), Some("29AAGCB7383J1Z4"));
        assert_eq!(invoice.customer_name.as_deref(), Some("Rahul Sharma"));
        assert_eq!(invoice.customer_phone.as_deref(), Some("9876543210"));
        assert_eq!(invoice.total_amount, Some(Decimal::from_str("15050.00").unwrap()));
        assert_eq!(invoice.confidence, 1.0);
    }

    #[test]
    fn test_partial_header() {
        let invoice = extract_invoice_fields("Bill No. 4521\nsome unrelated words");
        assert_eq!(invoice.invoice_number.as_deref(), Some("4521"));
        assert_eq!(invoice.date, None);
        assert_eq!(invoice.vendor_name, None);
        assert_eq!(invoice.confidence, 0.2);
    }

    #[test]
    fn test_invoice_number_needs_a_digit() {
        let invoice = extract_invoice_fields("Invoice No: Original\nInvoice # 0042");
        assert_eq!(invoice.invoice_number.as_deref(), Some("0042"));
    }

    #[test]
    fn test_extract_product_lines() {
        let products = extract_product_lines(SHOP_INVOICE);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].brand.as_deref(), Some("Redmi"));
        assert_eq!(products[0].model.as_deref(), Some("Note 14"));
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon =
            BrandLexicon::from_json(r#"{"brands": [{"name": "Nothing", "model_prefixes": ["cmf"]}]}"#).unwrap();
        let extractor = InvoiceFieldExtractor::new(&lexicon);
        let products = extractor.extract_product_lines("Nothing Phone 2a 1 PCS 23,999.00 23,999.00");
        assert_eq!(products[0].brand.as_deref(), Some("Nothing"));
        assert_eq!(products[0].model.as_deref(), Some("Phone 2a"));
    }
}
