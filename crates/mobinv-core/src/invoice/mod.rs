//! Invoice field extraction and whole-invoice processing.

mod extractor;
mod processor;
pub mod rules;

pub use extractor::{extract_invoice_fields, extract_product_lines, InvoiceFieldExtractor};
pub use processor::{process_invoice, InvoiceProcessor};

use crate::models::invoice::{InvoiceData, ProductItem};

/// Trait for invoice field extractors.
pub trait InvoiceExtractor {
    /// Extract header fields. Fields that do not match are left empty.
    fn extract_invoice_fields(&self, text: &str) -> InvoiceData;

    /// Extract product rows, in line order.
    fn extract_product_lines(&self, text: &str) -> Vec<ProductItem>;
}
