//! Rule-based field extractors for mobile-shop invoices.

pub mod amounts;
pub mod dates;
pub mod gstin;
pub mod parties;
pub mod patterns;
pub mod products;

pub use amounts::{extract_total, format_amount, parse_amount};
pub use dates::{extract_invoice_date, DateExtractor, InvoiceDate};
pub use gstin::{extract_gstin, validate_gstin, GstinExtractor};
pub use parties::{extract_customer_name, extract_customer_phone, extract_vendor_name};
pub use products::ProductLineParser;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched value with its confidence and source span.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte span in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
