//! Core library for mobile-shop invoice OCR text.
//!
//! This crate provides:
//! - IMEI candidate detection with Luhn validation and context scoring
//! - Invoice header extraction (number, date, parties, GSTIN, total)
//! - Product line parsing against a swappable brand lexicon
//! - Whole-invoice processing into a tagged success/error result
//!
//! Text recognition itself happens elsewhere; this crate starts from the
//! OCR text (and optionally its boxes). Every pipeline function is pure.

pub mod error;
pub mod imei;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod text;

pub use error::{ImeiValidationError, MobinvError, ProcessingErrorKind, Result};
pub use imei::{
    clean_imei, detect_imeis, format_imei, get_validation_error, is_valid_imei, suggest_field_count,
    validate_imei, ImeiDetector,
};
pub use invoice::{
    extract_invoice_fields, extract_product_lines, process_invoice, InvoiceExtractor,
    InvoiceFieldExtractor, InvoiceProcessor,
};
pub use models::config::MobinvConfig;
pub use models::imei::{ImeiCandidate, ImeiFieldSuggestion, ValidationResult};
pub use models::invoice::{InvoiceData, InvoiceProcessingResult, ProductItem};
pub use models::lexicon::{BrandEntry, BrandLexicon};
pub use ocr::{OcrDocument, TextBox};
pub use text::NormalizedText;
