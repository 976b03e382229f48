//! Error types for the mobinv-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the mobinv library.
///
/// The extraction pipeline itself is total and never produces this error;
/// it only surfaces from loading configuration and lexicon files.
#[derive(Error, Debug)]
pub enum MobinvError {
    /// Brand lexicon could not be loaded.
    #[error("lexicon error: {0}")]
    Lexicon(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a string fails IMEI validation.
///
/// The `Display` text is the human-readable message reported to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImeiValidationError {
    /// Nothing left after removing separators.
    #[error("IMEI is empty")]
    EmptyInput,

    /// Not exactly 15 characters after removing separators.
    #[error("IMEI must be exactly 15 digits, found {found}")]
    WrongLength { found: usize },

    /// Non-digit characters remain after removing separators.
    #[error("IMEI must contain only digits")]
    NonNumeric,

    /// The Luhn check digit does not match.
    #[error("IMEI checksum mismatch: expected check digit {expected}, found {found}")]
    ChecksumMismatch { expected: u8, found: u8 },
}

/// Failure classes of whole-invoice processing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingErrorKind {
    /// The OCR text is empty or too short to hold an invoice.
    #[error("insufficient text")]
    InsufficientText,

    /// Neither header fields nor product lines could be recognized.
    #[error("unrecognized invoice format")]
    UnrecognizedFormat,
}

/// Result type for the mobinv library.
pub type Result<T> = std::result::Result<T, MobinvError>;
