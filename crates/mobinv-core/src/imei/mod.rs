//! IMEI candidate detection and validation.

pub mod checksum;
pub mod context;
mod detector;
pub mod scanner;

pub use checksum::{clean_imei, format_imei, get_validation_error, is_valid_imei, validate_imei};
pub use context::{ContextScore, ContextScorer, ContextWindow, RejectReason, RuleOutcome, ScoringRule};
pub use detector::{detect_imeis, suggest_field_count, ImeiDetector};
pub use scanner::CandidateScanner;
