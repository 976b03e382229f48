//! IMEI detection data models.

use serde::{Deserialize, Serialize};

use crate::error::ImeiValidationError;

/// Outcome of validating a single IMEI string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the input is a well-formed, checksum-valid IMEI.
    pub is_valid: bool,

    /// The 15 cleaned digits, present only when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_imei: Option<String>,

    /// Human-readable failure message, present only when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Typed failure kind, present only when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ImeiValidationError>,
}

impl ValidationResult {
    pub fn valid(clean_imei: String) -> Self {
        Self {
            is_valid: true,
            clean_imei: Some(clean_imei),
            error_message: None,
            error: None,
        }
    }

    pub fn invalid(error: ImeiValidationError) -> Self {
        Self {
            is_valid: false,
            clean_imei: None,
            error_message: Some(error.to_string()),
            error: Some(error),
        }
    }
}

/// A 15-digit run found in normalized OCR text, with its final confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImeiCandidate {
    /// Text exactly as it appeared (separators included).
    pub raw_match: String,

    /// The 15 digits with separators removed.
    pub clean_digits: String,

    /// Byte offset of the first digit in the normalized text.
    pub start: usize,

    /// Byte offset one past the last digit.
    pub end: usize,

    /// Text surrounding the match used for context scoring.
    pub context_window: String,

    /// Confidence in [0, 1].
    pub confidence: f32,

    /// Checksum validation of `clean_digits`.
    pub validation: ValidationResult,

    /// Names of the scoring rules that contributed to `confidence`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
}

impl ImeiCandidate {
    /// Span in the normalized text.
    pub fn position(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Whether the digits pass the Luhn check.
    pub fn is_checksum_valid(&self) -> bool {
        self.validation.is_valid
    }

    /// A genuine IMEI at `threshold`: checksum-valid and confident enough.
    ///
    /// Context alone never promotes a Luhn-failing number.
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.validation.is_valid && self.confidence >= threshold
    }
}

/// How many IMEI input fields a form should offer for a scanned invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImeiFieldSuggestion {
    /// No confident IMEI found.
    None,
    /// One device identifier.
    Single,
    /// Two identifiers, typically a dual-SIM handset.
    Dual,
    /// Three or more; ambiguous, surface all of them.
    Multiple(usize),
}

impl ImeiFieldSuggestion {
    /// Map a count of confident candidates to a suggestion.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => ImeiFieldSuggestion::None,
            1 => ImeiFieldSuggestion::Single,
            2 => ImeiFieldSuggestion::Dual,
            n => ImeiFieldSuggestion::Multiple(n),
        }
    }

    /// Number of input fields to show.
    pub fn field_count(&self) -> usize {
        match self {
            ImeiFieldSuggestion::None => 0,
            ImeiFieldSuggestion::Single => 1,
            ImeiFieldSuggestion::Dual => 2,
            ImeiFieldSuggestion::Multiple(n) => *n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_from_count() {
        assert_eq!(ImeiFieldSuggestion::from_count(0), ImeiFieldSuggestion::None);
        assert_eq!(ImeiFieldSuggestion::from_count(1), ImeiFieldSuggestion::Single);
        assert_eq!(ImeiFieldSuggestion::from_count(2), ImeiFieldSuggestion::Dual);
        assert_eq!(ImeiFieldSuggestion::from_count(5), ImeiFieldSuggestion::Multiple(5));
        assert_eq!(ImeiFieldSuggestion::from_count(5).field_count(), 5);
    }

    #[test]
    fn test_invalid_result_carries_message() {
        let result = ValidationResult::invalid(ImeiValidationError::NonNumeric);
        assert!(!result.is_valid);
        assert!(result.clean_imei.is_none());
        assert_eq!(result.error_message.as_deref(), Some("IMEI must contain only digits"));
    }
}
