//! IMEI cleaning, formatting and Luhn check-digit validation.

use crate::error::ImeiValidationError;
use crate::models::imei::ValidationResult;

/// Number of digits in an IMEI (14 body digits + 1 check digit).
pub const IMEI_LENGTH: usize = 15;

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, '-' | '/' | '.' | '_')
}

/// Strip separators (whitespace, `-`, `/`, `.`, `_`) from an IMEI string.
///
/// Letters and other symbols are kept so validation can report them.
pub fn clean_imei(imei: &str) -> String {
    imei.chars().filter(|c| !is_separator(*c)).collect()
}

/// Compute the Luhn check digit for a body of ASCII digits.
///
/// Returns `None` if the body contains a non-digit.
pub fn luhn_check_digit(body: &str) -> Option<u8> {
    let mut sum = 0u32;

    // Doubling starts at the digit immediately left of the (missing) check digit.
    for (i, c) in body.chars().rev().enumerate() {
        let mut d = c.to_digit(10)?;
        if i % 2 == 0 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }

    Some(((10 - sum % 10) % 10) as u8)
}

/// Check an IMEI and return the first failure in precedence order.
fn check(imei: &str) -> Result<String, ImeiValidationError> {
    let cleaned = clean_imei(imei);

    if cleaned.is_empty() {
        return Err(ImeiValidationError::EmptyInput);
    }

    let length = cleaned.chars().count();
    if length != IMEI_LENGTH {
        return Err(ImeiValidationError::WrongLength { found: length });
    }

    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ImeiValidationError::NonNumeric);
    }

    let expected = luhn_check_digit(&cleaned[..IMEI_LENGTH - 1]).ok_or(ImeiValidationError::NonNumeric)?;
    let found = cleaned.as_bytes()[IMEI_LENGTH - 1] - b'0';
    if expected != found {
        return Err(ImeiValidationError::ChecksumMismatch { expected, found });
    }

    Ok(cleaned)
}

/// Validate an IMEI, returning a structured result.
pub fn validate_imei(imei: &str) -> ValidationResult {
    match check(imei) {
        Ok(cleaned) => ValidationResult::valid(cleaned),
        Err(e) => ValidationResult::invalid(e),
    }
}

/// Validate an IMEI using the Luhn algorithm.
pub fn is_valid_imei(imei: &str) -> bool {
    check(imei).is_ok()
}

/// Human-readable reason the IMEI is invalid, or `None` when it is valid.
pub fn get_validation_error(imei: &str) -> Option<String> {
    check(imei).err().map(|e| e.to_string())
}

/// Format an IMEI in 6-6-3 groups (`490154 203237 518`).
pub fn format_imei(imei: &str) -> String {
    let digits = clean_imei(imei);

    if digits.len() != IMEI_LENGTH || !digits.chars().all(|c| c.is_ascii_digit()) {
        return imei.to_string();
    }

    format!("{} {} {}", &digits[0..6], &digits[6..12], &digits[12..15])
}
