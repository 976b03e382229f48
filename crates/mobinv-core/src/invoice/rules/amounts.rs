//! Amount parsing and invoice total extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{GRAND_TOTAL, NET_TOTAL, PLAIN_TOTAL};
use super::ExtractionMatch;

/// Extract the invoice grand total.
///
/// Labels are tried strongest first: "grand total", then "net amount" and
/// friends, then a bare "total" (never "sub total").
pub fn extract_total(text: &str) -> Option<ExtractionMatch<Decimal>> {
    if let Some(caps) = GRAND_TOTAL.captures(text) {
        if let Some(amount) = parse_amount(&caps[1]) {
            return Some(ExtractionMatch::new(amount, 0.95, &caps[0]));
        }
    }

    if let Some(caps) = NET_TOTAL.captures(text) {
        if let Some(amount) = parse_amount(&caps[1]) {
            return Some(ExtractionMatch::new(amount, 0.9, &caps[0]));
        }
    }

    PLAIN_TOTAL
        .captures_iter(text)
        .filter(|caps| caps.get(1).is_none())
        .find_map(|caps| {
            parse_amount(&caps[2]).map(|amount| ExtractionMatch::new(amount, 0.8, &caps[0]))
        })
}

/// Parse an amount printed with Indian or Western grouping
/// ("1,17,759.00", "17,759.00", "15050", "1.234,56").
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == ',' || c == '.');

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both present: whichever comes last is the decimal separator.
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Only commas: a trailing group of 1-2 digits is a decimal fraction.
        (Some(c), None) => {
            let tail = cleaned.len() - c - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&tail) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned.to_string(),
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount with Indian digit grouping (1,17,759.00).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut groups: Vec<String> = Vec::new();
    let mut end = digits.len();

    // Last three digits, then groups of two.
    let mut width = 3;
    while end > 0 {
        let start = end.saturating_sub(width);
        groups.push(digits[start..end].iter().collect());
        end = start;
        width = 2;
    }
    groups.reverse();

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, groups.join(","), decimal_part)
}
