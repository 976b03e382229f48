//! Vendor and customer extraction.
//!
//! Retail bills rarely label the seller explicitly, so vendor detection falls
//! back to the first company-like line. The customer is only reported when a
//! section marker or a name label points at it.

use super::patterns::{
    COMPANY_MARKER, CUSTOMER_NAME_LABEL, CUSTOMER_SECTION, GSTIN, GSTIN_LABEL, PHONE, PHONE_LABEL,
    VENDOR_SECTION,
};
use regex::Regex;

/// Lines after a customer marker searched for a phone number.
const CUSTOMER_BLOCK_LINES: usize = 4;

/// Extract the seller name.
pub fn extract_vendor_name(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    if let Some(name) = name_after_marker(&lines, &VENDOR_SECTION) {
        return Some(name);
    }

    // Fallback: first company-like line that is not the customer's.
    for (i, line) in lines.iter().enumerate() {
        if CUSTOMER_SECTION.is_match(line) {
            break;
        }

        if let Some(gstin) = GSTIN.find(line) {
            if let Some(name) = clean_name(&line[..gstin.start()]) {
                return Some(name);
            }
            return i.checked_sub(1).and_then(|prev| clean_name(lines[prev]));
        }

        if COMPANY_MARKER.is_match(line) {
            if let Some(name) = clean_name(line) {
                return Some(name);
            }
        }
    }

    None
}

/// Extract the buyer name.
pub fn extract_customer_name(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    if let Some(name) = name_after_marker(&lines, &CUSTOMER_SECTION) {
        return Some(name);
    }

    lines
        .iter()
        .filter_map(|line| CUSTOMER_NAME_LABEL.captures(line))
        .find_map(|caps| clean_name(&caps[1]))
}

/// Extract the buyer's mobile number (10 digits, country code dropped).
pub fn extract_customer_phone(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let start = lines
        .iter()
        .position(|line| CUSTOMER_SECTION.is_match(line))
        .or_else(|| lines.iter().position(|line| CUSTOMER_NAME_LABEL.is_match(line)))?;

    lines
        .iter()
        .skip(start)
        .take(CUSTOMER_BLOCK_LINES + 1)
        .find_map(|line| PHONE.captures(line))
        .map(|caps| caps[1].chars().filter(|c| c.is_ascii_digit()).collect())
}

/// Name following a section marker: on the same line, or on the next line
/// when the marker is a heading on its own.
fn name_after_marker(lines: &[&str], marker: &Regex) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        let Some(m) = marker.find(line) else {
            continue;
        };

        let rest = line[m.end()..].trim();
        if rest.is_empty() {
            if let Some(name) = lines.get(i + 1).and_then(|next| labeled_name(next)) {
                return Some(name);
            }
        } else if let Some(name) = labeled_name(rest) {
            return Some(name);
        }
    }
    None
}

/// Strip an optional "Name:" label, then clean.
fn labeled_name(s: &str) -> Option<String> {
    match CUSTOMER_NAME_LABEL.captures(s) {
        Some(caps) => clean_name(&caps[1]),
        None => clean_name(s),
    }
}

/// Trim a candidate name, cutting at a trailing GSTIN or phone number.
/// Returns `None` for strings without at least two letters.
fn clean_name(s: &str) -> Option<String> {
    let mut end = s.len();
    if let Some(m) = GSTIN_LABEL.find(s) {
        end = m.start();
    }
    if let Some(m) = PHONE.find(&s[..end]) {
        end = m.start();
    }

    // "Mob:" directly before a cut phone number; shop names like
    // "Mobile World" keep their word.
    let mut head = &s[..end];
    if let Some(label) = PHONE_LABEL.find_iter(head).last() {
        if head[label.end()..].trim().is_empty() {
            head = &head[..label.start()];
        }
    }

    let name = head.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ',' | '.' | '|'));
    if name.chars().filter(|c| c.is_alphabetic()).count() < 2 {
        return None;
    }
    Some(name.to_string())
}
