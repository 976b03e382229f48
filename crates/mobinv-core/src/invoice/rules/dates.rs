//! Date extraction for invoices.

use chrono::NaiveDate;

use super::patterns::{DATE_DMONY, DATE_DMY, DATE_YMD, LABELED_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // "15-Jan-2025", "15 January 25"
        for caps in DATE_DMONY.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_to_number(&caps[2]);
            let year = parse_year(&caps[3]);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                push_unique(&mut results, date, 0.95, &caps);
            }
        }

        // DD-MM-YYYY, DD/MM/YY, DD.MM.YYYY
        for caps in DATE_DMY.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                push_unique(&mut results, date, 0.9, &caps);
            }
        }

        // YYYY-MM-DD
        for caps in DATE_YMD.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                push_unique(&mut results, date, 0.9, &caps);
            }
        }

        results.sort_by_key(|r| r.position.map(|(start, _)| start));
        results
    }
}

fn push_unique(
    results: &mut Vec<ExtractionMatch<NaiveDate>>,
    date: NaiveDate,
    confidence: f32,
    caps: &regex::Captures<'_>,
) {
    if results.iter().any(|r| r.value == date) {
        return;
    }
    if let Some(m) = caps.get(0) {
        results.push(ExtractionMatch::new(date, confidence, m.as_str()).with_position(m.start(), m.end()));
    }
}

/// An invoice date as printed, plus its calendar value when it is a real date.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDate {
    pub raw: String,
    pub parsed: Option<NaiveDate>,
}

/// Extract the labelled invoice date ("Date: 15-Jan-2025").
///
/// Unlabelled dates are ignored: on a retail bill they are as likely to be a
/// warranty or delivery date as the invoice date.
pub fn extract_invoice_date(text: &str) -> Option<InvoiceDate> {
    let caps = LABELED_DATE.captures(text)?;
    let raw = caps[1].trim().to_string();
    let parsed = DateExtractor::new().extract(&raw).map(|m| m.value);
    Some(InvoiceDate { raw, parsed })
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 { 2000 + year } else { year }
}

fn month_to_number(month: &str) -> u32 {
    let lower = month.to_ascii_lowercase();
    let key = lower.get(..3).unwrap_or(&lower);
    match key {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}
