//! GSTIN (Indian GST identification number) extraction and validation.

use super::patterns::{GSTIN, GSTIN_LABEL};
use super::{ExtractionMatch, FieldExtractor};

const GSTIN_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// GSTIN field extractor. Only numbers with a correct check character match.
pub struct GstinExtractor;

impl GstinExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GstinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for GstinExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        GSTIN
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(1)?;
                let gstin = m.as_str().to_string();
                if !validate_gstin(&gstin) {
                    return None;
                }

                // A "GSTIN:" label right before the number raises confidence.
                let labeled = GSTIN_LABEL
                    .find_iter(&text[..m.start()])
                    .last()
                    .is_some_and(|label| label.end() == m.start());
                let confidence = if labeled { 0.95 } else { 0.8 };

                Some(ExtractionMatch::new(gstin, confidence, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}

/// Extract the first valid GSTIN from text.
pub fn extract_gstin(text: &str) -> Option<String> {
    GstinExtractor::new().extract(text).map(|m| m.value)
}

/// Validate a GSTIN using its mod-36 check character.
///
/// Format: 2-digit state code, 10-character PAN, entity number, 'Z', check
/// character. Each of the first 14 characters is weighted 1 and 2
/// alternately; products are folded base 36 before summing.
pub fn validate_gstin(gstin: &str) -> bool {
    let gstin = gstin.trim().to_ascii_uppercase();
    if gstin.len() != 15 || !GSTIN.is_match(&gstin) {
        return false;
    }

    let values: Option<Vec<u32>> = gstin
        .chars()
        .map(|c| GSTIN_CHARSET.find(c).map(|v| v as u32))
        .collect();
    let Some(values) = values else {
        return false;
    };

    let sum: u32 = values
        .iter()
        .take(14)
        .enumerate()
        .map(|(i, &v)| {
            let product = v * if i % 2 == 0 { 1 } else { 2 };
            product / 36 + product % 36
        })
        .sum();

    let check = (36 - sum % 36) % 36;
    check == values[14]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_gstin_valid() {
        assert!(validate_gstin("27AAPFU0939F1ZV"));
        assert!(validate_gstin("29AAGCB7383J1Z4"));
        assert!(validate_gstin("07AAACR5055K1Z9"));
        assert!(validate_gstin("27aapfu0939f1zv"));
    }

    #[test]
    fn test_validate_gstin_invalid() {
        assert!(!validate_gstin("27AAPFU0939F1ZA")); // Wrong check character
        assert!(!validate_gstin("27AAPFU0939F1Z")); // Too short
        assert!(!validate_gstin("27AAPFU0939F1XV")); // Missing 'Z'
        assert!(!validate_gstin(""));
    }

    #[test]
    fn test_extract_gstin_labeled() {
        let text = "Sri Balaji Mobiles\nGSTIN: 29AAGCB7383J1Z4\nMG Road, Bengaluru";
        let found = GstinExtractor::new().extract(text).unwrap();
        assert_eq!(found.value, "29AAGCB7383J1Z4");
        assert_eq!(found.confidence, 0.95);
    }

    #[test]
    fn test_extract_gstin_skips_invalid() {
        let text = "GSTIN 27AAPFU0939F1ZA  other 07AAACR5055K1Z9";
        assert_eq!(extract_gstin(text), Some("07AAACR5055K1Z9".to_string()));

        let all = GstinExtractor::new().extract_all(text);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].confidence, 0.8);
    }
}
