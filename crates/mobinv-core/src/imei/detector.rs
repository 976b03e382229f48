//! Ranked, deduplicated IMEI detection over OCR text.

use std::collections::HashMap;

use tracing::debug;

use super::context::{ContextScorer, ContextWindow};
use super::scanner::CandidateScanner;
use crate::models::config::DetectionConfig;
use crate::models::imei::{ImeiCandidate, ImeiFieldSuggestion};
use crate::text::NormalizedText;

/// Combines scanning, checksum validation and context scoring.
pub struct ImeiDetector {
    config: DetectionConfig,
    scanner: CandidateScanner,
    scorer: ContextScorer,
}

impl ImeiDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            scanner: CandidateScanner::new(config.window_radius),
            scorer: ContextScorer::new(&config),
            config,
        }
    }

    /// Replace the context scorer (e.g. one with extra rules).
    pub fn with_scorer(mut self, scorer: ContextScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect IMEIs in raw OCR text.
    pub fn detect(&self, text: &str) -> Vec<ImeiCandidate> {
        self.detect_normalized(&NormalizedText::new(text))
    }

    /// Detect IMEIs in already-normalized text.
    ///
    /// Sorted by descending confidence, then ascending position. Every
    /// returned candidate is at or above the configured floor and unique by
    /// its 15 digits.
    pub fn detect_normalized(&self, text: &NormalizedText) -> Vec<ImeiCandidate> {
        let mut kept: Vec<ImeiCandidate> = Vec::new();
        let mut index_by_digits: HashMap<String, usize> = HashMap::new();

        for mut candidate in self.scanner.scan(text) {
            let window =
                ContextWindow::around(text, candidate.start, candidate.end, self.config.window_radius);
            let score = self.scorer.score(&candidate, &window);

            if score.is_rejected() {
                continue;
            }
            if !candidate.validation.is_valid && !score.has_positive_context {
                debug!("Dropping {}: invalid checksum, no IMEI context", candidate.clean_digits);
                continue;
            }
            if score.confidence < self.config.min_confidence {
                continue;
            }

            candidate.confidence = score.confidence;
            candidate.signals = score.signals;

            // Scan order is position order, so ties keep the earliest.
            match index_by_digits.get(&candidate.clean_digits) {
                Some(&i) if kept[i].confidence >= candidate.confidence => {}
                Some(&i) => kept[i] = candidate,
                None => {
                    index_by_digits.insert(candidate.clean_digits.clone(), kept.len());
                    kept.push(candidate);
                }
            }
        }

        kept.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.start.cmp(&b.start))
        });

        debug!("Detected {} IMEI candidates", kept.len());
        kept
    }

    /// Suggest how many IMEI fields a form should show for this text.
    pub fn suggest_field_count(&self, text: &str) -> ImeiFieldSuggestion {
        let confident = self
            .detect(text)
            .iter()
            .filter(|c| c.is_confident(self.config.suggestion_threshold))
            .count();
        ImeiFieldSuggestion::from_count(confident)
    }
}

impl Default for ImeiDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Detect IMEIs with the default configuration.
pub fn detect_imeis(text: &str) -> Vec<ImeiCandidate> {
    ImeiDetector::default().detect(text)
}

/// Suggest an IMEI field count with the default configuration.
pub fn suggest_field_count(text: &str) -> ImeiFieldSuggestion {
    ImeiDetector::default().suggest_field_count(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imei::checksum::luhn_check_digit;

    #[test]
    fn test_dual_imei_invoice() {
        let text = "IMEI1: 490154203237518 IMEI2: 490154203237526";
        let candidates = detect_imeis(text);

        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.is_checksum_valid()));
        assert!(candidates.iter().all(|c| c.confidence >= 0.7));
        // Equal confidence, so position decides.
        assert_eq!(candidates[0].clean_digits, "490154203237518");
        assert_eq!(suggest_field_count(text), ImeiFieldSuggestion::Dual);
    }

    #[test]
    fn test_hex_invoice_number_yields_nothing() {
        let text = "Invoice No: 8b82e27ca657d389a2f5068d53a9c805a3bc216dc2045c";
        assert!(detect_imeis(text).is_empty());
        assert_eq!(suggest_field_count(text), ImeiFieldSuggestion::None);
    }

    #[test]
    fn test_repeated_digits_yield_nothing() {
        assert!(detect_imeis("111111111111111").is_empty());
        // Checksum-valid, still rejected.
        assert!(detect_imeis("IMEI: 000000000000000").is_empty());
    }

    #[test]
    fn test_repeated_and_sequential_never_returned() {
        for d in 0..10u32 {
            let repeated: String = std::iter::repeat(char::from_digit(d, 10).unwrap()).take(15).collect();
            let up: String = (0..15).map(|i| char::from_digit((d + i) % 10, 10).unwrap()).collect();
            let down: String = (0..15).map(|i| char::from_digit((d + 100 - i) % 10, 10).unwrap()).collect();

            for digits in [repeated, up, down] {
                let text = format!("IMEI: {} serial", digits);
                assert!(detect_imeis(&text).iter().all(|c| c.clean_digits != digits), "{}", digits);
            }
        }
    }

    #[test]
    fn test_negative_context_stays_low() {
        for label in ["Invoice No", "GST", "Phone", "Date"] {
            let text = format!("{}: 490154203237518", label);
            for c in detect_imeis(&text) {
                assert!(c.confidence <= 0.4 + f32::EPSILON, "{} -> {}", label, c.confidence);
            }
        }
    }

    #[test]
    fn test_negative_context_spread_checksum_valid_values() {
        let mut seed: u64 = 42;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let body = format!("{:014}", seed % 100_000_000_000_000);
            let digits = format!("{}{}", body, luhn_check_digit(&body).unwrap());
            let text = format!("Tax Invoice {} dated", digits);
            for c in detect_imeis(&text) {
                assert!(c.confidence <= 0.4 + f32::EPSILON);
            }
        }
    }

    #[test]
    fn test_invalid_checksum_needs_context() {
        // No IMEI keyword: dropped.
        assert!(detect_imeis("Ref 490154203237519").is_empty());

        // Keyword rescues it, but it stays below the suggestion threshold.
        let candidates = detect_imeis("IMEI: 490154203237519");
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].confidence < 0.7);
        assert_eq!(suggest_field_count("IMEI: 490154203237519"), ImeiFieldSuggestion::None);
    }

    #[test]
    fn test_capped_context_cannot_promote_invalid_checksum() {
        // Two IMEI labels hit the positive cap: 0.5 - 0.3 + 0.5 lands on the threshold.
        let text = "IMEI1: 490154203237519 IMEI2: 356938035643809";
        let candidates = detect_imeis(text);
        assert_eq!(candidates.len(), 2);

        let invalid = candidates.iter().find(|c| !c.is_checksum_valid()).unwrap();
        assert_eq!(invalid.clean_digits, "490154203237519");
        assert!((invalid.confidence - 0.7).abs() < 1e-4, "{}", invalid.confidence);
        assert!(!invalid.is_confident(0.7));

        let valid = candidates.iter().find(|c| c.is_checksum_valid()).unwrap();
        assert!(valid.is_confident(0.7));

        assert_eq!(suggest_field_count(text), ImeiFieldSuggestion::Single);
    }

    #[test]
    fn test_duplicates_keep_highest_confidence() {
        let text = "Model Note 14 490154203237518\n\
                    Charger, earphones and manual included in box\n\
                    IMEI: 490154203237518";
        let candidates = detect_imeis(text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].confidence, 1.0);
        assert!(candidates[0].start > 20);
    }

    #[test]
    fn test_ranking_by_confidence_then_position() {
        let text = "S/N 356938035643809\n\
                    Charger, earphones and manual included in box\n\
                    IMEI 490154203237518";
        let candidates = detect_imeis(text);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].clean_digits, "490154203237518");
        assert!(candidates[0].confidence > candidates[1].confidence);
    }

    #[test]
    fn test_single_and_multiple_suggestions() {
        assert_eq!(
            suggest_field_count("IMEI: 490154203237518"),
            ImeiFieldSuggestion::Single
        );
        let text = "IMEI 490154203237518\nIMEI 490154203237526\nIMEI 356938035643809";
        assert_eq!(suggest_field_count(text), ImeiFieldSuggestion::Multiple(3));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let text = "Tax Invoice\nIMEI1: 490154203237518 IMEI2: 490154203237526\nPhone 9876543210";
        assert_eq!(detect_imeis(text), detect_imeis(text));
    }

    #[test]
    fn test_ocr_confusables_are_repaired() {
        let candidates = detect_imeis("IMEI: 49O154203237518");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].clean_digits, "490154203237518");
    }
}
