//! Context-based confidence scoring for IMEI candidates.
//!
//! Scoring is an ordered list of named rules. Each rule either rejects the
//! candidate outright (short-circuiting the rest) or contributes a delta to
//! the base confidence.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::models::config::DetectionConfig;
use crate::models::imei::ImeiCandidate;
use crate::text::NormalizedText;

const RULE_POSITIVE_KEYWORDS: &str = "positive_keywords";

/// The text around a candidate, with the candidate's span inside it.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindow<'a> {
    text: &'a str,
    match_start: usize,
    match_end: usize,
}

impl<'a> ContextWindow<'a> {
    /// Window of `radius` bytes on each side of `start..end` in `text`.
    pub fn around(text: &'a NormalizedText, start: usize, end: usize, radius: usize) -> Self {
        let (lo, hi) = text.window_bounds(start, end, radius);
        Self {
            text: &text.as_str()[lo..hi],
            match_start: start.clamp(lo, hi) - lo,
            match_end: end.clamp(lo, hi) - lo,
        }
    }

    /// Window over a standalone string with the match at `start..end`.
    pub fn new(text: &'a str, start: usize, end: usize) -> Self {
        let end = end.min(text.len());
        Self {
            text,
            match_start: start.min(end),
            match_end: end,
        }
    }

    /// The whole window.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Text preceding the candidate.
    pub fn before(&self) -> &'a str {
        &self.text[..self.match_start]
    }

    /// Text following the candidate.
    pub fn after(&self) -> &'a str {
        &self.text[self.match_end..]
    }
}

/// Why a candidate was rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// A letter touches the digit run, so it is part of an alphanumeric ID.
    AlphaAdjacent,
    /// All fifteen digits are the same.
    RepeatedDigits,
    /// Digits step up or down by one throughout.
    SequentialDigits,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::AlphaAdjacent => "alphabetic character adjacent to digits",
            RejectReason::RepeatedDigits => "all digits identical",
            RejectReason::SequentialDigits => "sequential digit run",
        };
        f.write_str(s)
    }
}

/// Verdict of a single scoring rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleOutcome {
    /// Force confidence to zero and stop evaluating.
    Reject(RejectReason),
    /// Add a (possibly negative) amount to the confidence.
    Adjust(f32),
    /// Rule does not apply.
    Neutral,
}

/// A named rule evaluated against a candidate and its context.
pub trait ScoringRule: Send + Sync {
    /// Stable rule name, used in signal lists.
    fn name(&self) -> &'static str;

    /// Evaluate the rule.
    fn evaluate(&self, candidate: &ImeiCandidate, window: &ContextWindow<'_>) -> RuleOutcome;
}

struct AlphaAdjacentRule;

impl ScoringRule for AlphaAdjacentRule {
    fn name(&self) -> &'static str {
        "alpha_adjacent"
    }

    fn evaluate(&self, _candidate: &ImeiCandidate, window: &ContextWindow<'_>) -> RuleOutcome {
        let touches_before = window.before().chars().next_back().is_some_and(char::is_alphabetic);
        let touches_after = window.after().chars().next().is_some_and(char::is_alphabetic);

        if touches_before || touches_after {
            RuleOutcome::Reject(RejectReason::AlphaAdjacent)
        } else {
            RuleOutcome::Neutral
        }
    }
}

struct RepeatedDigitsRule;

impl ScoringRule for RepeatedDigitsRule {
    fn name(&self) -> &'static str {
        "repeated_digits"
    }

    fn evaluate(&self, candidate: &ImeiCandidate, _window: &ContextWindow<'_>) -> RuleOutcome {
        if is_repeated(&candidate.clean_digits) {
            RuleOutcome::Reject(RejectReason::RepeatedDigits)
        } else {
            RuleOutcome::Neutral
        }
    }
}

struct SequentialDigitsRule;

impl ScoringRule for SequentialDigitsRule {
    fn name(&self) -> &'static str {
        "sequential_digits"
    }

    fn evaluate(&self, candidate: &ImeiCandidate, _window: &ContextWindow<'_>) -> RuleOutcome {
        if is_sequential(&candidate.clean_digits) {
            RuleOutcome::Reject(RejectReason::SequentialDigits)
        } else {
            RuleOutcome::Neutral
        }
    }
}

struct ChecksumRule {
    weight: f32,
}

impl ScoringRule for ChecksumRule {
    fn name(&self) -> &'static str {
        "checksum"
    }

    fn evaluate(&self, candidate: &ImeiCandidate, _window: &ContextWindow<'_>) -> RuleOutcome {
        if candidate.validation.is_valid {
            RuleOutcome::Adjust(self.weight)
        } else {
            RuleOutcome::Adjust(-self.weight)
        }
    }
}

struct KeywordRule {
    name: &'static str,
    patterns: Vec<Regex>,
    weight: f32,
    cap: Option<f32>,
}

impl KeywordRule {
    fn new(name: &'static str, keywords: &[String], weight: f32, cap: Option<f32>) -> Self {
        Self {
            name,
            patterns: compile_keywords(keywords),
            weight,
            cap,
        }
    }
}

impl ScoringRule for KeywordRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn evaluate(&self, _candidate: &ImeiCandidate, window: &ContextWindow<'_>) -> RuleOutcome {
        let hits = self.patterns.iter().filter(|p| p.is_match(window.text())).count();
        if hits == 0 {
            return RuleOutcome::Neutral;
        }

        let delta = hits as f32 * self.weight;
        let delta = match self.cap {
            Some(cap) if delta.abs() > cap => cap.copysign(delta),
            _ => delta,
        };
        RuleOutcome::Adjust(delta)
    }
}

/// Word-bounded, case-insensitive pattern per keyword; inner spaces match any whitespace.
fn compile_keywords(keywords: &[String]) -> Vec<Regex> {
    keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .filter_map(|k| {
            let body = k
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            match Regex::new(&format!(r"(?i)\b{}\b", body)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring keyword {:?}: {}", k, e);
                    None
                }
            }
        })
        .collect()
}

fn is_repeated(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// Every step is +1 (or every step is -1), wrapping 9 -> 0.
fn is_sequential(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if values.len() < 2 {
        return false;
    }

    let steps: Vec<u32> = values.windows(2).map(|w| (w[1] + 10 - w[0]) % 10).collect();
    steps.iter().all(|&s| s == 1) || steps.iter().all(|&s| s == 9)
}

/// Result of scoring one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextScore {
    /// Final confidence in [0, 1]; zero when rejected.
    pub confidence: f32,
    /// Contributing rules, as `name:+delta` or `name:reject`.
    pub signals: Vec<String>,
    /// Set when a rule rejected the candidate.
    pub rejection: Option<RejectReason>,
    /// Whether any positive keyword was found in the window.
    pub has_positive_context: bool,
}

impl ContextScore {
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Scores IMEI candidates against their surrounding text.
pub struct ContextScorer {
    base: f32,
    rules: Vec<Box<dyn ScoringRule>>,
}

impl ContextScorer {
    /// Build the standard rule list from configuration.
    pub fn new(config: &DetectionConfig) -> Self {
        let rules: Vec<Box<dyn ScoringRule>> = vec![
            Box::new(AlphaAdjacentRule),
            Box::new(RepeatedDigitsRule),
            Box::new(SequentialDigitsRule),
            Box::new(ChecksumRule {
                weight: config.checksum_weight,
            }),
            Box::new(KeywordRule::new(
                RULE_POSITIVE_KEYWORDS,
                &config.positive_keywords,
                config.positive_weight,
                Some(config.positive_cap),
            )),
            Box::new(KeywordRule::new(
                "negative_keywords",
                &config.negative_keywords,
                -config.negative_weight,
                None,
            )),
        ];

        Self {
            base: config.base_confidence,
            rules,
        }
    }

    /// Append a custom rule after the standard ones.
    pub fn with_rule(mut self, rule: Box<dyn ScoringRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Score a candidate within its context window.
    pub fn score(&self, candidate: &ImeiCandidate, window: &ContextWindow<'_>) -> ContextScore {
        let mut confidence = self.base;
        let mut signals = Vec::new();
        let mut has_positive_context = false;

        for rule in &self.rules {
            match rule.evaluate(candidate, window) {
                RuleOutcome::Reject(reason) => {
                    trace!("{} rejected by {}: {}", candidate.clean_digits, rule.name(), reason);
                    signals.push(format!("{}:reject", rule.name()));
                    return ContextScore {
                        confidence: 0.0,
                        signals,
                        rejection: Some(reason),
                        has_positive_context,
                    };
                }
                RuleOutcome::Adjust(delta) => {
                    if rule.name() == RULE_POSITIVE_KEYWORDS && delta > 0.0 {
                        has_positive_context = true;
                    }
                    confidence += delta;
                    signals.push(format!("{}:{:+.2}", rule.name(), delta));
                }
                RuleOutcome::Neutral => {}
            }
        }

        ContextScore {
            confidence: confidence.clamp(0.0, 1.0),
            signals,
            rejection: None,
            has_positive_context,
        }
    }
}

impl Default for ContextScorer {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imei::checksum::validate_imei;

    fn candidate(digits: &str) -> ImeiCandidate {
        ImeiCandidate {
            raw_match: digits.to_string(),
            clean_digits: digits.to_string(),
            start: 0,
            end: digits.len(),
            context_window: String::new(),
            confidence: 0.0,
            validation: validate_imei(digits),
            signals: Vec::new(),
        }
    }

    fn score_in(context: &str, digits: &str) -> ContextScore {
        let start = context.find(digits).unwrap();
        let window = ContextWindow::new(context, start, start + digits.len());
        ContextScorer::default().score(&candidate(digits), &window)
    }

    #[test]
    fn test_valid_without_context() {
        let score = score_in("490154203237518", "490154203237518");
        assert!((score.confidence - 0.8).abs() < 1e-6);
        assert!(!score.has_positive_context);
    }

    #[test]
    fn test_positive_keywords_are_capped() {
        let score = score_in("IMEI1: 490154203237518 IMEI2", "490154203237518");
        assert_eq!(score.confidence, 1.0);
        assert!(score.has_positive_context);
        assert!(score.signals.iter().any(|s| s == "positive_keywords:+0.50"));
    }

    #[test]
    fn test_negative_keywords_penalize() {
        let score = score_in("Invoice No 490154203237518", "490154203237518");
        assert!(score.confidence <= 0.4 + f32::EPSILON);

        let score = score_in("GST Invoice Date 490154203237518", "490154203237518");
        assert_eq!(score.confidence, 0.0);
    }

    #[test]
    fn test_keywords_respect_word_boundaries() {
        // "Black" must not count as "ack", "iPhone" must not count as "phone".
        let score = score_in("iPhone Black 490154203237518", "490154203237518");
        assert!((score.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_checksum_penalized() {
        let score = score_in("490154203237519", "490154203237519");
        assert!((score.confidence - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_hard_rejects() {
        let score = score_in("IMEI 000000000000000", "000000000000000");
        assert_eq!(score.rejection, Some(RejectReason::RepeatedDigits));
        assert_eq!(score.confidence, 0.0);

        let score = score_in("IMEI 123456789012345", "123456789012345");
        assert_eq!(score.rejection, Some(RejectReason::SequentialDigits));

        let score = score_in("IMEI 987654321098765", "987654321098765");
        assert_eq!(score.rejection, Some(RejectReason::SequentialDigits));

        let score = score_in("IMEI X490154203237518", "490154203237518");
        assert_eq!(score.rejection, Some(RejectReason::AlphaAdjacent));

        let score = score_in("IMEI 490154203237518b", "490154203237518");
        assert_eq!(score.rejection, Some(RejectReason::AlphaAdjacent));
    }

    #[test]
    fn test_sequence_helpers() {
        assert!(is_sequential("890123456789012"));
        assert!(!is_sequential("490154203237518"));
        assert!(is_repeated("777777777777777"));
        assert!(!is_repeated("777777777777778"));
    }

    #[test]
    fn test_custom_rule_is_applied() {
        struct Penalty;
        impl ScoringRule for Penalty {
            fn name(&self) -> &'static str {
                "penalty"
            }
            fn evaluate(&self, _: &ImeiCandidate, _: &ContextWindow<'_>) -> RuleOutcome {
                RuleOutcome::Adjust(-0.5)
            }
        }

        let scorer = ContextScorer::default().with_rule(Box::new(Penalty));
        let window = ContextWindow::new("490154203237518", 0, 15);
        let score = scorer.score(&candidate("490154203237518"), &window);
        assert!((score.confidence - 0.3).abs() < 1e-6);
    }
}
