//! Scanning normalized text for 15-digit runs that might be IMEIs.

use tracing::{debug, trace};

use super::checksum::{validate_imei, IMEI_LENGTH};
use super::context::ContextWindow;
use crate::models::imei::ImeiCandidate;
use crate::text::NormalizedText;

/// Smallest digit count treated as a possible IMEI with one dropped digit.
const MIN_ADMISSIBLE_DIGITS: usize = IMEI_LENGTH - 1;
/// Largest digit count treated as a possible IMEI with one inserted digit.
const MAX_ADMISSIBLE_DIGITS: usize = IMEI_LENGTH + 1;
/// Longest separator gap bridged inside one run.
const MAX_SEPARATOR_GAP: usize = 3;

fn is_run_separator(b: u8) -> bool {
    matches!(b, b' ' | b'-' | b'/')
}

/// Finds maximal digit runs of IMEI length.
pub struct CandidateScanner {
    window_radius: usize,
}

impl CandidateScanner {
    /// Create a scanner capturing `window_radius` bytes of context on each side.
    pub fn new(window_radius: usize) -> Self {
        Self { window_radius }
    }

    /// Scan text for candidates, in order of position.
    ///
    /// Candidates carry their checksum validation but no confidence yet.
    pub fn scan(&self, text: &NormalizedText) -> Vec<ImeiCandidate> {
        let mut candidates = Vec::new();

        for (start, end) in digit_runs(text.as_str()) {
            let raw = &text.as_str()[start..end];
            let digit_count = raw.bytes().filter(u8::is_ascii_digit).count();

            match digit_count {
                IMEI_LENGTH => candidates.push(self.candidate(text, start, end)),
                MIN_ADMISSIBLE_DIGITS | MAX_ADMISSIBLE_DIGITS => {
                    debug!("Discarding near-miss run {:?} ({} digits)", raw, digit_count);
                }
                // One candidate per maximal run at most; longer runs are not IMEIs.
                _ => {}
            }
        }

        trace!("Scanner found {} raw candidates", candidates.len());
        candidates
    }

    fn candidate(&self, text: &NormalizedText, start: usize, end: usize) -> ImeiCandidate {
        let raw_match = text.as_str()[start..end].to_string();
        let clean_digits: String = raw_match.chars().filter(|c| c.is_ascii_digit()).collect();
        let window = ContextWindow::around(text, start, end, self.window_radius);

        ImeiCandidate {
            validation: validate_imei(&clean_digits),
            raw_match,
            clean_digits,
            start,
            end,
            context_window: window.text().to_string(),
            confidence: 0.0,
            signals: Vec::new(),
        }
    }
}

impl Default for CandidateScanner {
    fn default() -> Self {
        Self::new(40)
    }
}

/// Maximal runs of digits joined by short separator gaps, as byte spans.
///
/// Every run starts and ends on a digit.
fn digit_runs(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut runs = Vec::new();
    let mut i = 0;

    while i < n {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut j = i;

        while j < n {
            if bytes[j].is_ascii_digit() {
                j += 1;
                end = j;
            } else if is_run_separator(bytes[j]) {
                let mut k = j;
                while k < n && is_run_separator(bytes[k]) {
                    k += 1;
                }
                if k < n && bytes[k].is_ascii_digit() && k - j <= MAX_SEPARATOR_GAP {
                    j = k;
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        runs.push((start, end));
        i = end;
    }

    runs
}
