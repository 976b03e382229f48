//! OCR text normalization shared by IMEI detection and field extraction.

use std::fmt;

/// OCR text after whitespace collapsing and digit-confusable substitution.
///
/// Offsets reported elsewhere in the crate (candidate spans, context windows)
/// are byte offsets into this text, never into the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
}

impl NormalizedText {
    /// Normalize raw OCR output.
    pub fn new(raw: &str) -> Self {
        let raw = raw.replace("\r\n", "\n").replace('\r', "\n");

        let lines: Vec<String> = raw
            .lines()
            .map(collapse_whitespace)
            .filter(|l| !l.is_empty())
            .map(|l| substitute_confusables(&l))
            .collect();

        Self {
            text: lines.join("\n"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Iterate over the (non-empty, trimmed) lines in source order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Slice of up to `radius` bytes on each side of `start..end`.
    ///
    /// Bounds are widened outwards to the nearest char boundary so the slice
    /// is always valid UTF-8.
    pub fn window(&self, start: usize, end: usize, radius: usize) -> &str {
        let (lo, hi) = self.window_bounds(start, end, radius);
        &self.text[lo..hi]
    }

    /// Byte bounds of [`NormalizedText::window`].
    pub fn window_bounds(&self, start: usize, end: usize, radius: usize) -> (usize, usize) {
        let len = self.text.len();
        let end = end.min(len);
        let start = start.min(end);

        let mut lo = start.saturating_sub(radius);
        while lo > 0 && !self.text.is_char_boundary(lo) {
            lo -= 1;
        }

        let mut hi = (end + radius).min(len);
        while hi < len && !self.text.is_char_boundary(hi) {
            hi += 1;
        }

        (lo, hi)
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Collapse tabs, non-breaking spaces and runs of spaces into single spaces.
fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn digit_for_confusable(c: char) -> Option<char> {
    match c {
        'O' | 'o' => Some('0'),
        'l' | 'I' | '|' => Some('1'),
        _ => None,
    }
}

/// Replace letters OCR commonly confuses with digits, but only inside digit runs.
fn substitute_confusables(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());

    for (i, &c) in chars.iter().enumerate() {
        let replacement = digit_for_confusable(c).filter(|_| {
            let after_digit = out.last().is_some_and(|p| p.is_ascii_digit());
            let before_digit = chars[i + 1..]
                .iter()
                .find(|n| digit_for_confusable(**n).is_none())
                .is_some_and(|n| n.is_ascii_digit());
            after_digit && before_digit
        });

        out.push(replacement.unwrap_or(c));
    }

    out.into_iter().collect()
}
