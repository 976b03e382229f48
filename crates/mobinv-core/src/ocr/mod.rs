//! OCR input boundary.
//!
//! Text recognition runs outside this crate. An engine hands over either the
//! plain text or its recognized boxes; boxes are ordered into lines here and
//! otherwise carried through untouched.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Boxes whose tops fall in the same band of this many pixels share a line.
const ROW_BAND_PX: f32 = 20.0;

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    #[serde(default)]
    pub score: f32,
}

impl TextBox {
    pub fn new(bbox: [f32; 8], text: impl Into<String>, score: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            score,
        }
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    fn row(&self) -> i32 {
        let (_, min_y, _, _) = self.rect();
        (min_y / ROW_BAND_PX) as i32
    }
}

/// OCR output for one invoice image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    /// Full text, one line per row of boxes.
    #[serde(default)]
    pub text: String,

    /// Recognized boxes, if the engine reported them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boxes: Vec<TextBox>,
}

impl OcrDocument {
    /// The text to process: `text` as given, or the boxes in reading order
    /// when the engine reported boxes only.
    pub fn reading_text(&self) -> Cow<'_, str> {
        if self.text.trim().is_empty() && !self.boxes.is_empty() {
            Cow::Owned(Self::from_boxes(self.boxes.clone()).text)
        } else {
            Cow::Borrowed(&self.text)
        }
    }

    /// A document from plain text only.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            boxes: Vec::new(),
        }
    }

    /// A document from boxes; the text is rebuilt in reading order.
    pub fn from_boxes(boxes: Vec<TextBox>) -> Self {
        let mut document = Self {
            text: String::new(),
            boxes,
        };
        document.sort_by_reading_order();
        document
    }

    /// Sort boxes top-to-bottom, left-to-right and rebuild `text`, joining
    /// boxes on the same row with a space.
    pub fn sort_by_reading_order(&mut self) {
        if self.boxes.is_empty() {
            return;
        }

        self.boxes.sort_by(|a, b| {
            a.row().cmp(&b.row()).then_with(|| {
                let (ax, _, _, _) = a.rect();
                let (bx, _, _, _) = b.rect();
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        let mut lines: Vec<String> = Vec::new();
        let mut current_row = None;
        for text_box in &self.boxes {
            let row = text_box.row();
            match lines.last_mut() {
                Some(line) if current_row == Some(row) => {
                    line.push(' ');
                    line.push_str(&text_box.text);
                }
                _ => lines.push(text_box.text.clone()),
            }
            current_row = Some(row);
        }

        self.text = lines.join("\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox::new([x, y, x + 50.0, y, x + 50.0, y + 12.0, x, y + 12.0], text, 0.9)
    }

    #[test]
    fn test_rect_and_center() {
        let b = text_box(10.0, 40.0, "IMEI");
        assert_eq!(b.rect(), (10.0, 40.0, 60.0, 52.0));
        assert_eq!(b.center(), (35.0, 46.0));
    }

    #[test]
    fn test_reading_order_joins_rows() {
        let document = OcrDocument::from_boxes(vec![
            text_box(200.0, 45.0, "17,759.00"),
            text_box(10.0, 5.0, "Sold By: Mobile World"),
            text_box(10.0, 42.0, "Redmi Note 14"),
            text_box(120.0, 44.0, "1.00 PCS"),
        ]);

        assert_eq!(document.text, "Sold By: Mobile World\nRedmi Note 14 1.00 PCS 17,759.00");
        assert_eq!(document.boxes[0].text, "Sold By: Mobile World");
    }

    #[test]
    fn test_reading_text_prefers_given_text() {
        let boxes = vec![text_box(10.0, 40.0, "Grand Total 9,999.00"), text_box(10.0, 0.0, "Invoice No: 7")];

        let box_only = OcrDocument {
            text: " \n".to_string(),
            boxes: boxes.clone(),
        };
        assert_eq!(box_only.reading_text(), "Invoice No: 7\nGrand Total 9,999.00");

        let with_text = OcrDocument {
            text: "IMEI 490154203237518".to_string(),
            boxes,
        };
        assert_eq!(with_text.reading_text(), "IMEI 490154203237518");
    }

    #[test]
    fn test_from_text_has_no_boxes() {
        let document = OcrDocument::from_text("IMEI 490154203237518");
        assert!(document.boxes.is_empty());
        assert_eq!(document.text, "IMEI 490154203237518");
    }
}
