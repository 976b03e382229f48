//! Invoice data models produced by field extraction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProcessingErrorKind;

/// Number of header fields counted towards [`InvoiceData::confidence`].
pub const HEADER_FIELD_COUNT: usize = 5;

/// Header fields of a retail invoice.
///
/// Fields that could not be matched are left empty, never guessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceData {
    /// Invoice/bill number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Invoice date as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Invoice date, when the printed value is a real calendar date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_date: Option<NaiveDate>,

    /// Seller (shop or distributor) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    /// Seller GST identification number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_gstin: Option<String>,

    /// Buyer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Buyer phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,

    /// Invoice grand total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// Share of the header fields that were matched (0.0 - 1.0).
    pub confidence: f32,
}

impl InvoiceData {
    /// How many of the scored header fields are present.
    pub fn matched_field_count(&self) -> usize {
        [
            self.invoice_number.is_some(),
            self.date.is_some(),
            self.vendor_name.is_some(),
            self.customer_name.is_some(),
            self.total_amount.is_some(),
        ]
        .iter()
        .filter(|&&present| present)
        .count()
    }

    /// Recompute `confidence` from the matched fields.
    pub fn update_confidence(&mut self) {
        self.confidence = self.matched_field_count() as f32 / HEADER_FIELD_COUNT as f32;
    }

    /// Names of scored header fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_number.is_none() {
            missing.push("invoice_number");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.vendor_name.is_none() {
            missing.push("vendor_name");
        }
        if self.customer_name.is_none() {
            missing.push("customer_name");
        }
        if self.total_amount.is_none() {
            missing.push("total_amount");
        }
        missing
    }
}

/// One product row from the invoice body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    /// Brand from the lexicon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Model name following the brand (e.g. "Note 14").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Remaining descriptors: storage, colour, connectivity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    /// Unit of measure as printed (e.g. "PCS").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,

    /// Line amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// The source line.
    pub raw_line: String,
}

impl ProductItem {
    /// An item with only its source line set.
    pub fn from_line(raw_line: impl Into<String>) -> Self {
        Self {
            brand: None,
            model: None,
            variant: None,
            quantity: None,
            unit: None,
            rate: None,
            amount: None,
            raw_line: raw_line.into(),
        }
    }

    /// Brand and model joined for display ("Redmi Note 14").
    pub fn display_name(&self) -> String {
        [self.brand.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Terminal output of processing one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvoiceProcessingResult {
    /// Something recognizable was extracted.
    Success {
        invoice: InvoiceData,
        products: Vec<ProductItem>,
        /// Unique validated IMEIs, in order of appearance.
        imeis: Vec<String>,
    },
    /// Nothing usable was found.
    Error {
        message: String,
        kind: ProcessingErrorKind,
    },
}

impl InvoiceProcessingResult {
    pub fn error(kind: ProcessingErrorKind, message: impl Into<String>) -> Self {
        InvoiceProcessingResult::Error {
            message: message.into(),
            kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvoiceProcessingResult::Success { .. })
    }

    /// The error kind, if this is an error.
    pub fn error_kind(&self) -> Option<ProcessingErrorKind> {
        match self {
            InvoiceProcessingResult::Error { kind, .. } => Some(*kind),
            InvoiceProcessingResult::Success { .. } => None,
        }
    }

    /// Validation issues worth showing next to a successful result.
    pub fn warnings(&self) -> Vec<String> {
        let InvoiceProcessingResult::Success { invoice, products, .. } = self else {
            return Vec::new();
        };

        let mut warnings: Vec<String> = invoice
            .missing_fields()
            .into_iter()
            .map(|f| format!("Could not extract {}", f))
            .collect();

        if products.is_empty() {
            warnings.push("No product lines".to_string());
        }

        // Line amounts should add up to the printed total when both exist.
        if let Some(total) = invoice.total_amount {
            let amounts: Vec<Decimal> = products.iter().filter_map(|p| p.amount).collect();
            if !amounts.is_empty() && amounts.len() == products.len() {
                let sum: Decimal = amounts.iter().sum();
                if (sum - total).abs() > Decimal::ONE {
                    warnings.push(format!(
                        "Product amounts ({}) differ from invoice total ({})",
                        sum, total
                    ));
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_confidence_is_field_ratio() {
        let mut invoice = InvoiceData {
            invoice_number: Some("INV-1".to_string()),
            total_amount: Some(Decimal::new(1505000, 2)),
            ..Default::default()
        };
        invoice.update_confidence();
        assert_eq!(invoice.confidence, 0.4);
        assert_eq!(invoice.missing_fields(), vec!["date", "vendor_name", "customer_name"]);
    }

    #[test]
    fn test_supplementary_fields_do_not_count() {
        let mut invoice = InvoiceData {
            vendor_gstin: Some("27AAPFU0939F1ZV".to_string()),
            customer_phone: Some("9876543210".to_string()),
            ..Default::default()
        };
        invoice.update_confidence();
        assert_eq!(invoice.confidence, 0.0);
    }

    #[test]
    fn test_display_name() {
        let mut item = ProductItem::from_line("Redmi Note 14");
        item.brand = Some("Redmi".to_string());
        item.model = Some("Note 14".to_string());
        assert_eq!(item.display_name(), "Redmi Note 14");
    }

    #[test]
    fn test_result_serializes_tagged() {
        let result = InvoiceProcessingResult::error(ProcessingErrorKind::InsufficientText, "empty");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "insufficient_text");
    }

    #[test]
    fn test_total_mismatch_warning() {
        let mut item = ProductItem::from_line("x");
        item.amount = Some(Decimal::new(100, 0));
        let result = InvoiceProcessingResult::Success {
            invoice: InvoiceData {
                total_amount: Some(Decimal::new(250, 0)),
                ..Default::default()
            },
            products: vec![item],
            imeis: Vec::new(),
        };
        assert!(result.warnings().iter().any(|w| w.contains("differ")));
    }
}
