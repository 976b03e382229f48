//! Product line parsing.
//!
//! A row is read right to left: the numeric columns (quantity, unit, rate,
//! amount) are peeled off the end, and what is left is the description,
//! which the brand lexicon splits into brand, model and variant.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::amounts::parse_amount;
use super::patterns::{
    DECIMAL_TOKEN, IGNORED_COLUMN, NUMERIC_TOKEN, QTY_UNIT_TOKEN, SERIAL_TOKEN, STORAGE_TOKEN,
    SUMMARY_ROW, UNIT_TOKEN,
};
use super::FieldExtractor;
use crate::models::invoice::ProductItem;
use crate::models::lexicon::BrandLexicon;

/// Default number of tokens a model name may span.
pub const DEFAULT_MAX_MODEL_TOKENS: usize = 3;

/// Default upper bound for a quantity column.
pub const DEFAULT_MAX_QUANTITY: u32 = 999;

/// Parses invoice rows into [`ProductItem`]s using a shared brand lexicon.
pub struct ProductLineParser<'a> {
    lexicon: &'a BrandLexicon,
    max_model_tokens: usize,
    max_quantity: Decimal,
}

/// Numeric columns peeled off the end of a row.
#[derive(Debug, Default)]
struct Columns<'t> {
    quantity: Option<&'t str>,
    unit: Option<&'t str>,
    rate: Option<&'t str>,
    amount: Option<&'t str>,
}

impl Columns<'_> {
    fn has_decimal(&self) -> bool {
        [self.quantity, self.rate, self.amount]
            .into_iter()
            .flatten()
            .any(|t| DECIMAL_TOKEN.is_match(t))
    }
}

impl<'a> ProductLineParser<'a> {
    pub fn new(lexicon: &'a BrandLexicon) -> Self {
        Self {
            lexicon,
            max_model_tokens: DEFAULT_MAX_MODEL_TOKENS,
            max_quantity: Decimal::from(DEFAULT_MAX_QUANTITY),
        }
    }

    /// Override the model length and quantity bound.
    pub fn with_limits(mut self, max_model_tokens: usize, max_quantity: u32) -> Self {
        self.max_model_tokens = max_model_tokens.max(1);
        self.max_quantity = Decimal::from(max_quantity);
        self
    }

    /// Parse every product row of `text`, in line order.
    pub fn parse_lines(&self, text: &str) -> Vec<ProductItem> {
        let items: Vec<ProductItem> = text.lines().filter_map(|line| self.parse_line(line)).collect();
        debug!("Parsed {} product lines", items.len());
        items
    }

    /// Parse one row. Returns `None` for rows that are not line items.
    pub fn parse_line(&self, line: &str) -> Option<ProductItem> {
        let line = line.trim();
        if line.is_empty() || SUMMARY_ROW.is_match(line) {
            return None;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (mut description, columns) = self.split_columns(&tokens)?;

        if !columns.has_decimal() {
            trace!("No decimal column: {}", line);
            return None;
        }

        while description.len() > 1 && SERIAL_TOKEN.is_match(description[0]) {
            description.remove(0);
        }
        if !description.iter().any(|t| t.chars().any(char::is_alphabetic)) {
            trace!("No description: {}", line);
            return None;
        }

        let mut item = ProductItem::from_line(line);
        item.quantity = columns.quantity.and_then(parse_amount);
        item.unit = columns.unit.map(str::to_string);
        item.rate = columns.rate.and_then(parse_amount);
        item.amount = columns.amount.and_then(parse_amount);
        self.describe(&mut item, &description);

        Some(item)
    }

    /// Split a row into description tokens and numeric columns.
    fn split_columns<'t>(&self, tokens: &[&'t str]) -> Option<(Vec<&'t str>, Columns<'t>)> {
        let mut columns = Columns::default();
        let mut trailing: Vec<&'t str> = Vec::new();
        let mut anchored = false;
        let mut idx = tokens.len();

        while idx > 0 {
            let token = tokens[idx - 1];

            if IGNORED_COLUMN.is_match(token) {
                idx -= 1;
                continue;
            }

            // The unit column anchors the quantity right before it.
            if let Some(caps) = QTY_UNIT_TOKEN.captures(token) {
                columns.quantity = caps.get(1).map(|m| m.as_str());
                columns.unit = caps.get(2).map(|m| m.as_str());
                idx -= 1;
                anchored = true;
                break;
            }
            if UNIT_TOKEN.is_match(token) {
                columns.unit = Some(token.trim_end_matches('.'));
                idx -= 1;
                if idx > 0 && NUMERIC_TOKEN.is_match(numeric_part(tokens[idx - 1])) {
                    columns.quantity = Some(numeric_part(tokens[idx - 1]));
                    idx -= 1;
                }
                anchored = true;
                break;
            }

            let value = numeric_part(token);
            if !NUMERIC_TOKEN.is_match(value) {
                break;
            }
            trailing.push(value);
            idx -= 1;
        }
        trailing.reverse();

        let mut description = tokens[..idx].to_vec();

        if anchored {
            // Rate follows the unit; the last column is the line amount.
            match trailing.as_slice() {
                [] => {}
                [amount] => columns.amount = Some(*amount),
                [rate, .., amount] => {
                    columns.rate = Some(*rate);
                    columns.amount = Some(*amount);
                }
            }
            if columns.quantity.is_some_and(|q| !self.is_quantity_like(q)) {
                columns.quantity = None;
            }
            return Some((description, columns));
        }

        match trailing.as_slice() {
            [] => return None,
            [amount] => columns.amount = Some(*amount),
            [first, amount] => {
                if self.is_quantity_like(first) && is_plain_number(first) {
                    columns.quantity = Some(*first);
                } else {
                    columns.rate = Some(*first);
                }
                columns.amount = Some(*amount);
            }
            [rest @ .., third, rate, amount] => {
                // Columns left of the last three belong to the description;
                // a third column that is no quantity is dropped.
                description.extend_from_slice(rest);
                if self.is_quantity_like(third) {
                    columns.quantity = Some(*third);
                }
                columns.rate = Some(*rate);
                columns.amount = Some(*amount);
            }
        }

        Some((description, columns))
    }

    /// Fill brand, model and variant from the description tokens.
    fn describe(&self, item: &mut ProductItem, description: &[&str]) {
        let (brand, model_start) = match self.anchor_brand(description) {
            Some((brand, start)) => (Some(brand), start),
            None => (None, 0),
        };
        item.brand = brand;

        let rest = &description[model_start.min(description.len())..];
        let model: Vec<&str> = rest
            .iter()
            .take_while(|t| !self.is_descriptor(t))
            .take(self.max_model_tokens)
            .copied()
            .collect();
        let variant: Vec<String> = rest[model.len()..].iter().map(|t| self.normalize_descriptor(t)).collect();

        if !model.is_empty() {
            item.model = Some(model.join(" "));
        }
        if !variant.is_empty() {
            item.variant = Some(variant.join(" "));
        }
    }

    /// First brand name or alias; failing that, the first model prefix
    /// (which then also starts the model).
    fn anchor_brand(&self, tokens: &[&str]) -> Option<(String, usize)> {
        tokens
            .iter()
            .enumerate()
            .find_map(|(i, t)| self.lexicon.brand_for_token(bare(t)).map(|b| (b.name.clone(), i + 1)))
            .or_else(|| {
                tokens
                    .iter()
                    .enumerate()
                    .find_map(|(i, t)| self.lexicon.brand_for_model_prefix(bare(t)).map(|b| (b.name.clone(), i)))
            })
    }

    /// Storage, colour and connectivity tokens end a model name.
    fn is_descriptor(&self, token: &str) -> bool {
        let token = bare(token);
        STORAGE_TOKEN.is_match(token)
            || self.lexicon.is_color(token)
            || self.lexicon.is_connectivity(token)
            || self.lexicon.is_storage_word(token)
    }

    fn normalize_descriptor(&self, token: &str) -> String {
        let b = bare(token);
        if STORAGE_TOKEN.is_match(b) || self.lexicon.is_connectivity(b) || self.lexicon.is_storage_word(b) {
            token.to_ascii_uppercase()
        } else {
            token.to_string()
        }
    }

    /// A small whole or one-decimal number within the quantity bound.
    fn is_quantity_like(&self, token: &str) -> bool {
        parse_amount(token).is_some_and(|q| {
            q > Decimal::ZERO && q <= self.max_quantity && (q * Decimal::TEN).fract().is_zero()
        })
    }
}

impl FieldExtractor for ProductLineParser<'_> {
    type Output = ProductItem;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        text.lines().find_map(|line| self.parse_line(line))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.parse_lines(text)
    }
}

/// Strip a leading rupee sign from a price column.
fn numeric_part(token: &str) -> &str {
    token.trim_start_matches('₹')
}

/// Token without surrounding brackets and punctuation.
fn bare(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, '(' | ')' | '[' | ']' | ',' | ';'))
}

/// Written without grouping commas or a two-digit fraction ("2", "1.5").
fn is_plain_number(token: &str) -> bool {
    !token.contains(',') && !token.rsplit_once('.').is_some_and(|(_, fraction)| fraction.len() == 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parser() -> ProductLineParser<'static> {
        ProductLineParser::new(BrandLexicon::embedded())
    }

    #[test]
    fn test_redmi_row() {
        let line = "Redmi Note 14 5g Crimson Art 8gb 256gb   1.00 PCS  17,759.00  15,050.00";
        let item = parser().parse_line(line).unwrap();

        assert_eq!(item.brand.as_deref(), Some("Redmi"));
        assert_eq!(item.model.as_deref(), Some("Note 14"));
        assert_eq!(item.variant.as_deref(), Some("5G Crimson Art 8GB 256GB"));
        assert_eq!(item.quantity, Some(dec("1.00")));
        assert_eq!(item.unit.as_deref(), Some("PCS"));
        assert_eq!(item.rate, Some(dec("17759.00")));
        assert_eq!(item.amount, Some(dec("15050.00")));
        assert_eq!(item.raw_line, line.trim());
    }

    #[test]
    fn test_model_prefix_infers_brand() {
        let item = parser().parse_line("iPhone 15 128GB Black 1 79,900.00 79,900.00").unwrap();
        assert_eq!(item.brand.as_deref(), Some("Apple"));
        assert_eq!(item.model.as_deref(), Some("iPhone 15"));
        assert_eq!(item.variant.as_deref(), Some("128GB Black"));
        assert_eq!(item.quantity, Some(dec("1")));
        assert_eq!(item.rate, Some(dec("79900.00")));
    }

    #[test]
    fn test_brand_then_model_prefix() {
        let item = parser()
            .parse_line("2. Samsung Galaxy A15 5G Blue 8GB+128GB 2 Nos 15,499.00 30,998.00")
            .unwrap();
        assert_eq!(item.brand.as_deref(), Some("Samsung"));
        assert_eq!(item.model.as_deref(), Some("Galaxy A15"));
        assert_eq!(item.variant.as_deref(), Some("5G Blue 8GB+128GB"));
        assert_eq!(item.quantity, Some(dec("2")));
        assert_eq!(item.unit.as_deref(), Some("Nos"));
    }

    #[test]
    fn test_two_columns() {
        // Plain small number: quantity.
        let item = parser().parse_line("Vivo Y28 Black 2 27,998.00").unwrap();
        assert_eq!(item.quantity, Some(dec("2")));
        assert_eq!(item.rate, None);
        assert_eq!(item.amount, Some(dec("27998.00")));

        // Two-digit fraction: rate.
        let item = parser().parse_line("Vivo Y28 Black 13,999.00 13,999.00").unwrap();
        assert_eq!(item.quantity, None);
        assert_eq!(item.rate, Some(dec("13999.00")));
    }

    #[test]
    fn test_unbranded_row_keeps_description() {
        let item = parser().parse_line("Tempered Glass 1 PCS 199.00 199.00").unwrap();
        assert_eq!(item.brand, None);
        assert_eq!(item.model.as_deref(), Some("Tempered Glass"));
        assert_eq!(item.amount, Some(dec("199.00")));
    }

    #[test]
    fn test_model_is_capped() {
        let item = parser()
            .with_limits(2, 999)
            .parse_line("OnePlus Nord CE 4 Lite 1 PCS 19,999.00 19,999.00")
            .unwrap();
        assert_eq!(item.model.as_deref(), Some("Nord CE"));
        assert_eq!(item.variant.as_deref(), Some("4 Lite"));
    }

    #[test]
    fn test_non_item_rows() {
        let p = parser();
        assert!(p.parse_line("Sub Total 12,754.24").is_none());
        assert!(p.parse_line("CGST 9% 1,147.88").is_none());
        assert!(p.parse_line("IMEI1: 490154203237518").is_none());
        assert!(p.parse_line("Shop No 12, MG Road, Pune 411001").is_none());
        assert!(p.parse_line("1.00 PCS 17,759.00").is_none());
        assert!(p.parse_line("").is_none());
    }

    #[test]
    fn test_parse_lines_keeps_order() {
        let text = "Sold By: Mobile World\n\
                    Redmi 13C 1 PCS 8,999.00 8,999.00\n\
                    Realme Narzo 70 5G 1 PCS 12,999.00 12,999.00\n\
                    Grand Total 21,998.00";
        let items = parser().extract_all(text);
        let names: Vec<String> = items.iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["Redmi 13C", "Realme Narzo 70"]);
    }
}
