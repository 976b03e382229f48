//! Common regex patterns for mobile-shop invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number, e.g. "Invoice No: RM/24-25/0153", "Bill No. 4521"
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:invoice|inv|bill)\.?\s*(?:no\b|number\b|num\b|#)\.?\s*[:.#\-]?\s*([A-Za-z0-9][A-Za-z0-9/\-_]*)"
    ).unwrap();

    // Labeled dates
    pub static ref LABELED_DATE: Regex = Regex::new(
        r"(?i)\b(?:invoice\s+date|bill\s+date|dated|date)\b\s*[:.\-]?\s*(\d{1,2}[-/.\s][A-Za-z]{3,9}[-/.,\s]\s?\d{2,4}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}|\d{4}[-/.]\d{1,2}[-/.]\d{1,2})"
    ).unwrap();

    pub static ref DATE_DMONY: Regex = Regex::new(
        r"\b(\d{1,2})[-/.\s]([A-Za-z]{3,9})[-/.,\s]\s?(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    // Numeric token with a decimal fraction ("1.00", "17,759.00")
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"^(?:\d{1,3}(?:,\d{2,3})+|\d+)[.,]\d{1,2}$"
    ).unwrap();

    // Whole numeric token, optionally with a fraction and grouping commas
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"^(?:\d{1,3}(?:,\d{2,3})+|\d+)(?:[.,]\d{1,2})?$"
    ).unwrap();

    // Totals, strongest label first
    pub static ref GRAND_TOTAL: Regex = Regex::new(
        r"(?i)\bgrand\s+total\b[^\d\n]{0,20}(\d[\d,]*(?:\.\d{1,2})?)"
    ).unwrap();

    pub static ref NET_TOTAL: Regex = Regex::new(
        r"(?i)\b(?:net\s+amount|amount\s+payable|total\s+amount|invoice\s+total|net\s+payable)\b[^\d\n]{0,20}(\d[\d,]*(?:\.\d{1,2})?)"
    ).unwrap();

    pub static ref PLAIN_TOTAL: Regex = Regex::new(
        r"(?i)\b(sub\s*)?total\b[^\d\n]{0,20}(\d[\d,]*\.\d{1,2})"
    ).unwrap();

    // Indian GST identification number: 2-digit state, PAN, entity, 'Z', check
    pub static ref GSTIN: Regex = Regex::new(
        r"\b(\d{2}[A-Z]{5}\d{4}[A-Z][1-9A-Z]Z[0-9A-Z])\b"
    ).unwrap();

    pub static ref GSTIN_LABEL: Regex = Regex::new(
        r"(?i)\b(?:gstin|gst\s*no|gst\s*in|gst)\b\s*(?:/\s*uin)?\s*[:.\-]?\s*"
    ).unwrap();

    // Party sections
    pub static ref VENDOR_SECTION: Regex = Regex::new(
        r"(?i)\b(?:sold\s+by|seller|supplier)\b\s*[:.\-]?\s*"
    ).unwrap();

    pub static ref CUSTOMER_SECTION: Regex = Regex::new(
        r"(?i)\b(?:bill(?:ed)?\s+to|buyer|ship(?:ped)?\s+to|customer(?:\s+details)?|consignee)\b\s*[:.\-]?\s*"
    ).unwrap();

    pub static ref CUSTOMER_NAME_LABEL: Regex = Regex::new(
        r"(?i)^(?:customer\s+name|name|m/s\.?)\s*[:.\-]?\s*(.+)$"
    ).unwrap();

    pub static ref COMPANY_MARKER: Regex = Regex::new(
        r"(?i)\b(?:pvt|private|ltd|limited|llp)\b"
    ).unwrap();

    // Indian mobile number, optionally +91
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+91[\s\-]?)?\b([6-9]\d{4}[\s\-]?\d{5})\b"
    ).unwrap();

    pub static ref PHONE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:ph|phone|mob|mobile|contact|cell)\b\.?\s*(?:no)?\.?\s*[:.\-]?"
    ).unwrap();

    // Rows that summarize rather than describe a product
    pub static ref SUMMARY_ROW: Regex = Regex::new(
        r"(?i)\b(?:total|sub\s*total|subtotal|grand|tax|taxable|cgst|sgst|igst|utgst|gst|cess|discount|round(?:ed)?\s*off|balance|received|paid|amount\s+in\s+words|rupees|invoice|bill|date|hsn\s+summary)\b"
    ).unwrap();

    // Unit of measure column ("PCS", "Nos.")
    pub static ref UNIT_TOKEN: Regex = Regex::new(
        r"(?i)^(?:pcs|pc|nos|no|units?|qty|sets?)\.?$"
    ).unwrap();

    // Quantity glued to its unit ("1PCS", "2.00Nos")
    pub static ref QTY_UNIT_TOKEN: Regex = Regex::new(
        r"(?i)^(\d{1,4}(?:\.\d{1,2})?)(pcs|pc|nos|units?|sets?)\.?$"
    ).unwrap();

    // Leading row number ("1", "2.", "3)")
    pub static ref SERIAL_TOKEN: Regex = Regex::new(
        r"^\d{1,3}[.)]?$"
    ).unwrap();

    // Columns without a value of their own: currency marks and tax rates
    pub static ref IGNORED_COLUMN: Regex = Regex::new(
        r"(?i)^(?:rs\.?|inr|₹|\d{1,2}(?:\.\d{1,2})?%)$"
    ).unwrap();

    // Storage sizes: "256gb", "8GB+128GB", "8/256gb", "1tb"
    pub static ref STORAGE_TOKEN: Regex = Regex::new(
        r"(?i)^(?:\d{1,4}(?:\.\d)?(?:gb|tb|mb)(?:[+/]\d{1,4}(?:gb|tb|mb)?)?|\d{1,2}(?:gb)?[+/]\d{1,4}(?:gb|tb))$"
    ).unwrap();
}
