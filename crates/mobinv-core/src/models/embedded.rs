//! Embedded reference data for standalone use.
//!
//! The default brand lexicon is compiled into the binary so extraction works
//! without any data files. A different table can be loaded at startup.

/// Embedded default brand lexicon (JSON).
pub static DEFAULT_LEXICON: &str = include_str!("../../data/brand_lexicon.json");
