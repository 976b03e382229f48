//! Brand lexicon used to split product descriptions into brand/model/variant.
//!
//! The table is plain data: load it once (embedded default or a JSON file),
//! then share it by reference. Nothing mutates it during extraction.

use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::embedded::DEFAULT_LEXICON;
use crate::error::{MobinvError, Result};

lazy_static! {
    static ref EMBEDDED: BrandLexicon =
        BrandLexicon::from_json(DEFAULT_LEXICON).expect("embedded brand lexicon is valid");
}

/// A handset brand and the tokens that identify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandEntry {
    /// Canonical brand name, as reported on products.
    pub name: String,

    /// Alternative spellings seen on invoices.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Model-line names that imply this brand (e.g. "galaxy" for Samsung).
    #[serde(default)]
    pub model_prefixes: Vec<String>,
}

impl BrandEntry {
    fn matches_name(&self, token: &str) -> bool {
        self.name.eq_ignore_ascii_case(token) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(token))
    }

    /// Whether `token` is one of this brand's model prefixes, optionally glued
    /// to a model number ("iPhone15").
    fn matches_model_prefix(&self, token: &str) -> bool {
        let lower = token.to_ascii_lowercase();
        self.model_prefixes.iter().any(|p| {
            let p = p.to_ascii_lowercase();
            lower == p
                || lower
                    .strip_prefix(p.as_str())
                    .is_some_and(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_digit()))
        })
    }
}

/// Brand and variant vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandLexicon {
    /// Known brands, checked in order.
    pub brands: Vec<BrandEntry>,

    /// Colour words that end a model name.
    #[serde(default)]
    pub colors: Vec<String>,

    /// Network/connectivity tokens ("5g", "lte").
    #[serde(default)]
    pub connectivity: Vec<String>,

    /// Words qualifying a storage size ("ram", "rom").
    #[serde(default)]
    pub storage_words: Vec<String>,
}

impl BrandLexicon {
    /// The lexicon compiled into the library.
    pub fn embedded() -> &'static BrandLexicon {
        &EMBEDDED
    }

    /// Parse a lexicon from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let lexicon: Self = serde_json::from_str(json)?;
        if lexicon.brands.is_empty() {
            return Err(MobinvError::Lexicon("lexicon defines no brands".to_string()));
        }
        if let Some(b) = lexicon.brands.iter().find(|b| b.name.trim().is_empty()) {
            return Err(MobinvError::Lexicon(format!("brand with empty name: {:?}", b)));
        }
        Ok(lexicon)
    }

    /// Load a lexicon from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::from_json(&content)?;
        info!("Loaded {} brands from {}", lexicon.brands.len(), path.display());
        Ok(lexicon)
    }

    /// Brand whose name or alias equals `token` (case-insensitive).
    pub fn brand_for_token(&self, token: &str) -> Option<&BrandEntry> {
        self.brands.iter().find(|b| b.matches_name(token))
    }

    /// Brand implied by a model-prefix token.
    pub fn brand_for_model_prefix(&self, token: &str) -> Option<&BrandEntry> {
        self.brands.iter().find(|b| b.matches_model_prefix(token))
    }

    pub fn is_color(&self, token: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(token))
    }

    pub fn is_connectivity(&self, token: &str) -> bool {
        self.connectivity.iter().any(|c| c.eq_ignore_ascii_case(token))
    }

    pub fn is_storage_word(&self, token: &str) -> bool {
        self.storage_words.iter().any(|c| c.eq_ignore_ascii_case(token))
    }
}
