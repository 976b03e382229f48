//! Subcommands and the input/config loading they share.

pub mod batch;
pub mod config;
pub mod imei;
pub mod process;
pub mod validate;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use mobinv_core::{BrandLexicon, MobinvConfig, OcrDocument};

/// Load configuration from an explicit path, else from the user config file
/// when it exists, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<MobinvConfig> {
    let path = match path {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = config::default_config_path();
            if !default_path.exists() {
                return Ok(MobinvConfig::default());
            }
            default_path
        }
    };

    debug!("Loading config from {}", path.display());
    MobinvConfig::from_file(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// The configured brand lexicon, or the embedded one.
pub fn load_lexicon(config: &MobinvConfig) -> anyhow::Result<BrandLexicon> {
    match &config.extraction.lexicon_path {
        Some(path) => BrandLexicon::from_file(path)
            .with_context(|| format!("Failed to load brand lexicon from {}", path.display())),
        None => Ok(BrandLexicon::embedded().clone()),
    }
}

/// Read an input file: plain OCR text, or OCR engine output as JSON
/// (`{"text": ..., "boxes": [...]}`).
pub fn read_document(path: &Path) -> anyhow::Result<OcrDocument> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not OCR output JSON", path.display()))
    } else {
        Ok(OcrDocument::from_text(content))
    }
}

/// Input files the batch command picks up.
pub fn is_supported_input(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "txt" | "text" | "json")
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
