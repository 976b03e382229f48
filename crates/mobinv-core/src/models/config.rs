//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MobinvError, Result};

/// Main configuration for the mobinv pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MobinvConfig {
    /// IMEI detection configuration.
    pub detection: DetectionConfig,

    /// Invoice field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Whole-invoice processing configuration.
    pub processing: ProcessingConfig,
}

/// IMEI candidate scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Bytes of context taken on each side of a candidate.
    pub window_radius: usize,

    /// Starting confidence before any rule applies.
    pub base_confidence: f32,

    /// Added when the Luhn check passes, subtracted when it fails.
    pub checksum_weight: f32,

    /// Added per distinct positive keyword in the window.
    pub positive_weight: f32,

    /// Upper bound on the summed positive keyword bonus.
    pub positive_cap: f32,

    /// Subtracted per distinct negative keyword in the window.
    pub negative_weight: f32,

    /// Candidates below this confidence are never returned.
    pub min_confidence: f32,

    /// Confidence at which a candidate counts as a genuine IMEI.
    pub suggestion_threshold: f32,

    /// Keywords indicating an IMEI nearby.
    pub positive_keywords: Vec<String>,

    /// Keywords indicating some other identifier nearby.
    pub negative_keywords: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_radius: 40,
            base_confidence: 0.5,
            checksum_weight: 0.3,
            positive_weight: 0.35,
            positive_cap: 0.5,
            negative_weight: 0.4,
            min_confidence: 0.1,
            suggestion_threshold: 0.7,
            positive_keywords: ["imei", "imei1", "imei2", "serial", "device id"]
                .into_iter()
                .map(String::from)
                .collect(),
            negative_keywords: [
                "invoice", "gst", "irn", "ack", "bill no", "phone", "mobile no", "date",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Invoice field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Brand lexicon JSON file; the embedded table is used when unset.
    pub lexicon_path: Option<PathBuf>,

    /// Maximum number of model tokens following a brand.
    pub max_model_tokens: usize,

    /// Largest value accepted as a line-item quantity.
    pub max_quantity: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            lexicon_path: None,
            max_model_tokens: 3,
            max_quantity: 999,
        }
    }
}

/// Whole-invoice processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Minimum normalized text length (in characters) worth processing.
    pub min_text_length: usize,

    /// Minimum confidence for an IMEI to be reported on the invoice.
    pub imei_threshold: f32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            imei_threshold: 0.7,
        }
    }
}

impl MobinvConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would break the confidence invariants.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(MobinvError::Config(format!("{} must be within [0, 1], got {}", name, v)))
            }
        };

        unit("detection.base_confidence", self.detection.base_confidence)?;
        unit("detection.min_confidence", self.detection.min_confidence)?;
        unit("detection.suggestion_threshold", self.detection.suggestion_threshold)?;
        unit("processing.imei_threshold", self.processing.imei_threshold)?;

        if self.extraction.max_model_tokens == 0 {
            return Err(MobinvError::Config(
                "extraction.max_model_tokens must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
