// siftlock-core/src/config.rs
//! Configuration for the scanner, PII detection, egress gate and extraction
//! bound.
//!
//! Defaults are embedded in code; an optional YAML file can override any
//! subset of fields. Loading validates thresholds so a bad override fails at
//! startup rather than silently weakening a gate.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the secret pattern scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Rules below this confidence are skipped (default 0.7).
    pub min_confidence: f64,
    /// Shannon entropy (bits/char) above which a token is flagged.
    pub entropy_threshold: f64,
    /// Tokens shorter than this are never entropy-scanned.
    pub min_token_length: usize,
    /// Confidence class assigned to the entropy detector as a whole; the
    /// entropy pass only runs when this clears the caller threshold.
    pub entropy_confidence_floor: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            entropy_threshold: 4.5,
            min_token_length: 16,
            entropy_confidence_floor: 0.6,
        }
    }
}

/// Tunables for the external PII detection capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiiConfig {
    /// Detections scoring below this are dropped (default 0.5).
    pub score_threshold: f64,
}

impl Default for PiiConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
        }
    }
}

/// Tunables for the LLM egress gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Shortest normalized substring worth fingerprinting (default 20).
    pub min_substring_len: usize,
    /// A window stops growing once it exceeds this many chars (default 100).
    pub max_window_len: usize,
    /// Longest freeform text allowed in content/text/message payload fields.
    pub max_freeform_text: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_substring_len: 20,
            max_window_len: 100,
            max_freeform_text: 2000,
        }
    }
}

/// Bound on the sandboxed extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Seconds before an extraction is treated as failed (default 30).
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Top-level configuration for a pipeline instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scanner: ScannerConfig,
    pub pii: PiiConfig,
    pub gate: GateConfig,
    pub extraction: ExtractionConfig,
}

impl ScanConfig {
    /// Loads overrides from a YAML file on top of the embedded defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration overrides from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ScanConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Rejects out-of-range thresholds.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.scanner.min_confidence) {
            errors.push(format!(
                "scanner.min_confidence must be within 0.0..=1.0, got {}",
                self.scanner.min_confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.scanner.entropy_confidence_floor) {
            errors.push(format!(
                "scanner.entropy_confidence_floor must be within 0.0..=1.0, got {}",
                self.scanner.entropy_confidence_floor
            ));
        }
        if self.scanner.entropy_threshold <= 0.0 {
            errors.push("scanner.entropy_threshold must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.pii.score_threshold) {
            errors.push(format!(
                "pii.score_threshold must be within 0.0..=1.0, got {}",
                self.pii.score_threshold
            ));
        }
        if self.gate.min_substring_len == 0 {
            errors.push("gate.min_substring_len must be at least 1".to_string());
        }
        if self.gate.max_window_len < self.gate.min_substring_len {
            errors.push(format!(
                "gate.max_window_len ({}) must not be below gate.min_substring_len ({})",
                self.gate.max_window_len, self.gate.min_substring_len
            ));
        }
        if self.extraction.timeout_secs == 0 {
            errors.push("extraction.timeout_secs must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Config validation failed:\n{}", errors.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        ScanConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_thresholds() {
        let config = ScanConfig::default();
        assert_eq!(config.scanner.min_confidence, 0.7);
        assert_eq!(config.scanner.entropy_threshold, 4.5);
        assert_eq!(config.scanner.min_token_length, 16);
        assert_eq!(config.gate.min_substring_len, 20);
        assert_eq!(config.gate.max_freeform_text, 2000);
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let mut config = ScanConfig::default();
        config.scanner.min_confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_below_substring_floor_rejected() {
        let mut config = ScanConfig::default();
        config.gate.max_window_len = 10;
        assert!(config.validate().is_err());
    }
}
