// siftlock-core/src/pii.rs
//! The external PII detection seam.
//!
//! `PiiDetector` is the contract for the statistical/rule-based capability
//! the pipeline consumes as a black box: given text and a score threshold,
//! return identity/financial/contact entities. The core never depends on an
//! implementation's internals; any detector satisfying the trait plugs in.
//!
//! `PatternPiiDetector` is the built-in implementation so the pipeline works
//! out of the box and tests run hermetically. It covers the common contact
//! and financial classes with regexes plus programmatic validation.
//!
//! License: MIT OR Apache-2.0

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

use crate::entity::{log_entity_debug, DetectedEntity, EntitySource};
use crate::validators;

/// Contract for a pluggable PII detection capability.
pub trait PiiDetector: Send + Sync {
    /// Returns entities scoring at or above `score_threshold`, with spans
    /// into `text` and the captured substring attached.
    fn detect(&self, text: &str, score_threshold: f64) -> Result<Vec<DetectedEntity>>;
}

struct PiiRule {
    entity_type: &'static str,
    pattern: &'static str,
    score: f64,
    /// Structural check applied to the matched text, if any.
    validator: Option<fn(&str) -> bool>,
}

const PII_RULES: &[PiiRule] = &[
    PiiRule {
        entity_type: "EMAIL_ADDRESS",
        pattern: r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[A-Za-z]{2,}",
        score: 0.85,
        validator: None,
    },
    PiiRule {
        entity_type: "PHONE_NUMBER",
        pattern: r"\b(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b",
        score: 0.6,
        validator: None,
    },
    PiiRule {
        entity_type: "US_SSN",
        pattern: r"\b\d{3}-\d{2}-\d{4}\b",
        score: 0.85,
        validator: Some(validators::is_valid_ssn),
    },
    PiiRule {
        entity_type: "CREDIT_CARD",
        pattern: r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b",
        score: 0.7,
        validator: Some(validators::is_valid_credit_card),
    },
];

lazy_static! {
    static ref COMPILED_PII_RULES: Vec<(&'static PiiRule, Regex)> = PII_RULES
        .iter()
        .map(|rule| {
            let regex = Regex::new(rule.pattern)
                .unwrap_or_else(|e| panic!("invalid PII rule '{}': {}", rule.entity_type, e));
            (rule, regex)
        })
        .collect();
}

/// Built-in regex + checksum PII detector.
#[derive(Debug, Default)]
pub struct PatternPiiDetector;

impl PatternPiiDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PiiDetector for PatternPiiDetector {
    fn detect(&self, text: &str, score_threshold: f64) -> Result<Vec<DetectedEntity>> {
        let mut entities = Vec::new();
        for (rule, regex) in COMPILED_PII_RULES.iter() {
            if rule.score < score_threshold {
                continue;
            }
            for m in regex.find_iter(text) {
                if let Some(validate) = rule.validator {
                    if !validate(m.as_str()) {
                        continue;
                    }
                }
                log_entity_debug(module_path!(), rule.entity_type, m.as_str());
                entities.push(DetectedEntity {
                    entity_type: rule.entity_type.to_string(),
                    source: EntitySource::Pii,
                    start: m.start(),
                    end: m.end(),
                    confidence: rule.score,
                    original_text: m.as_str().to_string(),
                    placeholder: String::new(),
                });
            }
        }
        entities.sort_by_key(|e| e.start);
        Ok(entities)
    }
}
