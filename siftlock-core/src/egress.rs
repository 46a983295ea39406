// siftlock-core/src/egress.rs
//! LLM egress gate.
//!
//! Fingerprints registered sensitive content (exact hashes, normalized
//! substrings, redaction placeholders) and rejects outbound payloads that
//! reproduce it. Detection is exact-text containment: paraphrase,
//! re-encoding and homoglyphs are a documented boundary of the design, not
//! a gap to close here.
//!
//! Every decision is a pure function of the current registry state, so any
//! rejection can be replayed and audited.
//!
//! License: MIT OR Apache-2.0

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::config::GateConfig;
use crate::entity::{clip_detail, content_hash, RedactionMap};

lazy_static! {
    /// Catches placeholder-shaped tokens even when never registered.
    static ref GENERIC_PLACEHOLDER_RE: Regex = Regex::new(r"\[[A-Z_]+_\d+\]").unwrap();
}

/// Classes of egress violation, serialized in snake_case for API payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DocumentHashMatch,
    DocumentSubstringMatch,
    RedactionPlaceholderDetected,
    FreeformTextTooLarge,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ViolationKind::DocumentHashMatch => "document_hash_match",
            ViolationKind::DocumentSubstringMatch => "document_substring_match",
            ViolationKind::RedactionPlaceholderDetected => "redaction_placeholder_detected",
            ViolationKind::FreeformTextTooLarge => "freeform_text_too_large",
        };
        write!(f, "{}", s)
    }
}

/// One detected violation. `detail` is bounded and truncated; it never
/// echoes the full offending sensitive value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateViolation {
    pub kind: ViolationKind,
    pub detail: String,
}

/// Outcome of validating one payload: allowed, or the first violation found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateDecision {
    pub allowed: bool,
    pub violation: Option<GateViolation>,
}

impl GateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            violation: None,
        }
    }

    fn block(violation: GateViolation) -> Self {
        Self {
            allowed: false,
            violation: Some(violation),
        }
    }
}

/// Registry sizes, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub document_hashes: usize,
    pub document_substrings: usize,
    pub redaction_placeholders: usize,
}

/// Process-scoped fingerprint state. Grows only via explicit registration;
/// cleared only by explicit `reset`. Append-mostly and shared across
/// documents, with no per-id ownership.
#[derive(Debug, Default)]
pub struct FingerprintRegistry {
    config: GateConfig,
    hashes: Mutex<HashSet<String>>,
    substrings: Mutex<HashSet<String>>,
    placeholders: Mutex<HashSet<String>>,
}

impl FingerprintRegistry {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Normalized word-window substrings of `text`: whitespace runs
    /// collapsed, every window of consecutive words whose joined length
    /// reaches `min_substring_len` characters, lowercased. A given start
    /// index stops extending once its window exceeds `max_window_len`,
    /// bounding the quadratic blow-up while still covering short and
    /// medium phrases.
    fn extract_substrings(&self, text: &str) -> HashSet<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut substrings = HashSet::new();
        for i in 0..words.len() {
            let mut window = String::new();
            let mut window_chars = 0usize;
            for word in &words[i..] {
                if !window.is_empty() {
                    window.push(' ');
                    window_chars += 1;
                }
                window.push_str(word);
                window_chars += word.chars().count();
                if window_chars >= self.config.min_substring_len {
                    substrings.insert(window.to_lowercase());
                    if window_chars > self.config.max_window_len {
                        break;
                    }
                }
            }
        }
        substrings
    }

    /// Registers document text for leak tracking; no-op on blank text.
    pub fn register_document_content(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.hashes
            .lock()
            .expect("hashes lock poisoned")
            .insert(content_hash(text));
        let extracted = self.extract_substrings(text);
        debug!(
            "registered document content: {} substring fingerprints",
            extracted.len()
        );
        self.substrings
            .lock()
            .expect("substrings lock poisoned")
            .extend(extracted);
    }

    /// Tracks a redaction placeholder token (e.g. `[EMAIL_ADDRESS_1]`).
    pub fn register_redaction_placeholder(&self, placeholder: &str) {
        if placeholder.is_empty() {
            return;
        }
        self.placeholders
            .lock()
            .expect("placeholders lock poisoned")
            .insert(placeholder.to_string());
    }

    /// Registers everything leak-checkable from a redaction map: the
    /// original text, every placeholder, and each entity value of at least
    /// 8 chars as a trackable substring — individual PII/secret values stay
    /// detectable even below the general substring floor.
    pub fn register_from_redaction_map(&self, map: &RedactionMap) {
        self.register_document_content(&map.original_text);
        let mut substrings = self.substrings.lock().expect("substrings lock poisoned");
        for entity in &map.entities {
            if !entity.placeholder.is_empty() {
                self.placeholders
                    .lock()
                    .expect("placeholders lock poisoned")
                    .insert(entity.placeholder.clone());
            }
            if entity.original_text.chars().count() >= 8 {
                substrings.insert(entity.original_text.to_lowercase());
            }
        }
    }

    /// Validates an arbitrary nested payload destined for a generative
    /// capability. Walks maps/lists/scalars recursively, inspecting every
    /// string leaf; the first violation found wins (iteration order over
    /// the substring set is unspecified, so which violation is reported
    /// first when several match is non-deterministic).
    pub fn validate_payload(&self, payload: &Value) -> GateDecision {
        let hashes = self.hashes.lock().expect("hashes lock poisoned");
        let substrings = self.substrings.lock().expect("substrings lock poisoned");
        let placeholders = self.placeholders.lock().expect("placeholders lock poisoned");

        match self.check_value(payload, "", &hashes, &substrings, &placeholders) {
            Some(violation) => GateDecision::block(violation),
            None => GateDecision::allow(),
        }
    }

    /// Validates a single text field under the given path label.
    pub fn validate_text(&self, text: &str, context: &str) -> GateDecision {
        self.validate_payload(&serde_json::json!({ context: text }))
    }

    fn check_value(
        &self,
        val: &Value,
        path: &str,
        hashes: &HashSet<String>,
        substrings: &HashSet<String>,
        placeholders: &HashSet<String>,
    ) -> Option<GateViolation> {
        match val {
            Value::String(s) => self.check_string(s, path, hashes, substrings, placeholders),
            Value::Object(map) => map.iter().find_map(|(k, v)| {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", path, k)
                };
                self.check_value(v, &child, hashes, substrings, placeholders)
            }),
            Value::Array(items) => items.iter().enumerate().find_map(|(i, item)| {
                self.check_value(item, &format!("{}[{}]", path, i), hashes, substrings, placeholders)
            }),
            // Numbers, booleans and nulls are never inspected.
            _ => None,
        }
    }

    fn check_string(
        &self,
        s: &str,
        path: &str,
        hashes: &HashSet<String>,
        substrings: &HashSet<String>,
        placeholders: &HashSet<String>,
    ) -> Option<GateViolation> {
        if hashes.contains(&content_hash(s)) {
            return Some(GateViolation {
                kind: ViolationKind::DocumentHashMatch,
                detail: format!("payload at '{}' matches registered document content", path),
            });
        }

        let lower = s.to_lowercase();
        if let Some(matched) = substrings.iter().find(|sub| lower.contains(sub.as_str())) {
            return Some(GateViolation {
                kind: ViolationKind::DocumentSubstringMatch,
                detail: format!(
                    "payload at '{}' contains document text: '{}'",
                    path,
                    clip_detail(matched, 50)
                ),
            });
        }

        let placeholder_hit = placeholders
            .iter()
            .find(|p| s.contains(p.as_str()))
            .map(|p| p.to_string())
            .or_else(|| {
                GENERIC_PLACEHOLDER_RE
                    .find(s)
                    .map(|m| m.as_str().to_string())
            });
        if let Some(token) = placeholder_hit {
            return Some(GateViolation {
                kind: ViolationKind::RedactionPlaceholderDetected,
                detail: format!(
                    "payload at '{}' contains redaction placeholder: {}",
                    path, token
                ),
            });
        }

        if !path.is_empty() {
            let path_lower = path.to_lowercase();
            let freeform_field = path_lower.contains("content")
                || path_lower.contains("text")
                || path_lower.contains("message");
            if freeform_field {
                let char_count = s.chars().count();
                if char_count > self.config.max_freeform_text {
                    return Some(GateViolation {
                        kind: ViolationKind::FreeformTextTooLarge,
                        detail: format!(
                            "payload at '{}' exceeds max freeform text size ({} > {})",
                            path, char_count, self.config.max_freeform_text
                        ),
                    });
                }
            }
        }

        None
    }

    /// Clears every fingerprint. Explicit-only, mainly for tests and
    /// instance teardown.
    pub fn reset(&self) {
        self.hashes.lock().expect("hashes lock poisoned").clear();
        self.substrings
            .lock()
            .expect("substrings lock poisoned")
            .clear();
        self.placeholders
            .lock()
            .expect("placeholders lock poisoned")
            .clear();
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            document_hashes: self.hashes.lock().expect("hashes lock poisoned").len(),
            document_substrings: self
                .substrings
                .lock()
                .expect("substrings lock poisoned")
                .len(),
            redaction_placeholders: self
                .placeholders
                .lock()
                .expect("placeholders lock poisoned")
                .len(),
        }
    }
}
