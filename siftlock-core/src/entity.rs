// siftlock-core/src/entity.rs
//! Shared data model for detected entities and redaction maps, plus the
//! helpers that keep sensitive values out of logs and error details.
//!
//! License: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

lazy_static! {
    /// Initialized once to determine whether raw sensitive values may appear
    /// in debug logs. Off unless explicitly enabled via the environment.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("SIFTLOCK_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// Which detection capability produced an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitySource {
    Pii,
    Secret,
}

impl std::fmt::Display for EntitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntitySource::Pii => write!(f, "pii"),
            EntitySource::Secret => write!(f, "secret"),
        }
    }
}

/// A single sensitive span found in the unredacted text.
///
/// `start`/`end` are byte offsets into the *original* text, end exclusive,
/// always relative to the unredacted coordinate space. `placeholder` stays
/// empty until placeholder assignment runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    pub entity_type: String,
    pub source: EntitySource,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub original_text: String,
    #[serde(default)]
    pub placeholder: String,
}

/// The sanitized view of one document.
///
/// Invariant: substituting each entity's placeholder into `original_text` at
/// its span yields `redacted_text`, and the inverse substitution restores
/// `original_text`, given unique placeholders. `original_text` is sensitive
/// and ephemeral-only; `redacted_text` is safe for display and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionMap {
    pub original_text: String,
    pub redacted_text: String,
    /// Sorted ascending by `start` after merge.
    pub entities: Vec<DetectedEntity>,
    pub created_at: DateTime<Utc>,
}

/// SHA-256 hex digest of a text, used for upload hashes and egress
/// fingerprints.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Replaces a sensitive value with a length-only marker.
pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn loggable(sensitive: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive.to_string()
    } else {
        redact_sensitive(sensitive)
    }
}

/// Debug-logs a detected entity without leaking its value by default.
pub fn log_entity_debug(module_path: &str, entity_type: &str, original: &str) {
    debug!(
        "{} detected '{}': {}",
        module_path,
        entity_type,
        loggable(original)
    );
}

/// Clips a string to at most `max` bytes on a char boundary, appending an
/// ellipsis when truncated. Used for bounded violation details.
pub fn clip_detail(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(
            redact_sensitive("123456789"),
            "[REDACTED: 9 chars]".to_string()
        );
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("hello "));
    }

    #[test]
    fn test_clip_detail_respects_char_boundaries() {
        let clipped = clip_detail("aaéé", 3);
        assert!(clipped.starts_with("aa"));
        assert!(clipped.ends_with("..."));
        assert_eq!(clip_detail("short", 50), "short");
    }

    #[test]
    fn test_entity_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EntitySource::Secret).unwrap(),
            "\"secret\""
        );
    }
}
