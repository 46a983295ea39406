// siftlock-core/src/store.rs
//! Document lifecycle state machine and the ephemeral buffer store.
//!
//! A `DocumentStore` exclusively owns the three ephemeral buffers per
//! document id (raw file bytes, raw extract, sanitized redaction map) and
//! the lifecycle record. `transition` is the only sanctioned state mutator
//! and performs the prescribed eviction for the target state before
//! recording it. Once a buffer is evicted for an id it is never
//! resurrected.
//!
//! License: MIT OR Apache-2.0

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::entity::RedactionMap;
use crate::errors::CoreError;
use crate::extract::{FileType, RawExtract};

/// Lifecycle states. `Completed` and `Error` are terminal; `Error` is
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Uploaded,
    Parsing,
    Parsed,
    Sanitizing,
    Sanitized,
    Completed,
    Error,
}

impl DocumentState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DocumentState::Completed | DocumentState::Error)
    }

    /// The single legal forward successor, if any.
    fn successor(self) -> Option<DocumentState> {
        match self {
            DocumentState::Uploaded => Some(DocumentState::Parsing),
            DocumentState::Parsing => Some(DocumentState::Parsed),
            DocumentState::Parsed => Some(DocumentState::Sanitizing),
            DocumentState::Sanitizing => Some(DocumentState::Sanitized),
            DocumentState::Sanitized => Some(DocumentState::Completed),
            DocumentState::Completed | DocumentState::Error => None,
        }
    }
}

impl std::fmt::Display for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentState::Uploaded => "uploaded",
            DocumentState::Parsing => "parsing",
            DocumentState::Parsed => "parsed",
            DocumentState::Sanitizing => "sanitizing",
            DocumentState::Sanitized => "sanitized",
            DocumentState::Completed => "completed",
            DocumentState::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Non-sensitive descriptor for an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub filename: String,
    pub file_type: FileType,
    pub sha256: String,
    pub size: usize,
    pub state: DocumentState,
}

/// Counts of live buffers, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub documents: usize,
    pub file_buffers: usize,
    pub raw_extracts: usize,
    pub sanitized_maps: usize,
}

/// Context object owning all per-document state. Each map has its own lock,
/// scoped to a single operation; nothing long-running ever happens under a
/// lock here.
#[derive(Debug, Default)]
pub struct DocumentStore {
    records: Mutex<HashMap<String, DocumentRecord>>,
    file_bytes: Mutex<HashMap<String, Vec<u8>>>,
    raw_extracts: Mutex<HashMap<String, RawExtract>>,
    sanitized: Mutex<HashMap<String, RedactionMap>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an upload: assigns an id, hashes the content and buffers
    /// the raw bytes in state `Uploaded`.
    pub fn insert_document(
        &self,
        filename: &str,
        file_type: FileType,
        content: &[u8],
    ) -> DocumentRecord {
        let record = DocumentRecord {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            file_type,
            sha256: {
                use sha2::{Digest, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(content);
                hex::encode(hasher.finalize())
            },
            size: content.len(),
            state: DocumentState::Uploaded,
        };
        self.file_bytes
            .lock()
            .expect("file_bytes lock poisoned")
            .insert(record.id.clone(), content.to_vec());
        self.records
            .lock()
            .expect("records lock poisoned")
            .insert(record.id.clone(), record.clone());
        debug!("registered document {} ({} bytes)", record.id, record.size);
        record
    }

    pub fn get_document(&self, id: &str) -> Option<DocumentRecord> {
        self.records
            .lock()
            .expect("records lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn list_documents(&self) -> Vec<DocumentRecord> {
        self.records
            .lock()
            .expect("records lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Clones out the raw bytes so callers never hold the lock while
    /// working on them.
    pub fn get_file_bytes(&self, id: &str) -> Option<Vec<u8>> {
        self.file_bytes
            .lock()
            .expect("file_bytes lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn store_raw_extract(&self, id: &str, extract: RawExtract) {
        self.raw_extracts
            .lock()
            .expect("raw_extracts lock poisoned")
            .insert(id.to_string(), extract);
    }

    pub fn get_raw_extract(&self, id: &str) -> Option<RawExtract> {
        self.raw_extracts
            .lock()
            .expect("raw_extracts lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn store_sanitized(&self, id: &str, map: RedactionMap) {
        self.sanitized
            .lock()
            .expect("sanitized lock poisoned")
            .insert(id.to_string(), map);
    }

    pub fn get_sanitized(&self, id: &str) -> Option<RedactionMap> {
        self.sanitized
            .lock()
            .expect("sanitized lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn has_sanitized(&self, id: &str) -> bool {
        self.sanitized
            .lock()
            .expect("sanitized lock poisoned")
            .contains_key(id)
    }

    /// Ids with a sanitized redaction map, i.e. the review-tracked chunks.
    pub fn list_sanitized(&self) -> Vec<String> {
        self.sanitized
            .lock()
            .expect("sanitized lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Moves a document to `new_state`, performing the prescribed eviction
    /// for the target state before the state is recorded:
    /// entering `Parsed` evicts the raw file bytes, entering `Sanitized`
    /// evicts the raw extract.
    ///
    /// Rejects moves out of terminal states and forward jumps that skip a
    /// state; `Error` is accepted from any non-terminal state.
    pub fn transition(&self, id: &str, new_state: DocumentState) -> Result<(), CoreError> {
        let current = self
            .get_document(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?
            .state;

        let legal = if current.is_terminal() {
            false
        } else {
            new_state == DocumentState::Error || current.successor() == Some(new_state)
        };
        if !legal {
            return Err(CoreError::InvalidTransition {
                id: id.to_string(),
                from: current,
                to: new_state,
            });
        }

        match new_state {
            DocumentState::Parsed => {
                self.file_bytes
                    .lock()
                    .expect("file_bytes lock poisoned")
                    .remove(id);
            }
            DocumentState::Sanitized => {
                self.raw_extracts
                    .lock()
                    .expect("raw_extracts lock poisoned")
                    .remove(id);
            }
            _ => {}
        }

        let mut records = self.records.lock().expect("records lock poisoned");
        match records.get_mut(id) {
            Some(record) => {
                debug!("document {}: {} -> {}", id, current, new_state);
                record.state = new_state;
                Ok(())
            }
            // Record vanished between lock scopes (concurrent cleanup).
            None => Err(CoreError::NotFound(id.to_string())),
        }
    }

    /// Unconditionally evicts all three buffers and the record for `id`,
    /// regardless of current state. Never fails; used for explicit deletion
    /// and error recovery.
    pub fn cleanup(&self, id: &str) {
        self.file_bytes
            .lock()
            .expect("file_bytes lock poisoned")
            .remove(id);
        self.raw_extracts
            .lock()
            .expect("raw_extracts lock poisoned")
            .remove(id);
        self.sanitized
            .lock()
            .expect("sanitized lock poisoned")
            .remove(id);
        if self
            .records
            .lock()
            .expect("records lock poisoned")
            .remove(id)
            .is_some()
        {
            debug!("cleaned up document {}", id);
        } else {
            warn!("cleanup for unknown document {}", id);
        }
    }

    pub fn memory_stats(&self) -> MemoryStats {
        MemoryStats {
            documents: self.records.lock().expect("records lock poisoned").len(),
            file_buffers: self
                .file_bytes
                .lock()
                .expect("file_bytes lock poisoned")
                .len(),
            raw_extracts: self
                .raw_extracts
                .lock()
                .expect("raw_extracts lock poisoned")
                .len(),
            sanitized_maps: self.sanitized.lock().expect("sanitized lock poisoned").len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractMetadata;
    use chrono::Utc;

    fn store_with_doc() -> (DocumentStore, String) {
        let store = DocumentStore::new();
        let record = store.insert_document("a.txt", FileType::Txt, b"hello world");
        (store, record.id)
    }

    fn extract() -> RawExtract {
        RawExtract {
            text: "hello world".to_string(),
            metadata: ExtractMetadata::for_text(FileType::Txt, "hello world"),
        }
    }

    fn map() -> RedactionMap {
        RedactionMap {
            original_text: "hello world".to_string(),
            redacted_text: "hello world".to_string(),
            entities: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_upload_buffers_bytes() {
        let (store, id) = store_with_doc();
        assert_eq!(store.get_file_bytes(&id).unwrap(), b"hello world");
        assert_eq!(store.get_document(&id).unwrap().state, DocumentState::Uploaded);
    }

    #[test]
    fn test_parsed_evicts_raw_bytes() {
        let (store, id) = store_with_doc();
        store.transition(&id, DocumentState::Parsing).unwrap();
        store.transition(&id, DocumentState::Parsed).unwrap();
        assert!(store.get_file_bytes(&id).is_none());
        assert_eq!(store.get_document(&id).unwrap().state, DocumentState::Parsed);
    }

    #[test]
    fn test_sanitized_evicts_raw_extract() {
        let (store, id) = store_with_doc();
        store.transition(&id, DocumentState::Parsing).unwrap();
        store.transition(&id, DocumentState::Parsed).unwrap();
        store.store_raw_extract(&id, extract());
        store.transition(&id, DocumentState::Sanitizing).unwrap();
        store.store_sanitized(&id, map());
        store.transition(&id, DocumentState::Sanitized).unwrap();
        assert!(store.get_raw_extract(&id).is_none());
        assert!(store.get_sanitized(&id).is_some());
    }

    #[test]
    fn test_skipping_transition_rejected() {
        let (store, id) = store_with_doc();
        let err = store.transition(&id, DocumentState::Sanitized).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        // Buffers untouched on rejection.
        assert!(store.get_file_bytes(&id).is_some());
    }

    #[test]
    fn test_error_reachable_from_any_non_terminal_state() {
        let (store, id) = store_with_doc();
        store.transition(&id, DocumentState::Parsing).unwrap();
        store.transition(&id, DocumentState::Error).unwrap();
        let err = store.transition(&id, DocumentState::Parsed).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_terminal_completed_rejects_further_moves() {
        let (store, id) = store_with_doc();
        for state in [
            DocumentState::Parsing,
            DocumentState::Parsed,
            DocumentState::Sanitizing,
            DocumentState::Sanitized,
            DocumentState::Completed,
        ] {
            store.transition(&id, state).unwrap();
        }
        assert!(store.transition(&id, DocumentState::Error).is_err());
    }

    #[test]
    fn test_cleanup_evicts_everything_and_never_fails() {
        let (store, id) = store_with_doc();
        store.store_raw_extract(&id, extract());
        store.store_sanitized(&id, map());
        store.cleanup(&id);
        assert!(store.get_document(&id).is_none());
        assert!(store.get_file_bytes(&id).is_none());
        assert!(store.get_raw_extract(&id).is_none());
        assert!(store.get_sanitized(&id).is_none());
        // Idempotent, including for unknown ids.
        store.cleanup(&id);
        store.cleanup("no-such-id");
    }

    #[test]
    fn test_unknown_document_transition_is_not_found() {
        let store = DocumentStore::new();
        assert!(matches!(
            store.transition("ghost", DocumentState::Parsing),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_memory_stats_track_buffers() {
        let (store, id) = store_with_doc();
        store.store_raw_extract(&id, extract());
        let stats = store.memory_stats();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.file_buffers, 1);
        assert_eq!(stats.raw_extracts, 1);
        assert_eq!(stats.sanitized_maps, 0);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentState::Sanitizing).unwrap(),
            "\"sanitizing\""
        );
        assert_eq!(DocumentState::Error.to_string(), "error");
    }
}
