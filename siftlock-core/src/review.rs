// siftlock-core/src/review.rs
//! Human review gate: pending/approved/rejected per sanitized chunk.
//!
//! Statuses are only meaningful once a document has a redaction map; ids
//! without one report "not found" rather than a default. Bulk operations
//! are batches of independent per-id operations, not transactions.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::store::DocumentStore;

/// Review decision for one chunk. `Pending` is the implicit default for any
/// sanitized chunk without an explicit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// On-demand status tally over all sanitized chunks.
/// pending + approved + rejected always equals the sanitized count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Per-id outcome of a bulk review operation. Partial failure is expected
/// and reported, never rolled back.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReviewOutcome {
    pub results: HashMap<String, bool>,
    pub success_count: usize,
    pub failure_count: usize,
}

/// Context object tracking review decisions.
#[derive(Debug, Default)]
pub struct ReviewGate {
    statuses: Mutex<HashMap<String, ReviewStatus>>,
}

impl ReviewGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status for a sanitized chunk; `NotFound` when no redaction map
    /// exists for the id.
    pub fn status(&self, store: &DocumentStore, id: &str) -> Result<ReviewStatus, CoreError> {
        if !store.has_sanitized(id) {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(self.status_or_pending(id))
    }

    /// Raw status lookup defaulting to pending; callers must have already
    /// established that the chunk exists.
    pub(crate) fn status_or_pending(&self, id: &str) -> ReviewStatus {
        self.statuses
            .lock()
            .expect("statuses lock poisoned")
            .get(id)
            .copied()
            .unwrap_or(ReviewStatus::Pending)
    }

    fn set_status(&self, store: &DocumentStore, id: &str, status: ReviewStatus) -> bool {
        if !store.has_sanitized(id) {
            debug!("review {} for unknown chunk {} refused", status, id);
            return false;
        }
        self.statuses
            .lock()
            .expect("statuses lock poisoned")
            .insert(id.to_string(), status);
        true
    }

    /// Approves one chunk; false (and no side effects) if it has no
    /// redaction map.
    pub fn approve(&self, store: &DocumentStore, id: &str) -> bool {
        self.set_status(store, id, ReviewStatus::Approved)
    }

    /// Rejects one chunk; false (and no side effects) if it has no
    /// redaction map.
    pub fn reject(&self, store: &DocumentStore, id: &str) -> bool {
        self.set_status(store, id, ReviewStatus::Rejected)
    }

    pub fn bulk_approve(&self, store: &DocumentStore, ids: &[String]) -> BulkReviewOutcome {
        self.bulk_apply(ids, |id| self.approve(store, id))
    }

    pub fn bulk_reject(&self, store: &DocumentStore, ids: &[String]) -> BulkReviewOutcome {
        self.bulk_apply(ids, |id| self.reject(store, id))
    }

    fn bulk_apply<F: Fn(&str) -> bool>(&self, ids: &[String], op: F) -> BulkReviewOutcome {
        let mut results = HashMap::with_capacity(ids.len());
        let mut success_count = 0;
        let mut failure_count = 0;
        for id in ids {
            let ok = op(id);
            if ok {
                success_count += 1;
            } else {
                failure_count += 1;
            }
            results.insert(id.clone(), ok);
        }
        BulkReviewOutcome {
            results,
            success_count,
            failure_count,
        }
    }

    /// Computed on demand over all ids with a redaction map, unset ids
    /// defaulting to pending.
    pub fn status_counts(&self, store: &DocumentStore) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for id in store.list_sanitized() {
            match self.status_or_pending(&id) {
                ReviewStatus::Pending => counts.pending += 1,
                ReviewStatus::Approved => counts.approved += 1,
                ReviewStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    /// Sanitized ids currently carrying `status`.
    pub fn list_with_status(&self, store: &DocumentStore, status: ReviewStatus) -> Vec<String> {
        store
            .list_sanitized()
            .into_iter()
            .filter(|id| self.status_or_pending(id) == status)
            .collect()
    }

    /// Drops the recorded decision for an id (e.g. after cleanup).
    pub fn clear(&self, id: &str) {
        self.statuses
            .lock()
            .expect("statuses lock poisoned")
            .remove(id);
    }

    pub fn reset(&self) {
        self.statuses
            .lock()
            .expect("statuses lock poisoned")
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RedactionMap;
    use crate::extract::FileType;
    use chrono::Utc;

    fn sanitized_doc(store: &DocumentStore) -> String {
        let record = store.insert_document("d.txt", FileType::Txt, b"text");
        store.store_sanitized(
            &record.id,
            RedactionMap {
                original_text: "text".to_string(),
                redacted_text: "text".to_string(),
                entities: vec![],
                created_at: Utc::now(),
            },
        );
        record.id
    }

    #[test]
    fn test_approve_requires_redaction_map() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        assert!(!gate.approve(&store, "missing"));
        let id = sanitized_doc(&store);
        assert!(gate.approve(&store, &id));
        assert_eq!(gate.status(&store, &id).unwrap(), ReviewStatus::Approved);
    }

    #[test]
    fn test_status_for_unsanitized_id_is_not_found() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        assert!(matches!(
            gate.status(&store, "missing"),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_default_status_is_pending() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        let id = sanitized_doc(&store);
        assert_eq!(gate.status(&store, &id).unwrap(), ReviewStatus::Pending);
    }

    #[test]
    fn test_bulk_approve_reports_partial_failure() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        let a = sanitized_doc(&store);
        let b = sanitized_doc(&store);
        let ids = vec![a.clone(), b.clone(), "nonexistent".to_string()];
        let outcome = gate.bulk_approve(&store, &ids);
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.results["nonexistent"], false);
        assert!(outcome.results[&a] && outcome.results[&b]);
    }

    #[test]
    fn test_status_counts_cover_all_sanitized() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        let a = sanitized_doc(&store);
        let _b = sanitized_doc(&store);
        let c = sanitized_doc(&store);
        gate.approve(&store, &a);
        gate.reject(&store, &c);
        let counts = gate.status_counts(&store);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.pending, 1);
        assert_eq!(
            counts.pending + counts.approved + counts.rejected,
            store.list_sanitized().len()
        );
    }

    #[test]
    fn test_list_with_status() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        let a = sanitized_doc(&store);
        let b = sanitized_doc(&store);
        gate.approve(&store, &a);
        assert_eq!(gate.list_with_status(&store, ReviewStatus::Approved), vec![a]);
        assert_eq!(gate.list_with_status(&store, ReviewStatus::Pending), vec![b]);
    }

    #[test]
    fn test_clear_returns_chunk_to_pending() {
        let store = DocumentStore::new();
        let gate = ReviewGate::new();
        let id = sanitized_doc(&store);
        gate.reject(&store, &id);
        gate.clear(&id);
        assert_eq!(gate.status(&store, &id).unwrap(), ReviewStatus::Pending);
    }
}
