// siftlock-core/src/eligibility.rs
//! Injection eligibility gate: the sole path to sanitized content for
//! downstream consumers.
//!
//! Eligibility is derived state, never stored: a chunk is eligible iff a
//! redaction map exists for it and review approved it.
//!
//! License: MIT OR Apache-2.0

use serde::Serialize;

use crate::entity::RedactionMap;
use crate::errors::CoreError;
use crate::review::{ReviewGate, ReviewStatus};
use crate::store::DocumentStore;

/// Why a chunk may not be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityReason {
    DoesNotExist,
    PendingReview,
    Rejected,
}

impl std::fmt::Display for EligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EligibilityReason::DoesNotExist => "does-not-exist",
            EligibilityReason::PendingReview => "pending-review",
            EligibilityReason::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// Partition of all tracked chunks by eligibility, exposing ids only for
/// the eligible set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EligibilitySummary {
    pub eligible_count: usize,
    pub pending_count: usize,
    pub rejected_count: usize,
    pub eligible_ids: Vec<String>,
}

/// True iff a redaction map exists for `id` AND review approved it.
pub fn is_eligible(store: &DocumentStore, review: &ReviewGate, id: &str) -> bool {
    store.has_sanitized(id) && review.status_or_pending(id) == ReviewStatus::Approved
}

/// Fails loudly when `id` may not be injected, carrying the reason.
pub fn require_eligible(
    store: &DocumentStore,
    review: &ReviewGate,
    id: &str,
) -> Result<(), CoreError> {
    if !store.has_sanitized(id) {
        return Err(CoreError::NotEligible {
            id: id.to_string(),
            reason: EligibilityReason::DoesNotExist,
        });
    }
    match review.status(store, id)? {
        ReviewStatus::Approved => Ok(()),
        ReviewStatus::Pending => Err(CoreError::NotEligible {
            id: id.to_string(),
            reason: EligibilityReason::PendingReview,
        }),
        ReviewStatus::Rejected => Err(CoreError::NotEligible {
            id: id.to_string(),
            reason: EligibilityReason::Rejected,
        }),
    }
}

/// Returns the redaction map only when the chunk is eligible; never returns
/// content otherwise.
pub fn get_eligible_content(
    store: &DocumentStore,
    review: &ReviewGate,
    id: &str,
) -> Result<RedactionMap, CoreError> {
    require_eligible(store, review, id)?;
    store
        .get_sanitized(id)
        .ok_or_else(|| CoreError::NotFound(id.to_string()))
}

/// Ids of all chunks currently eligible for injection.
pub fn list_eligible(store: &DocumentStore, review: &ReviewGate) -> Vec<String> {
    review.list_with_status(store, ReviewStatus::Approved)
}

/// Partitions every sanitized chunk by status without exposing content.
pub fn eligibility_summary(store: &DocumentStore, review: &ReviewGate) -> EligibilitySummary {
    let mut summary = EligibilitySummary::default();
    for id in store.list_sanitized() {
        match review.status_or_pending(&id) {
            ReviewStatus::Approved => {
                summary.eligible_count += 1;
                summary.eligible_ids.push(id);
            }
            ReviewStatus::Pending => summary.pending_count += 1,
            ReviewStatus::Rejected => summary.rejected_count += 1,
        }
    }
    summary
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
                original_text: "secret text".to_string(),
                redacted_text: "[X_1] text".to_string(),
                entities: vec![],
                created_at: Utc::now(),
            },
        );
        record.id
    }

    #[test]
    fn test_eligible_iff_sanitized_and_approved() {
        let store = DocumentStore::new();
        let review = ReviewGate::new();
        let id = sanitized_doc(&store);

        assert!(!is_eligible(&store, &review, &id));
        review.approve(&store, &id);
        assert!(is_eligible(&store, &review, &id));
        review.reject(&store, &id);
        assert!(!is_eligible(&store, &review, &id));
        assert!(!is_eligible(&store, &review, "nonexistent"));
    }

    #[test]
    fn test_require_eligible_reasons() {
        let store = DocumentStore::new();
        let review = ReviewGate::new();
        let id = sanitized_doc(&store);

        let err = require_eligible(&store, &review, "ghost").unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotEligible {
                reason: EligibilityReason::DoesNotExist,
                ..
            }
        ));

        let err = require_eligible(&store, &review, &id).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotEligible {
                reason: EligibilityReason::PendingReview,
                ..
            }
        ));

        review.reject(&store, &id);
        let err = require_eligible(&store, &review, &id).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotEligible {
                reason: EligibilityReason::Rejected,
                ..
            }
        ));

        review.approve(&store, &id);
        assert!(require_eligible(&store, &review, &id).is_ok());
    }

    #[test]
    fn test_content_released_only_when_approved() {
        let store = DocumentStore::new();
        let review = ReviewGate::new();
        let id = sanitized_doc(&store);

        assert!(get_eligible_content(&store, &review, &id).is_err());
        review.approve(&store, &id);
        let map = get_eligible_content(&store, &review, &id).unwrap();
        assert_eq!(map.redacted_text, "[X_1] text");
    }

    #[test]
    fn test_summary_partitions_chunks() {
        let store = DocumentStore::new();
        let review = ReviewGate::new();
        let a = sanitized_doc(&store);
        let _pending = sanitized_doc(&store);
        let r = sanitized_doc(&store);
        review.approve(&store, &a);
        review.reject(&store, &r);

        let summary = eligibility_summary(&store, &review);
        assert_eq!(summary.eligible_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.rejected_count, 1);
        assert_eq!(summary.eligible_ids, vec![a]);
    }

    #[test]
    fn test_reason_display_is_kebab_case() {
        assert_eq!(EligibilityReason::DoesNotExist.to_string(), "does-not-exist");
        assert_eq!(EligibilityReason::PendingReview.to_string(), "pending-review");
        assert_eq!(EligibilityReason::Rejected.to_string(), "rejected");
    }
}
