// siftlock-core/src/errors.rs
//! Custom error types for the siftlock-core library.
//!
//! Operations where the caller is expected to branch on the outcome (e.g.
//! `ReviewGate::approve`, `is_eligible`) return structured values instead of
//! errors; "require"-style operations fail loudly with one of the variants
//! below, since the caller has already committed to needing the guarantee.
//!
//! License: MIT OR Apache-2.0

use std::time::Duration;
use thiserror::Error;

use crate::egress::ViolationKind;
use crate::eligibility::EligibilityReason;
use crate::store::DocumentState;

/// All failure modes surfaced by `siftlock-core`.
///
/// `#[non_exhaustive]` signals to consumers that new variants may be added
/// in future versions without a breaking change.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Malformed input rejected before any core processing (empty upload,
    /// unsupported file type, malformed passphrase, bad salt).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown document or chunk id.
    #[error("document '{0}' not found")]
    NotFound(String),

    /// The chunk exists but may not be released to downstream consumers.
    #[error("chunk '{id}' not eligible: {reason}")]
    NotEligible { id: String, reason: EligibilityReason },

    /// Rejected lifecycle move (out of a terminal state, or skipping ahead).
    #[error("invalid lifecycle transition for '{id}': {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: DocumentState,
        to: DocumentState,
    },

    /// The sandboxed extraction did not complete within its bound.
    #[error("document extraction timed out after {0:?}")]
    ExtractionTimeout(Duration),

    /// The extraction process reported a failure.
    #[error("document extraction failed: {0}")]
    Extraction(String),

    /// Argon2/HKDF failure during vault key derivation.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// An outbound payload reproduced registered sensitive content. The
    /// detail string is bounded and never echoes the full offending value.
    #[error("egress gate violation ({kind}): {detail}")]
    EgressBlocked { kind: ViolationKind, detail: String },
}
