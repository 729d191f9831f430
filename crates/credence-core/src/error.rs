//! # Error Kinds
//!
//! Every error surfaced by the workspace maps onto one of four stable
//! kinds. Hosts match on [`ErrorKind`], never on message text; messages
//! may evolve, kinds may not.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stable, machine-checkable classification of an error.
///
/// All errors are recoverable at the caller's discretion: a failed call
/// leaves ledger state exactly as if it never ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The operation conflicts with existing state: double-signing,
    /// re-approval, re-revocation, duplicate child.
    StateConflict,
    /// The caller is not entitled to the operation: non-registrar,
    /// wrong subject, self-reference.
    AuthorizationFailure,
    /// A referenced digest, root, node, or credential history does not
    /// exist.
    NotFound,
    /// The operation is structurally invalid: empty list where one is
    /// required, temporal-order violation, role mismatch, bound exceeded.
    StructuralViolation,
}

impl ErrorKind {
    /// The stable string code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateConflict => "state_conflict",
            Self::AuthorizationFailure => "authorization_failure",
            Self::NotFound => "not_found",
            Self::StructuralViolation => "structural_violation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error during canonical serialization or digest parsing.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Floats are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// A digest hex string failed strict validation.
    #[error("invalid hex digest: {0}")]
    InvalidHexDigest(String),
}
