//! # Ledger Errors
//!
//! Each variant maps onto a stable [`ErrorKind`] code via
//! [`LedgerError::kind()`]. Messages name only values the caller already
//! supplied; stored state (the actual subject of a mismatched digest, the
//! identity of other signers) is never echoed back.

use thiserror::Error;

use credence_core::{Digest, ErrorKind, Identity};

/// Errors surfaced by notary ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The digest has a revocation record; all transitions are blocked.
    #[error("credential {digest} is revoked")]
    AlreadyRevoked {
        /// The revoked digest.
        digest: Digest,
    },

    /// The caller already signed this digest.
    #[error("registrar {registrar} already signed credential {digest}")]
    DuplicateSignature {
        /// The digest in question.
        digest: Digest,
        /// The double-signing registrar.
        registrar: Identity,
    },

    /// The subject is itself a registrar on this ledger.
    #[error("subject {subject} is a registrar and cannot be issued to")]
    SelfIssuance {
        /// The rejected subject.
        subject: Identity,
    },

    /// The caller is not a registrar on this ledger.
    #[error("caller {caller} is not a registrar")]
    NotRegistrar {
        /// The rejected caller.
        caller: Identity,
    },

    /// The digest exists with a different subject.
    #[error("credential {digest} does not belong to the named subject")]
    SubjectMismatch {
        /// The digest in question.
        digest: Digest,
    },

    /// The subject's previous credential was not inserted at a strictly
    /// earlier logical instant.
    #[error(
        "credential for subject {subject} at logical time {logical_time} \
         does not strictly follow the previous insertion"
    )]
    TemporalOrderViolation {
        /// The subject being issued to.
        subject: Identity,
        /// The rejected logical instant.
        logical_time: u64,
    },

    /// A new witnessed record was submitted with an inconsistent evidence
    /// root, or duplicate witnesses.
    #[error("witness list and evidence root are inconsistent for credential {digest}")]
    WitnessEvidenceMismatch {
        /// The digest in question.
        digest: Digest,
    },

    /// The issuance window is not open at the current time.
    #[error("issuance window is closed")]
    WindowClosed,

    /// Approval attempted by a caller other than the record's subject.
    #[error("caller {caller} is not the subject of credential {digest}")]
    NotSubject {
        /// The digest in question.
        digest: Digest,
        /// The rejected caller.
        caller: Identity,
    },

    /// The credential is already approved.
    #[error("credential {digest} is already approved")]
    AlreadyApproved {
        /// The digest in question.
        digest: Digest,
    },

    /// The signature count has not reached the quorum.
    #[error("credential {digest} has {signed} of {quorum} required signatures")]
    QuorumNotMet {
        /// The digest in question.
        digest: Digest,
        /// Current signature count.
        signed: u32,
        /// Required quorum.
        quorum: u32,
    },

    /// The digest does not exist on this ledger.
    #[error("credential {digest} not found")]
    NotFound {
        /// The unknown digest.
        digest: Digest,
    },

    /// The subject has no credential history on this ledger.
    #[error("subject {subject} has no credentials")]
    NoCredentials {
        /// The subject with an empty history.
        subject: Identity,
    },

    /// Revocation attempted by a caller that is neither a registrar nor
    /// the subject.
    #[error("caller {caller} may not revoke this credential")]
    Unauthorized {
        /// The rejected caller.
        caller: Identity,
    },

    /// The revocation reason payload could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}

impl LedgerError {
    /// The stable machine-checkable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyRevoked { .. }
            | Self::DuplicateSignature { .. }
            | Self::AlreadyApproved { .. }
            | Self::QuorumNotMet { .. } => ErrorKind::StateConflict,
            Self::SelfIssuance { .. }
            | Self::NotRegistrar { .. }
            | Self::SubjectMismatch { .. }
            | Self::WindowClosed
            | Self::NotSubject { .. }
            | Self::Unauthorized { .. } => ErrorKind::AuthorizationFailure,
            Self::NotFound { .. } | Self::NoCredentials { .. } => ErrorKind::NotFound,
            Self::TemporalOrderViolation { .. }
            | Self::WitnessEvidenceMismatch { .. }
            | Self::Canonicalization(_) => ErrorKind::StructuralViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let digest = Digest::zero();
        let caller = Identity::new();
        assert_eq!(
            LedgerError::AlreadyRevoked { digest }.kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            LedgerError::NotRegistrar { caller }.kind(),
            ErrorKind::AuthorizationFailure
        );
        assert_eq!(
            LedgerError::NotFound { digest }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::TemporalOrderViolation {
                subject: caller,
                logical_time: 0
            }
            .kind(),
            ErrorKind::StructuralViolation
        );
    }

    #[test]
    fn messages_do_not_leak_stored_subjects() {
        let err = LedgerError::SubjectMismatch {
            digest: Digest::zero(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sha256:"));
        assert!(!msg.contains("id:"));
    }
}
