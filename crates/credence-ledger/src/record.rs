//! # Credential and Revocation Records
//!
//! The persisted shapes of the notary ledger. A [`CredentialRecord`] is
//! created once on first issuance and mutated only by subsequent signings
//! and the approval transition. A [`RevocationRecord`] is created at most
//! once per digest and never removed.

use serde::{Deserialize, Serialize};

use credence_core::{Digest, Identity, NodeId, Timestamp};

/// The lifecycle position of a credential within its ledger.
///
/// `Revoked` is orthogonal to the signing progression: any existing
/// credential can be revoked, and revocation is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialStatus {
    /// The record exists but has fewer signatures than the quorum.
    PartiallySigned,
    /// Signatures meet the quorum; awaiting subject approval.
    QuorumReached,
    /// The subject approved the credential.
    Approved,
    /// A revocation record exists for the digest (terminal).
    Revoked,
}

impl CredentialStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PartiallySigned => "PARTIALLY_SIGNED",
            Self::QuorumReached => "QUORUM_REACHED",
            Self::Approved => "APPROVED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

/// One credential proof, keyed by its digest.
///
/// ## Invariants
///
/// - `nonce` equals the subject's credential count at creation time.
/// - `evidence_root` is the zero digest iff `witnesses` is empty.
/// - `subject`, `registrar`, `nonce`, `inserted_at`, `logical_time`,
///   `witnesses`, and `evidence_root` never change after creation; only
///   `signed_count` and `approved` move, and `approved` only false to
///   true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Content digest of the off-ledger credential payload.
    pub digest: Digest,
    /// The entity the credential is about.
    pub subject: Identity,
    /// The registrar whose issuance created the record.
    pub registrar: Identity,
    /// Number of distinct registrars that have signed.
    pub signed_count: u32,
    /// Whether the subject has approved the credential.
    pub approved: bool,
    /// Wall-clock insertion time.
    pub inserted_at: Timestamp,
    /// Logical instant of insertion; strictly increasing per subject.
    pub logical_time: u64,
    /// Position in the subject's credential history (0-based).
    pub nonce: u64,
    /// Child nodes whose aggregate roots back this credential.
    pub witnesses: Vec<NodeId>,
    /// Fold of the witness roots; the zero digest for leaf credentials.
    pub evidence_root: Digest,
}

impl CredentialRecord {
    /// Whether this credential carries witness evidence.
    pub fn is_witnessed(&self) -> bool {
        !self.witnesses.is_empty()
    }
}

/// Permanent marker that a credential was revoked.
///
/// Presence of this record is the revocation; the credential record is
/// retained untouched for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    /// The revoked credential digest.
    pub digest: Digest,
    /// The credential subject at revocation time.
    pub subject: Identity,
    /// The party that revoked (a registrar or the subject).
    pub revoker: Identity,
    /// Wall-clock revocation time.
    pub revoked_at: Timestamp,
    /// Digest of the revocation reason payload.
    pub reason_digest: Digest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_revoked_is_terminal() {
        assert!(CredentialStatus::Revoked.is_terminal());
        assert!(!CredentialStatus::PartiallySigned.is_terminal());
        assert!(!CredentialStatus::QuorumReached.is_terminal());
        assert!(!CredentialStatus::Approved.is_terminal());
    }

    #[test]
    fn status_display_is_uppercase() {
        assert_eq!(CredentialStatus::QuorumReached.to_string(), "QUORUM_REACHED");
        assert_eq!(CredentialStatus::Revoked.to_string(), "REVOKED");
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = CredentialRecord {
            digest: Digest::zero(),
            subject: Identity::new(),
            registrar: Identity::new(),
            signed_count: 1,
            approved: false,
            inserted_at: Timestamp::now(),
            logical_time: 42,
            nonce: 0,
            witnesses: vec![NodeId::new()],
            evidence_root: Digest::zero(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: CredentialRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(back.is_witnessed());
    }
}
