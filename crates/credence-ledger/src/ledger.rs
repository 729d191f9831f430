//! # The Notary Ledger
//!
//! One [`NotaryLedger`] holds the credential proofs notarized by one
//! issuer node: a record map keyed by digest, a signer set per digest, a
//! revocation map, and the ordered per-subject digest history.
//!
//! ## Write Discipline
//!
//! Every operation validates completely before it mutates, inside a single
//! write-lock critical section. A failed call therefore leaves no partial
//! writes. Domain events are emitted after the lock is released, only for
//! operations that committed.
//!
//! ## Temporal Ordering
//!
//! A new credential for a subject must be inserted at a logical instant
//! strictly after the subject's previous insertion. With the default
//! epoch-seconds clock this rejects two issuances to one subject inside
//! the same second, keeping the nonce-ordered digest list unambiguous for
//! downstream consumers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;

use credence_core::{
    sha256_digest, CanonicalBytes, Digest, EventSink, Identity, LedgerEvent, LogicalClock, NodeId,
    SystemClock, Timestamp, TracingSink,
};

use crate::error::LedgerError;
use crate::guard::{AccessGuard, IssuanceWindow};
use crate::record::{CredentialRecord, CredentialStatus, RevocationRecord};

/// A consistent snapshot of one subject's history on a ledger.
///
/// `records` is in issuance (nonce) order; `valid[i]` is the verification
/// verdict (`approved && !revoked`) for `records[i]` at snapshot time.
#[derive(Debug, Clone)]
pub struct SubjectHistory {
    /// The subject the snapshot belongs to.
    pub subject: Identity,
    /// Credential records in issuance order.
    pub records: Vec<CredentialRecord>,
    /// Per-record verification verdict at snapshot time.
    pub valid: Vec<bool>,
}

impl SubjectHistory {
    /// The digest list in issuance order.
    pub fn digests(&self) -> Vec<Digest> {
        self.records.iter().map(|r| r.digest).collect()
    }

    /// Whether every record in the snapshot verifies.
    pub fn all_valid(&self) -> bool {
        self.valid.iter().all(|v| *v)
    }
}

#[derive(Default)]
struct LedgerState {
    records: BTreeMap<Digest, CredentialRecord>,
    signers: BTreeMap<Digest, BTreeSet<Identity>>,
    revocations: BTreeMap<Digest, RevocationRecord>,
    history: BTreeMap<Identity, Vec<Digest>>,
}

/// The append-only notary ledger for one issuer node.
pub struct NotaryLedger {
    guard: Arc<dyn AccessGuard>,
    clock: Arc<dyn LogicalClock>,
    sink: Arc<dyn EventSink>,
    window: Option<IssuanceWindow>,
    state: RwLock<LedgerState>,
}

impl NotaryLedger {
    /// Create a ledger consulting the given access guard, with the
    /// epoch-seconds clock and tracing event sink.
    pub fn new(guard: Arc<dyn AccessGuard>) -> Self {
        Self {
            guard,
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
            window: None,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Replace the logical clock.
    pub fn with_clock(mut self, clock: Arc<dyn LogicalClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Gate issuance on a time window.
    pub fn with_window(mut self, window: IssuanceWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Whether the identity is a registrar according to this ledger's
    /// guard.
    pub fn is_registrar(&self, identity: &Identity) -> bool {
        self.guard.is_registrar(identity)
    }

    /// The quorum currently required for approval.
    pub fn quorum(&self) -> u32 {
        self.guard.quorum_size()
    }

    /// Issue a credential, or sign an existing one.
    ///
    /// For a new digest the record is created with the subject's next
    /// nonce and a signature count of one. For an existing digest the
    /// caller is added to the signer set and the count incremented. The
    /// caller is always marked as having signed.
    ///
    /// `evidence_root` must be the zero digest exactly when `witnesses`
    /// is empty.
    pub fn issue(
        &self,
        subject: Identity,
        digest: Digest,
        evidence_root: Digest,
        witnesses: Vec<NodeId>,
        caller: Identity,
    ) -> Result<CredentialRecord, LedgerError> {
        if !self.guard.is_registrar(&caller) {
            return Err(LedgerError::NotRegistrar { caller });
        }
        if let Some(window) = &self.window {
            if !window.contains(Timestamp::now()) {
                return Err(LedgerError::WindowClosed);
            }
        }
        if self.guard.is_registrar(&subject) {
            return Err(LedgerError::SelfIssuance { subject });
        }

        let (record, event) = {
            let mut state = self.state.write();

            if state.revocations.contains_key(&digest) {
                return Err(LedgerError::AlreadyRevoked { digest });
            }
            if state
                .signers
                .get(&digest)
                .is_some_and(|set| set.contains(&caller))
            {
                return Err(LedgerError::DuplicateSignature {
                    digest,
                    registrar: caller,
                });
            }

            if let Some(stored) = state.records.get_mut(&digest) {
                // Existing record: this call is a countersignature.
                if stored.subject != subject {
                    return Err(LedgerError::SubjectMismatch { digest });
                }
                stored.signed_count += 1;
                let record = stored.clone();
                state.signers.entry(digest).or_default().insert(caller);
                tracing::debug!(
                    %digest,
                    registrar = %caller,
                    signed_count = record.signed_count,
                    "credential countersigned"
                );

                let event = LedgerEvent::CredentialSigned {
                    digest,
                    registrar: caller,
                    signed_count: record.signed_count,
                    logical_time: self.clock.now(),
                };
                (record, event)
            } else {
                // New record.
                if witnesses.is_empty() != evidence_root.is_zero() {
                    return Err(LedgerError::WitnessEvidenceMismatch { digest });
                }
                let unique: BTreeSet<&NodeId> = witnesses.iter().collect();
                if unique.len() != witnesses.len() {
                    return Err(LedgerError::WitnessEvidenceMismatch { digest });
                }

                let now = self.clock.now();
                let prior = state.history.get(&subject);
                if let Some(last_digest) = prior.and_then(|h| h.last()) {
                    let last = state
                        .records
                        .get(last_digest)
                        .ok_or(LedgerError::NotFound {
                            digest: *last_digest,
                        })?;
                    if last.logical_time >= now {
                        return Err(LedgerError::TemporalOrderViolation {
                            subject,
                            logical_time: now,
                        });
                    }
                }

                let nonce = prior.map(|h| h.len() as u64).unwrap_or(0);
                let record = CredentialRecord {
                    digest,
                    subject,
                    registrar: caller,
                    signed_count: 1,
                    approved: false,
                    inserted_at: Timestamp::now(),
                    logical_time: now,
                    nonce,
                    witnesses,
                    evidence_root,
                };

                state.records.insert(digest, record.clone());
                state.history.entry(subject).or_default().push(digest);
                state.signers.entry(digest).or_default().insert(caller);
                tracing::debug!(%digest, %subject, registrar = %caller, nonce, "credential record created");

                let event = LedgerEvent::CredentialIssued {
                    digest,
                    subject,
                    registrar: caller,
                    nonce,
                    logical_time: now,
                };
                (record, event)
            }
        };

        self.sink.emit(event);
        Ok(record)
    }

    /// Approve a credential that has reached quorum.
    ///
    /// Only the record's subject may approve, exactly once, and only when
    /// the signature count meets the quorum at call time.
    pub fn approve(&self, digest: Digest, caller: Identity) -> Result<(), LedgerError> {
        let quorum = self.guard.quorum_size();
        let event = {
            let mut state = self.state.write();

            if state.revocations.contains_key(&digest) {
                return Err(LedgerError::AlreadyRevoked { digest });
            }
            let record = state
                .records
                .get_mut(&digest)
                .ok_or(LedgerError::NotFound { digest })?;
            if record.subject != caller {
                return Err(LedgerError::NotSubject { digest, caller });
            }
            if record.approved {
                return Err(LedgerError::AlreadyApproved { digest });
            }
            if record.signed_count < quorum {
                return Err(LedgerError::QuorumNotMet {
                    digest,
                    signed: record.signed_count,
                    quorum,
                });
            }

            record.approved = true;
            tracing::debug!(%digest, subject = %caller, "credential approved");
            LedgerEvent::CredentialApproved {
                digest,
                subject: caller,
                logical_time: self.clock.now(),
            }
        };

        self.sink.emit(event);
        Ok(())
    }

    /// Revoke a credential permanently.
    ///
    /// The reason payload is canonicalized and stored as a digest. The
    /// credential record itself is not mutated; the revocation record's
    /// presence is the marker.
    pub fn revoke(
        &self,
        digest: Digest,
        reason: &str,
        caller: Identity,
    ) -> Result<RevocationRecord, LedgerError> {
        let reason_digest = CanonicalBytes::new(&reason)
            .map(|cb| sha256_digest(&cb))
            .map_err(|e| LedgerError::Canonicalization(e.to_string()))?;

        let (revocation, event) = {
            let mut state = self.state.write();

            if state.revocations.contains_key(&digest) {
                return Err(LedgerError::AlreadyRevoked { digest });
            }
            let record = state
                .records
                .get(&digest)
                .ok_or(LedgerError::NotFound { digest })?;
            if !self.guard.is_registrar(&caller) && record.subject != caller {
                return Err(LedgerError::Unauthorized { caller });
            }

            let revocation = RevocationRecord {
                digest,
                subject: record.subject,
                revoker: caller,
                revoked_at: Timestamp::now(),
                reason_digest,
            };
            state.revocations.insert(digest, revocation.clone());
            tracing::debug!(%digest, revoker = %caller, "credential revoked");

            let event = LedgerEvent::CredentialRevoked {
                digest,
                subject: revocation.subject,
                revoker: caller,
                logical_time: self.clock.now(),
            };
            (revocation, event)
        };

        self.sink.emit(event);
        Ok(revocation)
    }

    /// Whether the credential is approved and unrevoked.
    ///
    /// The digest must exist and belong to the subject; anything else is a
    /// hard error, not a `false` verdict.
    pub fn verify(&self, subject: Identity, digest: Digest) -> Result<bool, LedgerError> {
        let state = self.state.read();
        let record = state
            .records
            .get(&digest)
            .ok_or(LedgerError::NotFound { digest })?;
        if record.subject != subject {
            return Err(LedgerError::SubjectMismatch { digest });
        }
        Ok(record.approved && !state.revocations.contains_key(&digest))
    }

    /// Whether every credential of the subject verifies.
    ///
    /// Requires at least one credential; an empty history is a hard error.
    pub fn verify_all(&self, subject: Identity) -> Result<bool, LedgerError> {
        Ok(self.history(subject)?.all_valid())
    }

    /// A consistent snapshot of the subject's history.
    pub fn history(&self, subject: Identity) -> Result<SubjectHistory, LedgerError> {
        let state = self.state.read();
        let digests = state
            .history
            .get(&subject)
            .filter(|h| !h.is_empty())
            .ok_or(LedgerError::NoCredentials { subject })?;

        let mut records = Vec::with_capacity(digests.len());
        let mut valid = Vec::with_capacity(digests.len());
        for digest in digests {
            let record = state
                .records
                .get(digest)
                .ok_or(LedgerError::NotFound { digest: *digest })?;
            valid.push(record.approved && !state.revocations.contains_key(digest));
            records.push(record.clone());
        }
        Ok(SubjectHistory {
            subject,
            records,
            valid,
        })
    }

    /// The subject's digest list in issuance order; empty if none.
    pub fn digests(&self, subject: Identity) -> Vec<Digest> {
        self.state
            .read()
            .history
            .get(&subject)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of credentials issued to the subject.
    pub fn credential_count(&self, subject: Identity) -> u64 {
        self.state
            .read()
            .history
            .get(&subject)
            .map(|h| h.len() as u64)
            .unwrap_or(0)
    }

    /// The credential record for a digest, if any.
    pub fn record(&self, digest: Digest) -> Option<CredentialRecord> {
        self.state.read().records.get(&digest).cloned()
    }

    /// The revocation record for a digest, if any.
    pub fn revocation(&self, digest: Digest) -> Option<RevocationRecord> {
        self.state.read().revocations.get(&digest).cloned()
    }

    /// The registrars that have signed a digest, if any.
    pub fn signers(&self, digest: Digest) -> Option<BTreeSet<Identity>> {
        self.state.read().signers.get(&digest).cloned()
    }

    /// The lifecycle status of a digest, if it exists.
    pub fn status(&self, digest: Digest) -> Option<CredentialStatus> {
        let quorum = self.guard.quorum_size();
        let state = self.state.read();
        if state.revocations.contains_key(&digest) {
            return Some(CredentialStatus::Revoked);
        }
        state.records.get(&digest).map(|record| {
            if record.approved {
                CredentialStatus::Approved
            } else if record.signed_count >= quorum {
                CredentialStatus::QuorumReached
            } else {
                CredentialStatus::PartiallySigned
            }
        })
    }
}
