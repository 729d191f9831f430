//! # Notary Quorum Flow Integration Tests
//!
//! Proves the ledger's multi-registrar issuance protocol end to end:
//!
//! 1. Quorum 1: issue then approve immediately.
//! 2. Quorum 2: approval blocked until the second registrar signs.
//! 3. Quorum gate holds for rosters of every size up to five.
//! 4. Revocation is permanent and blocks every later transition.
//! 5. The record's identity fields never change after creation.

use std::sync::Arc;

use credence_core::{
    sha256_digest, CanonicalBytes, Digest, Identity, LedgerEvent, ManualClock, RecordingSink,
};
use credence_ledger::{LedgerError, NotaryLedger, RegistrarRoster};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn digest(tag: &str) -> Digest {
    sha256_digest(&CanonicalBytes::new(&tag).unwrap())
}

struct Notary {
    ledger: NotaryLedger,
    clock: Arc<ManualClock>,
    sink: Arc<RecordingSink>,
    registrars: Vec<Identity>,
}

fn notary(registrar_count: usize, quorum: u32) -> Notary {
    let registrars: Vec<Identity> = (0..registrar_count).map(|_| Identity::new()).collect();
    let roster = Arc::new(RegistrarRoster::new(registrars.clone(), quorum).unwrap());
    let clock = Arc::new(ManualClock::starting_at(1));
    let sink = Arc::new(RecordingSink::new());
    let ledger = NotaryLedger::new(roster)
        .with_clock(clock.clone())
        .with_sink(sink.clone());
    Notary {
        ledger,
        clock,
        sink,
        registrars,
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn quorum_one_approves_immediately() {
    let n = notary(1, 1);
    let subject = Identity::new();
    let d1 = digest("d1");

    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    n.ledger.approve(d1, subject).unwrap();
    assert!(n.ledger.verify(subject, d1).unwrap());
}

#[test]
fn quorum_two_requires_both_registrars() {
    let n = notary(2, 2);
    let subject = Identity::new();
    let d1 = digest("d1");

    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    assert!(matches!(
        n.ledger.approve(d1, subject).unwrap_err(),
        LedgerError::QuorumNotMet { .. }
    ));

    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[1])
        .unwrap();
    n.ledger.approve(d1, subject).unwrap();
    assert!(n.ledger.verify(subject, d1).unwrap());
}

#[test]
fn quorum_gate_holds_for_all_roster_sizes() {
    for quorum in 1..=5u32 {
        let n = notary(5, quorum);
        let subject = Identity::new();
        let d = digest("d");

        for (signed, registrar) in n.registrars.iter().enumerate() {
            n.ledger
                .issue(subject, d, Digest::zero(), vec![], *registrar)
                .unwrap();
            let signed = signed as u32 + 1;
            if signed < quorum {
                assert!(
                    matches!(
                        n.ledger.approve(d, subject).unwrap_err(),
                        LedgerError::QuorumNotMet { .. }
                    ),
                    "approval passed below quorum {quorum} with {signed} signatures"
                );
            }
        }
        n.ledger.approve(d, subject).unwrap();
        assert!(n.ledger.verify(subject, d).unwrap());
    }
}

#[test]
fn revocation_blocks_reissue_and_verification() {
    let n = notary(1, 1);
    let subject = Identity::new();
    let d1 = digest("d1");

    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    n.ledger.approve(d1, subject).unwrap();
    n.ledger.revoke(d1, "compromised", n.registrars[0]).unwrap();

    assert!(!n.ledger.verify(subject, d1).unwrap());
    assert!(matches!(
        n.ledger
            .issue(subject, d1, Digest::zero(), vec![], n.registrars[0])
            .unwrap_err(),
        LedgerError::AlreadyRevoked { .. }
    ));
}

#[test]
fn record_identity_fields_are_append_only() {
    let n = notary(3, 3);
    let subject = Identity::new();
    let d1 = digest("d1");

    let created = n
        .ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    n.clock.advance();
    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[1])
        .unwrap();
    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[2])
        .unwrap();

    let latest = n.ledger.record(d1).unwrap();
    assert_eq!(latest.subject, created.subject);
    assert_eq!(latest.nonce, created.nonce);
    assert_eq!(latest.inserted_at, created.inserted_at);
    assert_eq!(latest.logical_time, created.logical_time);
    assert_eq!(latest.signed_count, 3);
}

#[test]
fn nonces_follow_issuance_order_across_subjects() {
    let n = notary(1, 1);
    let alice = Identity::new();
    let bob = Identity::new();

    let a0 = n
        .ledger
        .issue(alice, digest("a0"), Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    let b0 = n
        .ledger
        .issue(bob, digest("b0"), Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    n.clock.advance();
    let a1 = n
        .ledger
        .issue(alice, digest("a1"), Digest::zero(), vec![], n.registrars[0])
        .unwrap();

    assert_eq!(a0.nonce, 0);
    assert_eq!(b0.nonce, 0);
    assert_eq!(a1.nonce, 1);
}

#[test]
fn audit_trail_covers_every_state_change() {
    let n = notary(2, 2);
    let subject = Identity::new();
    let d1 = digest("d1");

    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[0])
        .unwrap();
    n.ledger
        .issue(subject, d1, Digest::zero(), vec![], n.registrars[1])
        .unwrap();
    n.ledger.approve(d1, subject).unwrap();
    n.ledger.revoke(d1, "superseded", subject).unwrap();

    let events = n.sink.events();
    let names: Vec<&str> = events
        .iter()
        .map(|e| match e {
            LedgerEvent::CredentialIssued { .. } => "issued",
            LedgerEvent::CredentialSigned { .. } => "signed",
            LedgerEvent::CredentialApproved { .. } => "approved",
            LedgerEvent::CredentialRevoked { .. } => "revoked",
            _ => "other",
        })
        .collect();
    assert_eq!(names, vec!["issued", "signed", "approved", "revoked"]);
}
