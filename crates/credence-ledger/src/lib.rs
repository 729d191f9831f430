//! # credence-ledger — The Notary Ledger
//!
//! An append-only store of credential proofs per subject, owning the
//! issuance, multi-registrar signing, approval, and revocation state
//! transitions.
//!
//! ## State Machine
//!
//! ```text
//! NonExistent ──issue──▶ PartiallySigned ──sign──▶ QuorumReached ──approve──▶ Approved
//!                              │                        │                        │
//!                              └────────────────────────┴───────────revoke──────┴──▶ Revoked (terminal)
//! ```
//!
//! ## Invariants
//!
//! - Records are never deleted. Revocation adds a marker record and blocks
//!   all further transitions on the digest; the credential record itself is
//!   immutable from that point on.
//! - `approved` moves false to true at most once.
//! - Nonces are assigned from the subject's prior credential count and the
//!   per-subject digest list is strictly append-only.
//! - A failed call leaves state exactly as if it never ran.
//!
//! ## Concurrency
//!
//! All mutating operations on a ledger serialize through one write lock.
//! Verification takes a read lock and observes a consistent snapshot.

pub mod error;
pub mod guard;
pub mod ledger;
pub mod record;

pub use error::LedgerError;
pub use guard::{AccessGuard, GuardError, IssuanceWindow, RegistrarRoster};
pub use ledger::{NotaryLedger, SubjectHistory};
pub use record::{CredentialRecord, CredentialStatus, RevocationRecord};
