//! # credence-core — Foundational Types for the Credence Stack
//!
//! Defines the primitives every other crate in the workspace builds on:
//! canonical byte production, content digests, principal and node
//! identifiers, wall-clock and logical time, the error-kind taxonomy, and
//! the domain-event channel.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Identity`, `NodeId`,
//!    `Digest`. No bare strings or raw UUIDs cross a crate boundary.
//!
//! 2. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()`. `sha256_digest()` accepts only
//!    `&CanonicalBytes`, so a digest over non-canonical bytes cannot be
//!    produced anywhere in the workspace.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision. Logical time is a separate `u64` dimension owned
//!    by each ledger's `LogicalClock`.
//!
//! 4. **Stable error codes.** Every error in the workspace maps onto one
//!    of four `ErrorKind` values that hosts can match on without parsing
//!    messages.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credence-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod event;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, Digest};
pub use error::{CanonicalizationError, ErrorKind};
pub use event::{EventSink, LedgerEvent, RecordingSink, TracingSink};
pub use identity::{Identity, NodeId};
pub use temporal::{LogicalClock, ManualClock, SystemClock, Timestamp};
