//! # credence-aggregate — Root Aggregation
//!
//! Folds an ordered list of credential digests (or witness roots) into a
//! single aggregate root, and stores one root per subject for later
//! verification.
//!
//! The fold is deterministic and order-sensitive: the list reflects
//! issuance order and is never sorted. Aggregation is explicit; a stored
//! root only changes when a caller re-aggregates.

pub mod root;

pub use root::{compute_root, verify_root, AggregateError, AggregateRoot, RootRegistry};
