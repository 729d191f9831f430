//! # Aggregate Roots
//!
//! ## Root Derivation
//!
//! ```text
//! root = SHA256(0x02 || len_be(n) || (0x03 || d_0) || ... || (0x03 || d_n-1))
//! ```
//!
//! Domain-separated SHA-256 over the ordered digest list: a list-header
//! tag, the big-endian element count, and a per-element tag before each
//! 32-byte digest. Fixed-width elements plus the length prefix make the
//! encoding unambiguous; the tags keep list folds from colliding with any
//! other hashing domain in the stack.
//!
//! ## Integrity Invariants
//!
//! - The empty list has no root; aggregation over it is an error.
//! - Reordering or modifying any element changes the root.
//! - One [`AggregateRoot`] per subject; re-aggregation replaces it.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use credence_core::{
    Digest, ErrorKind, EventSink, Identity, LedgerEvent, LogicalClock, SystemClock, Timestamp,
    TracingSink,
};

const TAG_LIST: u8 = 0x02;
const TAG_ELEMENT: u8 = 0x03;

/// Errors from aggregation operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Aggregation over an empty digest list.
    #[error("cannot aggregate an empty digest list")]
    EmptyList,

    /// No aggregate root is stored for the subject.
    #[error("no aggregate root stored for subject {subject}")]
    RootNotFound {
        /// The subject without a stored root.
        subject: Identity,
    },
}

impl AggregateError {
    /// The stable machine-checkable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyList => ErrorKind::StructuralViolation,
            Self::RootNotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Compute the aggregate root of an ordered digest list.
///
/// # Errors
///
/// Returns [`AggregateError::EmptyList`] for an empty input.
pub fn compute_root(digests: &[Digest]) -> Result<Digest, AggregateError> {
    if digests.is_empty() {
        return Err(AggregateError::EmptyList);
    }
    let mut hasher = Sha256::new();
    hasher.update([TAG_LIST]);
    hasher.update((digests.len() as u64).to_be_bytes());
    for digest in digests {
        hasher.update([TAG_ELEMENT]);
        hasher.update(digest.as_bytes());
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    Ok(Digest::from_bytes(bytes))
}

/// Check a third-party root against a local recomputation.
///
/// Pure and stateless; used to validate roots supplied by witnesses.
pub fn verify_root(root: Digest, digests: &[Digest]) -> Result<bool, AggregateError> {
    Ok(compute_root(digests)? == root)
}

/// A stored aggregate root with its insertion metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRoot {
    /// The folded root value.
    pub proof: Digest,
    /// Wall-clock time of the aggregation.
    pub inserted_at: Timestamp,
    /// Logical instant of the aggregation.
    pub logical_time: u64,
}

/// Per-subject aggregate-root store for one issuer node.
pub struct RootRegistry {
    clock: Arc<dyn LogicalClock>,
    sink: Arc<dyn EventSink>,
    roots: RwLock<BTreeMap<Identity, AggregateRoot>>,
}

impl RootRegistry {
    /// Create a registry with the epoch-seconds clock and tracing sink.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
            roots: RwLock::new(BTreeMap::new()),
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

    /// Fold the digest list and store the result as the subject's root,
    /// replacing any previous root.
    pub fn generate_root(
        &self,
        subject: Identity,
        digests: &[Digest],
    ) -> Result<Digest, AggregateError> {
        let proof = compute_root(digests)?;
        let logical_time = self.clock.now();
        {
            let mut roots = self.roots.write();
            roots.insert(
                subject,
                AggregateRoot {
                    proof,
                    inserted_at: Timestamp::now(),
                    logical_time,
                },
            );
        }
        self.sink.emit(LedgerEvent::RootAggregated {
            subject,
            root: proof,
            digest_count: digests.len() as u64,
            logical_time,
        });
        Ok(proof)
    }

    /// Compare the stored root against a recomputation from the given
    /// digest list.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::RootNotFound`] when the subject has no
    /// stored root, and [`AggregateError::EmptyList`] for an empty list.
    pub fn verify_self_root(
        &self,
        subject: Identity,
        digests: &[Digest],
    ) -> Result<bool, AggregateError> {
        let stored = self
            .root(subject)
            .ok_or(AggregateError::RootNotFound { subject })?;
        verify_root(stored.proof, digests)
    }

    /// The stored root for a subject, if any.
    pub fn root(&self, subject: Identity) -> Option<AggregateRoot> {
        self.roots.read().get(&subject).copied()
    }
}

impl Default for RootRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_core::{sha256_digest, CanonicalBytes, ManualClock, RecordingSink};

    fn digest(tag: &str) -> Digest {
        sha256_digest(&CanonicalBytes::new(&tag).unwrap())
    }

    #[test]
    fn empty_list_rejected() {
        assert!(matches!(compute_root(&[]), Err(AggregateError::EmptyList)));
        assert_eq!(AggregateError::EmptyList.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn deterministic_and_order_sensitive() {
        let d1 = digest("d1");
        let d2 = digest("d2");
        let forward = compute_root(&[d1, d2]).unwrap();
        assert_eq!(compute_root(&[d1, d2]).unwrap(), forward);
        assert_ne!(compute_root(&[d2, d1]).unwrap(), forward);
    }

    #[test]
    fn single_element_differs_from_element() {
        let d1 = digest("d1");
        assert_ne!(compute_root(&[d1]).unwrap(), d1);
    }

    #[test]
    fn length_extension_shapes_differ() {
        // [a, b] must not collide with [a] followed by anything derivable.
        let a = digest("a");
        let b = digest("b");
        assert_ne!(compute_root(&[a]).unwrap(), compute_root(&[a, b]).unwrap());
    }

    #[test]
    fn verify_root_is_pure_comparison() {
        let d1 = digest("d1");
        let root = compute_root(&[d1]).unwrap();
        assert!(verify_root(root, &[d1]).unwrap());
        assert!(!verify_root(root, &[digest("d2")]).unwrap());
        assert!(verify_root(root, &[]).is_err());
    }

    #[test]
    fn registry_stores_and_replaces() {
        let clock = Arc::new(ManualClock::starting_at(5));
        let registry = RootRegistry::new().with_clock(clock.clone());
        let subject = Identity::new();
        let d1 = digest("d1");
        let d2 = digest("d2");

        let r1 = registry.generate_root(subject, &[d1]).unwrap();
        assert_eq!(registry.root(subject).unwrap().proof, r1);
        assert_eq!(registry.root(subject).unwrap().logical_time, 5);

        // Same input, same root.
        assert_eq!(registry.generate_root(subject, &[d1]).unwrap(), r1);

        clock.advance();
        let r2 = registry.generate_root(subject, &[d1, d2]).unwrap();
        assert_ne!(r2, r1);
        assert_eq!(registry.root(subject).unwrap().proof, r2);
        assert_eq!(registry.root(subject).unwrap().logical_time, 6);
    }

    #[test]
    fn verify_self_root_requires_stored_root() {
        let registry = RootRegistry::new();
        let subject = Identity::new();
        assert!(matches!(
            registry.verify_self_root(subject, &[digest("d1")]),
            Err(AggregateError::RootNotFound { .. })
        ));
    }

    #[test]
    fn verify_self_root_detects_divergence() {
        let registry = RootRegistry::new();
        let subject = Identity::new();
        let d1 = digest("d1");
        registry.generate_root(subject, &[d1]).unwrap();

        assert!(registry.verify_self_root(subject, &[d1]).unwrap());
        assert!(!registry.verify_self_root(subject, &[d1, digest("d2")]).unwrap());
    }

    #[test]
    fn aggregation_emits_event() {
        let sink = Arc::new(RecordingSink::new());
        let registry = RootRegistry::new().with_sink(sink.clone());
        let subject = Identity::new();
        registry.generate_root(subject, &[digest("d1")]).unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            LedgerEvent::RootAggregated { digest_count: 1, .. }
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_digest() -> impl Strategy<Value = Digest> {
        any::<[u8; 32]>().prop_map(Digest::from_bytes)
    }

    proptest! {
        #[test]
        fn root_is_deterministic(digests in prop::collection::vec(arb_digest(), 1..32)) {
            prop_assert_eq!(
                compute_root(&digests).unwrap(),
                compute_root(&digests).unwrap()
            );
        }

        #[test]
        fn any_swap_changes_the_root(
            digests in prop::collection::vec(arb_digest(), 2..16),
            a in 0usize..16,
            b in 0usize..16,
        ) {
            let a = a % digests.len();
            let b = b % digests.len();
            prop_assume!(a != b && digests[a] != digests[b]);

            let mut swapped = digests.clone();
            swapped.swap(a, b);
            prop_assert_ne!(
                compute_root(&digests).unwrap(),
                compute_root(&swapped).unwrap()
            );
        }

        #[test]
        fn any_mutation_changes_the_root(
            digests in prop::collection::vec(arb_digest(), 1..16),
            index in 0usize..16,
            replacement in arb_digest(),
        ) {
            let index = index % digests.len();
            prop_assume!(digests[index] != replacement);

            let mut mutated = digests.clone();
            mutated[index] = replacement;
            prop_assert_ne!(
                compute_root(&digests).unwrap(),
                compute_root(&mutated).unwrap()
            );
        }
    }
}
