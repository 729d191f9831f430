//! # Tree Errors
//!
//! Wraps ledger and aggregation errors without discarding their stable
//! kinds, and adds the structural failures specific to tree composition.

use thiserror::Error;

use credence_aggregate::AggregateError;
use credence_core::{Digest, ErrorKind, Identity, NodeId};
use credence_ledger::LedgerError;

/// Errors surfaced by credential-tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The node identifier is not in the arena.
    #[error("node {node} is not registered in this tree")]
    UnknownNode {
        /// The unknown identifier.
        node: NodeId,
    },

    /// A witnessed registration was attempted with an empty witness list.
    #[error("inner-node registration requires at least one witness")]
    NoWitnesses,

    /// A named witness is not a child of the registering node.
    #[error("witness {witness} is not a child of node {node}")]
    UnauthorizedWitness {
        /// The registering node.
        node: NodeId,
        /// The rejected witness.
        witness: NodeId,
    },

    /// A witness has not aggregated a root for the subject yet.
    ///
    /// Children must aggregate before the parent issues or verifies.
    #[error("witness {witness} holds no aggregate root for subject {subject}")]
    WitnessRootNotFound {
        /// The witness without a root.
        witness: NodeId,
        /// The subject in question.
        subject: Identity,
    },

    /// A digest in the subject's history is not yet approved, or revoked.
    #[error("credential {digest} is not approved for aggregation")]
    UnsignedCredentialPresent {
        /// The offending digest.
        digest: Digest,
    },

    /// Child admission on a Leaf node.
    #[error("node {node} is a leaf and cannot take children")]
    NotInnerRole {
        /// The leaf node.
        node: NodeId,
    },

    /// A node was named as its own child.
    #[error("node {node} cannot be its own child")]
    SelfReference {
        /// The self-referencing node.
        node: NodeId,
    },

    /// The child is already registered.
    #[error("node {child} is already a child of {node}")]
    AlreadyChild {
        /// The parent node.
        node: NodeId,
        /// The duplicate child.
        child: NodeId,
    },

    /// Admitting the child would close a cycle.
    #[error("admitting {child} under {node} would create a cycle")]
    CycleDetected {
        /// The parent node.
        node: NodeId,
        /// The rejected child.
        child: NodeId,
    },

    /// The caller is not a registrar on the node's ledger.
    #[error("caller {caller} is not a registrar on node {node}")]
    Unauthorized {
        /// The node whose guard rejected the caller.
        node: NodeId,
        /// The rejected caller.
        caller: Identity,
    },

    /// Verification descended past the depth bound.
    #[error("verification exceeded the depth bound of {limit}")]
    DepthExceeded {
        /// The configured bound.
        limit: usize,
    },

    /// A witness list exceeds the fan-out bound.
    #[error("witness list exceeds the bound of {limit}")]
    WitnessBoundExceeded {
        /// The configured bound.
        limit: usize,
    },

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// An aggregation operation failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl TreeError {
    /// The stable machine-checkable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownNode { .. } | Self::WitnessRootNotFound { .. } => ErrorKind::NotFound,
            Self::NoWitnesses
            | Self::NotInnerRole { .. }
            | Self::DepthExceeded { .. }
            | Self::WitnessBoundExceeded { .. } => ErrorKind::StructuralViolation,
            Self::UnauthorizedWitness { .. }
            | Self::SelfReference { .. }
            | Self::Unauthorized { .. } => ErrorKind::AuthorizationFailure,
            Self::AlreadyChild { .. }
            | Self::CycleDetected { .. }
            | Self::UnsignedCredentialPresent { .. } => ErrorKind::StateConflict,
            Self::Ledger(e) => e.kind(),
            Self::Aggregate(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_kind() {
        let ledger = TreeError::from(LedgerError::NotFound {
            digest: Digest::zero(),
        });
        assert_eq!(ledger.kind(), ErrorKind::NotFound);

        let aggregate = TreeError::from(AggregateError::EmptyList);
        assert_eq!(aggregate.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn structural_bounds_classified() {
        assert_eq!(
            TreeError::DepthExceeded { limit: 32 }.kind(),
            ErrorKind::StructuralViolation
        );
        assert_eq!(
            TreeError::CycleDetected {
                node: NodeId::new(),
                child: NodeId::new()
            }
            .kind(),
            ErrorKind::StateConflict
        );
    }
}
