//! # credence-tree — The Credential Tree
//!
//! Composes notary ledgers into a hierarchy of issuer nodes. A **Leaf**
//! node is a terminal issuer; an **Inner** node issues credentials backed
//! by witness evidence: the aggregate roots its children independently
//! hold for the same subject, folded into an evidence root stored on the
//! credential record.
//!
//! Verification walks the tree pre-order, recomputing and comparing roots
//! at every level, so a root authority can trust proofs rooted in
//! subordinate authorities without re-executing their internal logic.
//!
//! Nodes are addressed by opaque [`NodeId`]s in an arena, never by
//! reference; child admission runs a reachability check so the child
//! graph stays acyclic by construction.
//!
//! [`NodeId`]: credence_core::NodeId

pub mod error;
pub mod node;
pub mod tree;

pub use error::TreeError;
pub use node::{NodeRole, NotaryNode};
pub use tree::{CredentialTree, VerifyLimits};
