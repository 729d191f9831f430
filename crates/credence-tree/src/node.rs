//! # Issuer Nodes
//!
//! A node couples one notary ledger with one root registry under a fixed
//! role. Dispatch on [`NodeRole`] is static: verification and
//! registration match on the role enum instead of probing a peer for
//! capabilities at runtime.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use credence_aggregate::RootRegistry;
use credence_core::NodeId;
use credence_ledger::NotaryLedger;

/// The role of an issuer node in the credential tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Terminal issuer: no children, credentials carry no witnesses.
    Leaf,
    /// Aggregating issuer: issues credentials backed by child roots.
    Inner,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Leaf => "LEAF",
            Self::Inner => "INNER",
        };
        f.write_str(s)
    }
}

/// One issuer node: a ledger, a root registry, and (for Inner nodes) a
/// child list.
///
/// Topology is immutable except for quorum-gated child admission through
/// the owning tree.
pub struct NotaryNode {
    id: NodeId,
    role: NodeRole,
    ledger: NotaryLedger,
    roots: RootRegistry,
    children: RwLock<Vec<NodeId>>,
}

impl NotaryNode {
    pub(crate) fn new(id: NodeId, role: NodeRole, ledger: NotaryLedger, roots: RootRegistry) -> Self {
        Self {
            id,
            role,
            ledger,
            roots,
            children: RwLock::new(Vec::new()),
        }
    }

    /// The node's arena identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's role.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// The node's notary ledger.
    pub fn ledger(&self) -> &NotaryLedger {
        &self.ledger
    }

    /// The node's aggregate-root registry.
    pub fn roots(&self) -> &RootRegistry {
        &self.roots
    }

    /// Snapshot of the child list.
    pub fn children(&self) -> Vec<NodeId> {
        self.children.read().clone()
    }

    /// Whether the node lists the identifier as a child.
    pub fn has_child(&self, child: &NodeId) -> bool {
        self.children.read().contains(child)
    }

    pub(crate) fn push_child(&self, child: NodeId) {
        self.children.write().push(child);
    }
}

/// Shared handle to a node in the arena.
pub(crate) type NodeHandle = Arc<NotaryNode>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display() {
        assert_eq!(NodeRole::Leaf.to_string(), "LEAF");
        assert_eq!(NodeRole::Inner.to_string(), "INNER");
    }
}
