//! # Principal and Node Identifiers
//!
//! Newtype wrappers for the two identifier namespaces in the stack.
//! An `Identity` names a principal (registrar, subject, revoker); a
//! `NodeId` addresses an issuer node in the credential tree. The types are
//! deliberately not interchangeable: passing a principal where a node is
//! expected is a compile error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A principal: any party that calls into a ledger as registrar, subject,
/// or revoker.
///
/// Identity is resolved once at the host boundary and threaded explicitly
/// through every operation. The core never reads ambient caller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub Uuid);

/// An issuer node in the credential tree, addressed by opaque identifier
/// rather than by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl Identity {
    /// Generate a new random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeId {
    /// Generate a new random node identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id:{}", self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}
