//! # The Credential Tree
//!
//! An arena of issuer nodes addressed by [`NodeId`]. The tree owns node
//! construction, quorum-gated child admission, witness-backed
//! registration, per-node aggregation, and recursive verification.
//!
//! ## Verification Protocol
//!
//! `verify_tree` walks pre-order. At each node it snapshots the subject's
//! history, checks the locally stored root (when one exists) against a
//! recomputation, checks every credential's approval and revocation
//! state, and for witnessed credentials descends into each witness: a
//! Leaf witness must hold a self-consistent root, an Inner witness is
//! verified recursively. Finally the collected witness roots must re-hash
//! to the credential's stored evidence root. The walk short-circuits to
//! `false` on the first failure; structural faults (missing history,
//! missing witness root, exceeded bounds) are errors, never a `false`
//! verdict.
//!
//! ## Re-entrancy
//!
//! Witness data is fetched into local snapshots before any local
//! mutation, and all cross-node calls are read-only. No witness can call
//! back into the registering node mid-operation.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;

use credence_aggregate::{compute_root, verify_root, RootRegistry};
use credence_core::{
    Digest, EventSink, Identity, LedgerEvent, LogicalClock, NodeId, SystemClock, TracingSink,
};
use credence_ledger::{AccessGuard, CredentialRecord, NotaryLedger};

use crate::error::TreeError;
use crate::node::{NodeHandle, NodeRole, NotaryNode};

/// Bounds on verification fan-out and recursion.
///
/// Exceeding a bound is a structural error: the tree is malformed or
/// hostile, not invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyLimits {
    /// Maximum recursion depth for `verify_tree`.
    pub max_depth: usize,
    /// Maximum witnesses per credential.
    pub max_witnesses: usize,
}

impl Default for VerifyLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_witnesses: 64,
        }
    }
}

/// The arena of issuer nodes.
pub struct CredentialTree {
    nodes: DashMap<NodeId, NodeHandle>,
    clock: Arc<dyn LogicalClock>,
    sink: Arc<dyn EventSink>,
    limits: VerifyLimits,
}

impl CredentialTree {
    /// Create an empty tree with the epoch-seconds clock, tracing sink,
    /// and default bounds.
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
            limits: VerifyLimits::default(),
        }
    }

    /// Replace the logical clock used by nodes created after this call.
    pub fn with_clock(mut self, clock: Arc<dyn LogicalClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the event sink used by nodes created after this call.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the verification bounds.
    pub fn with_limits(mut self, limits: VerifyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Create a node with the given role and access guard, returning its
    /// arena identifier.
    pub fn add_node(&self, role: NodeRole, guard: Arc<dyn AccessGuard>) -> NodeId {
        let id = NodeId::new();
        let ledger = NotaryLedger::new(guard)
            .with_clock(self.clock.clone())
            .with_sink(self.sink.clone());
        let roots = RootRegistry::new()
            .with_clock(self.clock.clone())
            .with_sink(self.sink.clone());
        self.nodes
            .insert(id, Arc::new(NotaryNode::new(id, role, ledger, roots)));
        id
    }

    /// Shared handle to a node.
    pub fn node(&self, id: NodeId) -> Result<NodeHandle, TreeError> {
        self.nodes
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(TreeError::UnknownNode { node: id })
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Admit `child` under `node`.
    ///
    /// Registrar-gated on the parent's ledger. The admission runs a
    /// reachability check from the candidate child back to the parent, so
    /// the child graph stays acyclic; `SelfReference` is the degenerate
    /// case of the same rule.
    pub fn add_child(&self, node: NodeId, child: NodeId, caller: Identity) -> Result<(), TreeError> {
        let parent = self.node(node)?;
        if !parent.ledger().is_registrar(&caller) {
            return Err(TreeError::Unauthorized { node, caller });
        }
        if parent.role() != NodeRole::Inner {
            return Err(TreeError::NotInnerRole { node });
        }
        if child == node {
            return Err(TreeError::SelfReference { node });
        }
        let child_handle = self.node(child)?;
        if parent.has_child(&child) {
            return Err(TreeError::AlreadyChild { node, child });
        }
        if self.reaches(child_handle, node)? {
            return Err(TreeError::CycleDetected { node, child });
        }

        parent.push_child(child);
        self.sink.emit(LedgerEvent::NodeAdded {
            parent: node,
            child,
            logical_time: self.clock.now(),
        });
        Ok(())
    }

    /// Whether `target` is reachable from `start` along child edges.
    fn reaches(&self, start: NodeHandle, target: NodeId) -> Result<bool, TreeError> {
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if current.id() == target {
                return Ok(true);
            }
            if !visited.insert(current.id()) {
                continue;
            }
            for child in current.children() {
                stack.push(self.node(child)?);
            }
        }
        Ok(false)
    }

    /// Issue a non-witnessed credential on a node's ledger.
    pub fn register_leaf(
        &self,
        node: NodeId,
        subject: Identity,
        digest: Digest,
        caller: Identity,
    ) -> Result<CredentialRecord, TreeError> {
        let handle = self.node(node)?;
        Ok(handle
            .ledger()
            .issue(subject, digest, Digest::zero(), Vec::new(), caller)?)
    }

    /// Issue a credential backed by witness evidence.
    ///
    /// Every witness must be a registered child that has already
    /// aggregated a root for the subject. The witness roots are fetched
    /// into a local snapshot first; only then is the evidence root folded
    /// and the local ledger mutated.
    pub fn register_with_witnesses(
        &self,
        node: NodeId,
        subject: Identity,
        digest: Digest,
        witnesses: Vec<NodeId>,
        caller: Identity,
    ) -> Result<CredentialRecord, TreeError> {
        let handle = self.node(node)?;
        if witnesses.is_empty() {
            return Err(TreeError::NoWitnesses);
        }
        if witnesses.len() > self.limits.max_witnesses {
            return Err(TreeError::WitnessBoundExceeded {
                limit: self.limits.max_witnesses,
            });
        }

        let mut witness_roots = Vec::with_capacity(witnesses.len());
        for witness in &witnesses {
            if !handle.has_child(witness) {
                return Err(TreeError::UnauthorizedWitness {
                    node,
                    witness: *witness,
                });
            }
            let witness_handle = self.node(*witness)?;
            let stored = witness_handle
                .roots()
                .root(subject)
                .ok_or(TreeError::WitnessRootNotFound {
                    witness: *witness,
                    subject,
                })?;
            witness_roots.push(stored.proof);
        }

        let evidence_root = compute_root(&witness_roots)?;
        Ok(handle
            .ledger()
            .issue(subject, digest, evidence_root, witnesses, caller)?)
    }

    /// Fold the subject's digest history into the node's stored root.
    ///
    /// Every credential in the history must be approved and unrevoked; an
    /// unfinished or revoked credential poisons the aggregation.
    pub fn aggregate(&self, node: NodeId, subject: Identity) -> Result<Digest, TreeError> {
        let handle = self.node(node)?;
        let history = handle.ledger().history(subject)?;
        for (record, valid) in history.records.iter().zip(&history.valid) {
            if !valid {
                return Err(TreeError::UnsignedCredentialPresent {
                    digest: record.digest,
                });
            }
        }
        Ok(handle
            .roots()
            .generate_root(subject, &history.digests())?)
    }

    /// Check a node's stored root against its own ledger history.
    ///
    /// # Errors
    ///
    /// `NoCredentials` when the subject has no history at the node,
    /// `RootNotFound` when the node has never aggregated for the subject.
    pub fn verify_node_root(&self, node: NodeId, subject: Identity) -> Result<bool, TreeError> {
        let handle = self.node(node)?;
        let history = handle.ledger().history(subject)?;
        Ok(handle
            .roots()
            .verify_self_root(subject, &history.digests())?)
    }

    /// Verify the subject's credentials across the whole subtree rooted
    /// at `node`.
    ///
    /// Returns `Ok(false)` on the first invalid credential, root
    /// mismatch, or evidence mismatch anywhere in the subtree. Structural
    /// faults surface as errors.
    pub fn verify_tree(&self, node: NodeId, subject: Identity) -> Result<bool, TreeError> {
        self.verify_node(node, subject, 0)
    }

    fn verify_node(&self, node: NodeId, subject: Identity, depth: usize) -> Result<bool, TreeError> {
        if depth >= self.limits.max_depth {
            return Err(TreeError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        let handle = self.node(node)?;

        // Per-node snapshot: the history and the stored root are read
        // before any descent, so a concurrent re-aggregation below does
        // not tear this node's view.
        let history = handle.ledger().history(subject)?;
        let digests = history.digests();

        if let Some(stored) = handle.roots().root(subject) {
            if !verify_root(stored.proof, &digests)? {
                tracing::debug!(%node, %subject, "stored root does not match digest history");
                return Ok(false);
            }
        }

        for (record, valid) in history.records.iter().zip(&history.valid) {
            if !valid {
                return Ok(false);
            }
            if !record.is_witnessed() {
                continue;
            }
            if record.witnesses.len() > self.limits.max_witnesses {
                return Err(TreeError::WitnessBoundExceeded {
                    limit: self.limits.max_witnesses,
                });
            }

            let mut witness_roots = Vec::with_capacity(record.witnesses.len());
            for witness in &record.witnesses {
                let witness_handle = self.node(*witness)?;
                let stored = witness_handle
                    .roots()
                    .root(subject)
                    .ok_or(TreeError::WitnessRootNotFound {
                        witness: *witness,
                        subject,
                    })?;

                match witness_handle.role() {
                    NodeRole::Leaf => {
                        let witness_history = witness_handle.ledger().history(subject)?;
                        if !verify_root(stored.proof, &witness_history.digests())? {
                            return Ok(false);
                        }
                    }
                    NodeRole::Inner => {
                        if !self.verify_node(*witness, subject, depth + 1)? {
                            return Ok(false);
                        }
                    }
                }
                witness_roots.push(stored.proof);
            }

            if compute_root(&witness_roots)? != record.evidence_root {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl Default for CredentialTree {
    fn default() -> Self {
        Self::new()
    }
}
