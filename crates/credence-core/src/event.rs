//! # Domain Events
//!
//! Every state-changing operation in the stack emits exactly one
//! [`LedgerEvent`] carrying the operation's key fields and its logical
//! timestamp. The event channel is the only sanctioned way to observe
//! internal state changes from outside the core: hosts subscribe through
//! an [`EventSink`], never by reading ledger internals.
//!
//! Events are emitted after the mutation commits, so a sink never sees an
//! event for an operation that failed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::identity::{Identity, NodeId};

/// A state change observed on a ledger, registry, or tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new credential record was created.
    CredentialIssued {
        /// The credential digest.
        digest: Digest,
        /// The credential subject.
        subject: Identity,
        /// The registrar that created the record.
        registrar: Identity,
        /// The per-subject nonce assigned to the record.
        nonce: u64,
        /// Logical instant of the insertion.
        logical_time: u64,
    },
    /// A registrar signed an existing credential.
    CredentialSigned {
        /// The credential digest.
        digest: Digest,
        /// The signing registrar.
        registrar: Identity,
        /// Signature count after this signing.
        signed_count: u32,
        /// Logical instant of the signing.
        logical_time: u64,
    },
    /// The subject approved a credential that reached quorum.
    CredentialApproved {
        /// The credential digest.
        digest: Digest,
        /// The approving subject.
        subject: Identity,
        /// Logical instant of the approval.
        logical_time: u64,
    },
    /// A credential was revoked.
    CredentialRevoked {
        /// The credential digest.
        digest: Digest,
        /// The credential subject.
        subject: Identity,
        /// The revoking party (registrar or subject).
        revoker: Identity,
        /// Logical instant of the revocation.
        logical_time: u64,
    },
    /// An aggregate root was computed and stored for a subject.
    RootAggregated {
        /// The subject whose history was folded.
        subject: Identity,
        /// The resulting root.
        root: Digest,
        /// How many digests were folded.
        digest_count: u64,
        /// Logical instant of the aggregation.
        logical_time: u64,
    },
    /// A child node was admitted under an inner node.
    NodeAdded {
        /// The parent node.
        parent: NodeId,
        /// The admitted child.
        child: NodeId,
        /// Logical instant of the admission.
        logical_time: u64,
    },
}

/// Receiver of domain events.
///
/// Sinks must not call back into the emitting ledger; emission happens
/// while no locks are held, but re-entrant mutation would interleave with
/// the host's own serialization discipline.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: LedgerEvent);
}

/// Sink that retains every event in order, for audit subscription and
/// tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far, in emission order.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: LedgerEvent) {
        self.events.lock().push(event);
    }
}

/// Sink that forwards events to `tracing` at info level.
///
/// This is the default sink for hosts that only want log-style
/// observability.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: LedgerEvent) {
        match &event {
            LedgerEvent::CredentialIssued {
                digest,
                subject,
                registrar,
                nonce,
                logical_time,
            } => tracing::info!(
                %digest, %subject, %registrar, nonce, logical_time,
                "credential issued"
            ),
            LedgerEvent::CredentialSigned {
                digest,
                registrar,
                signed_count,
                logical_time,
            } => tracing::info!(
                %digest, %registrar, signed_count, logical_time,
                "credential signed"
            ),
            LedgerEvent::CredentialApproved {
                digest,
                subject,
                logical_time,
            } => tracing::info!(%digest, %subject, logical_time, "credential approved"),
            LedgerEvent::CredentialRevoked {
                digest,
                subject,
                revoker,
                logical_time,
            } => tracing::info!(%digest, %subject, %revoker, logical_time, "credential revoked"),
            LedgerEvent::RootAggregated {
                subject,
                root,
                digest_count,
                logical_time,
            } => tracing::info!(%subject, %root, digest_count, logical_time, "root aggregated"),
            LedgerEvent::NodeAdded {
                parent,
                child,
                logical_time,
            } => tracing::info!(%parent, %child, logical_time, "node added"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_retains_order() {
        let sink = RecordingSink::new();
        let subject = Identity::new();
        let registrar = Identity::new();
        let digest = Digest::zero();

        sink.emit(LedgerEvent::CredentialIssued {
            digest,
            subject,
            registrar,
            nonce: 0,
            logical_time: 1,
        });
        sink.emit(LedgerEvent::CredentialApproved {
            digest,
            subject,
            logical_time: 2,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], LedgerEvent::CredentialIssued { .. }));
        assert!(matches!(events[1], LedgerEvent::CredentialApproved { .. }));
    }

    #[test]
    fn event_serde_uses_snake_case_tag() {
        let event = LedgerEvent::NodeAdded {
            parent: NodeId::new(),
            child: NodeId::new(),
            logical_time: 7,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "node_added");
        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn tracing_sink_accepts_all_variants() {
        let sink = TracingSink;
        sink.emit(LedgerEvent::RootAggregated {
            subject: Identity::new(),
            root: Digest::zero(),
            digest_count: 3,
            logical_time: 9,
        });
    }
}
