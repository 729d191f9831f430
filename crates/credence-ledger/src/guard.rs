//! # Access and Issuance Guards
//!
//! The ledger does not manage registrar membership itself; it consults an
//! [`AccessGuard`] at each call. [`RegistrarRoster`] is the supplied
//! implementation: a rotating set of registrar identities plus a quorum
//! size. [`IssuanceWindow`] is the thin time gate some deployments wrap
//! around issuance.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use credence_core::{ErrorKind, Identity, Timestamp};

/// Errors from guard configuration and rotation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The quorum must be at least 1 and at most the roster size.
    #[error("quorum {quorum} is invalid for a roster of {roster_size}")]
    InvalidQuorum {
        /// The rejected quorum.
        quorum: u32,
        /// Current roster size.
        roster_size: usize,
    },

    /// The identity is already on the roster.
    #[error("identity {identity} is already a registrar")]
    AlreadyRegistrar {
        /// The duplicate identity.
        identity: Identity,
    },

    /// The identity is not on the roster.
    #[error("identity {identity} is not a registrar")]
    UnknownRegistrar {
        /// The unknown identity.
        identity: Identity,
    },

    /// The window bounds are inverted or empty.
    #[error("issuance window closes at or before it opens")]
    EmptyWindow,
}

impl GuardError {
    /// The stable machine-checkable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuorum { .. } | Self::EmptyWindow => ErrorKind::StructuralViolation,
            Self::AlreadyRegistrar { .. } => ErrorKind::StateConflict,
            Self::UnknownRegistrar { .. } => ErrorKind::NotFound,
        }
    }
}

/// Read-mostly registrar membership and quorum configuration.
///
/// The data may be cached per call; rotation writes are excluded from
/// concurrent credential operations by the ledger's lock discipline.
pub trait AccessGuard: Send + Sync {
    /// Whether the identity is an authorized registrar.
    fn is_registrar(&self, identity: &Identity) -> bool;

    /// Minimum number of distinct registrar signatures required before a
    /// subject may approve.
    fn quorum_size(&self) -> u32;
}

#[derive(Debug)]
struct RosterState {
    registrars: BTreeSet<Identity>,
    quorum: u32,
}

/// A rotating access-control list of registrars with a quorum size.
#[derive(Debug)]
pub struct RegistrarRoster {
    state: RwLock<RosterState>,
}

impl RegistrarRoster {
    /// Create a roster from an initial registrar set and quorum.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidQuorum`] unless
    /// `1 <= quorum <= registrars.len()`.
    pub fn new(
        registrars: impl IntoIterator<Item = Identity>,
        quorum: u32,
    ) -> Result<Self, GuardError> {
        let registrars: BTreeSet<Identity> = registrars.into_iter().collect();
        validate_quorum(quorum, registrars.len())?;
        Ok(Self {
            state: RwLock::new(RosterState { registrars, quorum }),
        })
    }

    /// Admit a new registrar.
    pub fn add_registrar(&self, identity: Identity) -> Result<(), GuardError> {
        let mut state = self.state.write();
        if !state.registrars.insert(identity) {
            return Err(GuardError::AlreadyRegistrar { identity });
        }
        Ok(())
    }

    /// Retire a registrar. The roster may not shrink below the quorum.
    pub fn remove_registrar(&self, identity: &Identity) -> Result<(), GuardError> {
        let mut state = self.state.write();
        if !state.registrars.contains(identity) {
            return Err(GuardError::UnknownRegistrar {
                identity: *identity,
            });
        }
        let remaining = state.registrars.len() - 1;
        validate_quorum(state.quorum, remaining)?;
        state.registrars.remove(identity);
        Ok(())
    }

    /// Change the quorum.
    pub fn set_quorum(&self, quorum: u32) -> Result<(), GuardError> {
        let mut state = self.state.write();
        validate_quorum(quorum, state.registrars.len())?;
        state.quorum = quorum;
        Ok(())
    }

    /// Number of registrars currently on the roster.
    pub fn roster_size(&self) -> usize {
        self.state.read().registrars.len()
    }
}

impl AccessGuard for RegistrarRoster {
    fn is_registrar(&self, identity: &Identity) -> bool {
        self.state.read().registrars.contains(identity)
    }

    fn quorum_size(&self) -> u32 {
        self.state.read().quorum
    }
}

fn validate_quorum(quorum: u32, roster_size: usize) -> Result<(), GuardError> {
    if quorum == 0 || quorum as usize > roster_size {
        return Err(GuardError::InvalidQuorum { quorum, roster_size });
    }
    Ok(())
}

/// A half-open time gate on issuance: `[opens_at, closes_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceWindow {
    /// First instant at which issuance is permitted.
    pub opens_at: Timestamp,
    /// First instant at which issuance is no longer permitted.
    pub closes_at: Timestamp,
}

impl IssuanceWindow {
    /// Create a window; `closes_at` must be after `opens_at`.
    pub fn new(opens_at: Timestamp, closes_at: Timestamp) -> Result<Self, GuardError> {
        if closes_at <= opens_at {
            return Err(GuardError::EmptyWindow);
        }
        Ok(Self { opens_at, closes_at })
    }

    /// Whether the instant falls inside the window.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.opens_at <= at && at < self.closes_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(h: u32) -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 8, 1, h, 0, 0).unwrap())
    }

    #[test]
    fn roster_membership_and_quorum() {
        let a = Identity::new();
        let b = Identity::new();
        let roster = RegistrarRoster::new([a, b], 2).unwrap();
        assert!(roster.is_registrar(&a));
        assert!(!roster.is_registrar(&Identity::new()));
        assert_eq!(roster.quorum_size(), 2);
    }

    #[test]
    fn quorum_zero_rejected() {
        let err = RegistrarRoster::new([Identity::new()], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    }

    #[test]
    fn quorum_above_roster_rejected() {
        assert!(RegistrarRoster::new([Identity::new()], 2).is_err());
    }

    #[test]
    fn rotation() {
        let a = Identity::new();
        let b = Identity::new();
        let c = Identity::new();
        let roster = RegistrarRoster::new([a, b], 1).unwrap();

        roster.add_registrar(c).unwrap();
        assert_eq!(roster.roster_size(), 3);
        assert!(matches!(
            roster.add_registrar(c),
            Err(GuardError::AlreadyRegistrar { .. })
        ));

        roster.remove_registrar(&a).unwrap();
        assert!(!roster.is_registrar(&a));
        assert!(matches!(
            roster.remove_registrar(&a),
            Err(GuardError::UnknownRegistrar { .. })
        ));
    }

    #[test]
    fn removal_may_not_break_quorum() {
        let a = Identity::new();
        let b = Identity::new();
        let roster = RegistrarRoster::new([a, b], 2).unwrap();
        assert!(matches!(
            roster.remove_registrar(&a),
            Err(GuardError::InvalidQuorum { .. })
        ));
    }

    #[test]
    fn set_quorum_validates() {
        let roster = RegistrarRoster::new([Identity::new(), Identity::new()], 1).unwrap();
        roster.set_quorum(2).unwrap();
        assert!(roster.set_quorum(3).is_err());
        assert!(roster.set_quorum(0).is_err());
    }

    #[test]
    fn window_is_half_open() {
        let window = IssuanceWindow::new(ts(9), ts(17)).unwrap();
        assert!(!window.contains(ts(8)));
        assert!(window.contains(ts(9)));
        assert!(window.contains(ts(16)));
        assert!(!window.contains(ts(17)));
    }

    #[test]
    fn empty_window_rejected() {
        assert!(IssuanceWindow::new(ts(17), ts(9)).is_err());
        assert!(IssuanceWindow::new(ts(9), ts(9)).is_err());
    }
}
