//! # Temporal Types
//!
//! Two time dimensions run through the stack:
//!
//! - **Wall time**: [`Timestamp`], UTC-only with Z suffix, truncated to
//!   seconds. Canonical byte sequences must be identical for the same
//!   instant regardless of the producing host's timezone.
//! - **Logical time**: a `u64` supplied by a [`LogicalClock`]. Ledgers use
//!   it to order credential insertions; two insertions for one subject at
//!   the same logical instant are indistinguishable and therefore
//!   rejected.
//!
//! The default [`SystemClock`] reads Unix epoch seconds, so the
//! indivisible time unit is one second. Hosts with a coarser or finer
//! serialization unit inject their own clock; tests use [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing or constructing a timestamp.
#[derive(Error, Debug)]
pub enum TimestampError {
    /// The input is not valid RFC 3339 or does not use the Z suffix.
    #[error("invalid timestamp {input:?}: {reason}")]
    Invalid {
        /// The rejected input string.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted; explicit
    /// offsets are rejected even when semantically UTC, so that canonical
    /// renderings stay byte-identical.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        if !s.ends_with('Z') {
            return Err(TimestampError::Invalid {
                input: s.to_string(),
                reason: "timestamp must use Z suffix (UTC only)".to_string(),
            });
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| TimestampError::Invalid {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO 8601 with Z suffix, e.g. `2026-08-01T12:00:00Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Source of logical time for a ledger.
///
/// `now()` must be monotonically non-decreasing across calls. The clock is
/// read, never advanced, by ledger operations; advancing it is the host's
/// serialization boundary.
pub trait LogicalClock: Send + Sync {
    /// The current logical instant.
    fn now(&self) -> u64;
}

/// Logical clock backed by Unix epoch seconds.
///
/// Two mutations inside the same second share a logical instant, which is
/// exactly the collision the ledger's temporal-ordering check rejects.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl LogicalClock for SystemClock {
    fn now(&self) -> u64 {
        let secs = Timestamp::now().epoch_secs();
        u64::try_from(secs).unwrap_or(0)
    }
}

/// Host-advanced logical clock for tests and deterministic replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: AtomicU64,
}

impl ManualClock {
    /// Create a clock starting at the given instant.
    pub fn starting_at(tick: u64) -> Self {
        Self {
            tick: AtomicU64::new(tick),
        }
    }

    /// Advance the clock by one instant and return the new value.
    pub fn advance(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, tick: u64) {
        self.tick.store(tick, Ordering::SeqCst);
    }
}

impl LogicalClock for ManualClock {
    fn now(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }
}
