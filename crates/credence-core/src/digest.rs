//! # Content Digests
//!
//! `Digest` is the 32-byte SHA-256 identifier used for credential payloads,
//! aggregate roots, and evidence roots.
//!
//! ## Security Invariant
//!
//! A digest can only be computed from [`CanonicalBytes`], parsed from a
//! strict 64-char hex string, or taken as the zero sentinel. The zero
//! digest marks a credential with no witness evidence; it is never a valid
//! hash output in practice and [`Digest::is_zero()`] makes the distinction
//! explicit.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// A 32-byte SHA-256 content digest.
///
/// Serializes as a 64-char lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wrap raw digest bytes.
    ///
    /// Prefer [`sha256_digest()`] for computing digests from canonical
    /// bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The zero digest: the evidence root of a credential with no
    /// witnesses.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Whether this is the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a 64-char lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-char lowercase hex string.
    ///
    /// Uppercase digits are rejected: a digest has exactly one textual
    /// form, so rendering and parsing stay byte-identical round trips.
    pub fn from_hex(hex: &str) -> Result<Self, CanonicalizationError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(CanonicalizationError::InvalidHexDigest(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        if !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CanonicalizationError::InvalidHexDigest(
                "digest must be lowercase hex".to_string(),
            ));
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| CanonicalizationError::InvalidHexDigest(format!("invalid hex: {e}")))?;
            out[i] = u8::from_str_radix(s, 16).map_err(|e| {
                CanonicalizationError::InvalidHexDigest(format!("invalid hex at byte {i}: {e}"))
            })?;
        }
        Ok(Self(out))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Compute a SHA-256 digest from canonical bytes.
///
/// The signature accepts only `&CanonicalBytes`, not raw `&[u8]`, so no
/// code path can hash bytes that skipped the canonicalization pipeline.
pub fn sha256_digest(data: &CanonicalBytes) -> Digest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    Digest(bytes)
}
